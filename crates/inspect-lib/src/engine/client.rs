//! HTTP/1.1 client for the engine API over a single connection

use super::transport;
use super::{ContainerInspector, Inspection};
use crate::config::{EngineConfig, Endpoint};
use crate::error::{Error, Result};
use async_trait::async_trait;
use http_body_util::{BodyExt, Empty};
use hyper::body::Bytes;
use hyper::client::conn::http1::{self, SendRequest};
use hyper::header::{HOST, USER_AGENT};
use hyper::{HeaderMap, Request, StatusCode};
use hyper_util::rt::TokioIo;
use serde::Deserialize;
use std::cmp::Ordering;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use url::Url;

/// Highest API version this client speaks
pub const DEFAULT_API_VERSION: &str = "1.43";

/// Version assumed when the engine does not advertise one
pub const FALLBACK_API_VERSION: &str = "1.24";

const CLIENT_USER_AGENT: &str = concat!("ctrinspect/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const CLOSE_GRACE: Duration = Duration::from_millis(500);

/// Error body returned by the engine on non-success statuses
#[derive(Debug, Deserialize)]
struct EngineErrorBody {
    message: String,
}

/// Background task driving the HTTP connection. Aborted on drop.
struct ConnectionDriver {
    handle: Option<JoinHandle<()>>,
}

impl ConnectionDriver {
    async fn shutdown(mut self) {
        if let Some(mut handle) = self.handle.take() {
            if tokio::time::timeout(CLOSE_GRACE, &mut handle).await.is_err() {
                debug!("Engine connection did not close in time, aborting");
                handle.abort();
            }
        }
    }
}

impl Drop for ConnectionDriver {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

/// Client holding one open connection to the engine
pub struct EngineClient {
    sender: SendRequest<Empty<Bytes>>,
    driver: ConnectionDriver,
    endpoint: String,
    host_header: String,
    api_version: String,
    timeout: Duration,
}

impl EngineClient {
    /// Open a connection and settle the API version.
    ///
    /// The version comes from the configuration when pinned, otherwise it
    /// is negotiated with the engine's `/_ping` endpoint.
    pub async fn connect(config: &EngineConfig) -> Result<Self> {
        let endpoint = config.endpoint.to_string();
        let stream = transport::open(&config.endpoint, config.tls.as_ref()).await?;

        let (sender, connection) = http1::handshake(TokioIo::new(stream))
            .await
            .map_err(|e| Error::connection(&endpoint, e))?;

        let handle = tokio::spawn(async move {
            if let Err(e) = connection.await {
                debug!(error = %e, "Engine connection closed with error");
            }
        });

        let mut client = Self {
            sender,
            driver: ConnectionDriver {
                handle: Some(handle),
            },
            endpoint,
            host_header: host_header(&config.endpoint),
            api_version: String::new(),
            timeout: REQUEST_TIMEOUT,
        };

        client.api_version = match &config.api_version {
            Some(version) => version.clone(),
            None => client.negotiate().await?,
        };
        info!(endpoint = %client.endpoint, api_version = %client.api_version, "Connected to container engine");

        Ok(client)
    }

    /// API version used for requests
    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    /// Release the connection
    pub async fn close(self) {
        let EngineClient { sender, driver, .. } = self;
        drop(sender);
        driver.shutdown().await;
        debug!("Engine connection released");
    }

    async fn negotiate(&mut self) -> Result<String> {
        let (status, headers, _) = self.get("/_ping").await?;
        let server_version = headers
            .get("api-version")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        debug!(status = %status, server_version = ?server_version, "Pinged engine");

        Ok(negotiate_version(
            DEFAULT_API_VERSION,
            server_version.as_deref(),
        ))
    }

    async fn get(&mut self, path_and_query: &str) -> Result<(StatusCode, HeaderMap, Bytes)> {
        let endpoint = self.endpoint.clone();
        let request = Request::get(path_and_query)
            .header(HOST, &self.host_header)
            .header(USER_AGENT, CLIENT_USER_AGENT)
            .body(Empty::<Bytes>::new())
            .map_err(|e| Error::connection(&endpoint, e))?;

        debug!(path = %path_and_query, "Sending engine request");
        let sender = &mut self.sender;
        let exchange = async move {
            sender.ready().await?;
            let response = sender.send_request(request).await?;
            let (parts, body) = response.into_parts();
            let body = body.collect().await?.to_bytes();
            Ok::<_, hyper::Error>((parts.status, parts.headers, body))
        };

        match tokio::time::timeout(self.timeout, exchange).await {
            Ok(result) => result.map_err(|e| Error::connection(&endpoint, e)),
            Err(_) => Err(Error::connection(
                &endpoint,
                format!("request timed out after {}s", self.timeout.as_secs()),
            )),
        }
    }
}

#[async_trait]
impl ContainerInspector for EngineClient {
    async fn inspect(&mut self, id: &str, size: bool) -> Result<Inspection> {
        if id.trim().is_empty() {
            return Err(Error::inspection(id, "empty container ID"));
        }

        let path = inspect_path(&self.api_version, id, size)?;
        let (status, _, body) = self.get(&path).await?;
        if !status.is_success() {
            return Err(Error::inspection(id, engine_message(status, &body)));
        }

        let record = serde_json::from_slice(&body)
            .map_err(|e| Error::inspection(id, format!("invalid response body: {}", e)))?;
        debug!(id = %id, bytes = body.len(), "Inspected container");

        Ok(Inspection {
            record,
            raw: body.to_vec(),
        })
    }
}

fn host_header(endpoint: &Endpoint) -> String {
    match endpoint {
        Endpoint::Unix(_) => "docker".to_string(),
        Endpoint::Tcp { host, port } if host.contains(':') => format!("[{}]:{}", host, port),
        Endpoint::Tcp { host, port } => format!("{}:{}", host, port),
    }
}

/// Request path for the inspect endpoint, with the ID percent-encoded
pub fn inspect_path(api_version: &str, id: &str, size: bool) -> Result<String> {
    let mut url =
        Url::parse("http://engine/").map_err(|e| Error::inspection(id, e.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| Error::inspection(id, "cannot build request path"))?
        .pop_if_empty()
        .push(&format!("v{}", api_version))
        .push("containers")
        .push(id)
        .push("json");
    url.query_pairs_mut()
        .append_pair("size", if size { "true" } else { "false" });

    Ok(format!("{}?{}", url.path(), url.query().unwrap_or_default()))
}

fn engine_message(status: StatusCode, body: &[u8]) -> String {
    let message = serde_json::from_slice::<EngineErrorBody>(body)
        .map(|b| b.message)
        .unwrap_or_else(|_| String::from_utf8_lossy(body).trim().to_string());

    if message.is_empty() {
        format!("engine returned {}", status)
    } else {
        format!("engine returned {}: {}", status, message)
    }
}

/// Pick the lower of the client and server versions
pub fn negotiate_version(client: &str, server: Option<&str>) -> String {
    match server.filter(|v| !v.is_empty()) {
        None => FALLBACK_API_VERSION.to_string(),
        Some(server) if compare_versions(server, client) == Ordering::Less => server.to_string(),
        Some(_) => client.to_string(),
    }
}

fn compare_versions(a: &str, b: &str) -> Ordering {
    let parse = |v: &str| -> Vec<u64> {
        v.split('.')
            .map(|part| part.trim().parse().unwrap_or(0))
            .collect()
    };
    let (a, b) = (parse(a), parse(b));
    let len = a.len().max(b.len());
    for i in 0..len {
        let ord = a.get(i).unwrap_or(&0).cmp(b.get(i).unwrap_or(&0));
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}
