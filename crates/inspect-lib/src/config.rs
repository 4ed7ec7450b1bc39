//! Engine connection settings from the environment
//!
//! Follows the Docker client convention: `DOCKER_HOST`, `DOCKER_API_VERSION`,
//! `DOCKER_TLS_VERIFY` and `DOCKER_CERT_PATH`.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use url::Url;

pub const DEFAULT_HOST: &str = "unix:///var/run/docker.sock";

const DEFAULT_TCP_PORT: u16 = 2375;
const DEFAULT_TLS_PORT: u16 = 2376;

/// Raw settings as read from the environment
#[derive(Debug, Clone, Default, Deserialize)]
struct RawSettings {
    host: Option<String>,
    api_version: Option<String>,
    tls_verify: Option<String>,
    cert_path: Option<PathBuf>,
}

/// Where the engine listens
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Unix(PathBuf),
    Tcp { host: String, port: u16 },
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Unix(path) => write!(f, "unix://{}", path.display()),
            Endpoint::Tcp { host, port } => write!(f, "tcp://{}:{}", host, port),
        }
    }
}

/// TLS material for `tcp://` endpoints
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsSettings {
    pub ca_file: PathBuf,
    pub cert_file: PathBuf,
    pub key_file: PathBuf,
}

impl TlsSettings {
    fn from_dir(dir: PathBuf) -> Self {
        Self {
            ca_file: dir.join("ca.pem"),
            cert_file: dir.join("cert.pem"),
            key_file: dir.join("key.pem"),
        }
    }
}

/// Engine connection configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub endpoint: Endpoint,
    /// Pinned API version; negotiated with the engine when unset
    pub api_version: Option<String>,
    pub tls: Option<TlsSettings>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            endpoint: Endpoint::Unix(PathBuf::from("/var/run/docker.sock")),
            api_version: None,
            tls: None,
        }
    }
}

impl EngineConfig {
    /// Load configuration from `DOCKER_*` environment variables
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration from an explicit variable map instead of the
    /// process environment
    pub fn load_from(source: Option<HashMap<String, String>>) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::Environment::with_prefix("DOCKER").source(source))
            .build()
            .map_err(|e| Error::Config(e.to_string()))?;

        let raw: RawSettings = settings
            .try_deserialize()
            .map_err(|e| Error::Config(e.to_string()))?;

        Self::from_raw(raw)
    }

    fn from_raw(raw: RawSettings) -> Result<Self> {
        let tls_enabled = raw.tls_verify.as_deref().is_some_and(|v| !v.is_empty());
        let host = raw
            .host
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let endpoint = parse_host(&host, tls_enabled)?;

        let tls = match (&endpoint, tls_enabled) {
            (Endpoint::Tcp { .. }, true) => {
                let dir = match raw.cert_path.filter(|p| !p.as_os_str().is_empty()) {
                    Some(dir) => dir,
                    None => default_cert_dir()?,
                };
                Some(TlsSettings::from_dir(dir))
            }
            _ => None,
        };

        Ok(Self {
            endpoint,
            api_version: raw.api_version.filter(|v| !v.is_empty()),
            tls,
        })
    }
}

fn default_cert_dir() -> Result<PathBuf> {
    let home = dirs_next::home_dir()
        .ok_or_else(|| Error::Config("could not determine home directory".to_string()))?;
    Ok(home.join(".docker"))
}

/// Parse a `DOCKER_HOST` value
pub fn parse_host(host: &str, tls: bool) -> Result<Endpoint> {
    let url = Url::parse(host).map_err(|e| Error::Config(format!("invalid host '{}': {}", host, e)))?;

    match url.scheme() {
        "unix" => {
            if url.path().is_empty() || url.path() == "/" {
                return Err(Error::Config(format!("missing socket path in '{}'", host)));
            }
            Ok(Endpoint::Unix(PathBuf::from(url.path())))
        }
        "tcp" | "http" | "https" => {
            let name = url
                .host_str()
                .filter(|h| !h.is_empty())
                .ok_or_else(|| Error::Config(format!("missing host in '{}'", host)))?;
            let port = url.port().unwrap_or(if tls {
                DEFAULT_TLS_PORT
            } else {
                DEFAULT_TCP_PORT
            });
            Ok(Endpoint::Tcp {
                host: name.trim_start_matches('[').trim_end_matches(']').to_string(),
                port,
            })
        }
        other => Err(Error::Config(format!(
            "unsupported protocol scheme '{}' in '{}'",
            other, host
        ))),
    }
}
