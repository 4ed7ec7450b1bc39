//! Byte streams to the engine: Unix socket, plain TCP, or TCP with TLS

use crate::config::{Endpoint, TlsSettings};
use crate::error::{Error, Result};
use rustls::{Certificate, ClientConfig, PrivateKey, RootCertStore, ServerName};
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpStream, UnixStream};
use tokio_rustls::TlsConnector;
use tracing::debug;

/// Any bidirectional stream hyper can drive
pub trait Transport: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T> Transport for T where T: AsyncRead + AsyncWrite + Unpin + Send {}

pub type BoxedTransport = Box<dyn Transport>;

/// Open a stream to the endpoint, wrapping it in TLS when configured
pub async fn open(endpoint: &Endpoint, tls: Option<&TlsSettings>) -> Result<BoxedTransport> {
    let target = endpoint.to_string();
    match endpoint {
        Endpoint::Unix(path) => {
            debug!(socket = %path.display(), "Connecting to engine socket");
            let stream = UnixStream::connect(path)
                .await
                .map_err(|e| Error::connection(&target, e))?;
            Ok(Box::new(stream))
        }
        Endpoint::Tcp { host, port } => {
            debug!(host = %host, port = port, tls = tls.is_some(), "Connecting to engine over TCP");
            let stream = TcpStream::connect((host.as_str(), *port))
                .await
                .map_err(|e| Error::connection(&target, e))?;

            match tls {
                None => Ok(Box::new(stream)),
                Some(settings) => {
                    let connector = TlsConnector::from(Arc::new(client_config(settings)?));
                    let server_name = ServerName::try_from(host.as_str()).map_err(|e| {
                        Error::Config(format!("invalid TLS server name '{}': {}", host, e))
                    })?;
                    let stream = connector
                        .connect(server_name, stream)
                        .await
                        .map_err(|e| Error::connection(&target, e))?;
                    Ok(Box::new(stream))
                }
            }
        }
    }
}

/// Build a rustls client config with the CA as the only trust root and the
/// client certificate for mutual authentication
pub fn client_config(settings: &TlsSettings) -> Result<ClientConfig> {
    let mut roots = RootCertStore::empty();
    for cert in read_certs(&settings.ca_file)? {
        roots
            .add(&cert)
            .map_err(|e| Error::Config(format!("invalid CA certificate: {}", e)))?;
    }

    let chain = read_certs(&settings.cert_file)?;
    let key = read_private_key(&settings.key_file)?;

    ClientConfig::builder()
        .with_safe_defaults()
        .with_root_certificates(roots)
        .with_client_auth_cert(chain, key)
        .map_err(|e| Error::Config(format!("invalid client certificate: {}", e)))
}

fn open_pem(path: &Path) -> Result<BufReader<std::fs::File>> {
    let file = std::fs::File::open(path)
        .map_err(|e| Error::Config(format!("failed to read {}: {}", path.display(), e)))?;
    Ok(BufReader::new(file))
}

fn read_certs(path: &Path) -> Result<Vec<Certificate>> {
    let certs = rustls_pemfile::certs(&mut open_pem(path)?)
        .map_err(|e| Error::Config(format!("failed to parse {}: {}", path.display(), e)))?;
    if certs.is_empty() {
        return Err(Error::Config(format!(
            "no certificates found in {}",
            path.display()
        )));
    }
    Ok(certs.into_iter().map(Certificate).collect())
}

fn read_private_key(path: &Path) -> Result<PrivateKey> {
    let items = rustls_pemfile::read_all(&mut open_pem(path)?)
        .map_err(|e| Error::Config(format!("failed to parse {}: {}", path.display(), e)))?;

    items
        .into_iter()
        .find_map(|item| match item {
            rustls_pemfile::Item::RSAKey(key)
            | rustls_pemfile::Item::PKCS8Key(key)
            | rustls_pemfile::Item::ECKey(key) => Some(PrivateKey(key)),
            _ => None,
        })
        .ok_or_else(|| Error::Config(format!("no private key found in {}", path.display())))
}
