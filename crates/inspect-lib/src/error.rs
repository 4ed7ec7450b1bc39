//! Error types shared by the engine client and the usage sampler

/// Boxed cause carried by connection failures
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid engine configuration: {0}")]
    Config(String),

    #[error("failed to connect to container engine at {endpoint}")]
    Connection {
        endpoint: String,
        #[source]
        source: BoxError,
    },

    #[error("inspect for '{id}' failed: {reason}")]
    Inspection { id: String, reason: String },

    #[error("container '{0}' is not running")]
    NotRunning(String),

    #[error("process {0} not found")]
    ProcessNotFound(i32),

    #[error("failed to {operation} for process {pid}: {reason}")]
    Sampling {
        pid: i32,
        operation: &'static str,
        reason: String,
    },
}

impl Error {
    pub(crate) fn connection(endpoint: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Error::Connection {
            endpoint: endpoint.into(),
            source: source.into(),
        }
    }

    pub(crate) fn inspection(id: &str, reason: impl Into<String>) -> Self {
        Error::Inspection {
            id: id.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
