//! Container engine access
//!
//! [`EngineClient`] speaks the Docker Engine HTTP API over one connection
//! (Unix socket, TCP, or TCP with TLS). Callers depend on the
//! [`ContainerInspector`] trait so command logic can run against a fake.

mod client;
mod transport;

pub use client::{
    inspect_path, negotiate_version, EngineClient, DEFAULT_API_VERSION, FALLBACK_API_VERSION,
};
pub use transport::{client_config, BoxedTransport, Transport};

use crate::error::Result;
use crate::models::ContainerRecord;
use async_trait::async_trait;

/// Result of one inspect call
#[derive(Debug, Clone)]
pub struct Inspection {
    /// Decoded record
    pub record: ContainerRecord,
    /// Response body exactly as the engine sent it
    pub raw: Vec<u8>,
}

/// Trait for looking up a container by ID or name
#[async_trait]
pub trait ContainerInspector: Send {
    /// Inspect one container. `size` asks the engine to compute the
    /// read-write layer and root filesystem sizes.
    async fn inspect(&mut self, id: &str, size: bool) -> Result<Inspection>;
}
