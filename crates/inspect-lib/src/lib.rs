//! Library behind the `ctrinspect` command
//!
//! This crate provides:
//! - Engine configuration from `DOCKER_*` environment variables
//! - A Docker Engine API client for the container inspect endpoint
//! - The container detail formatter
//! - Process usage sampling and reporting
//! - Logging setup

pub mod config;
pub mod engine;
pub mod error;
pub mod formatter;
pub mod models;
pub mod observability;
pub mod usage;

pub use async_trait::async_trait;
pub use crate::config::{EngineConfig, Endpoint, TlsSettings};
pub use engine::{ContainerInspector, EngineClient, Inspection};
pub use error::{Error, Result};
pub use formatter::render_details;
pub use models::*;
pub use usage::{render_usage, ProcessSampler, SysinfoSampler};
