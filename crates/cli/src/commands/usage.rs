//! `usage` command

use anyhow::{Context, Result};
use ctrinspect_lib::{render_usage, ContainerInspector, Error, ProcessSampler};
use std::io::Write;
use std::sync::Arc;
use tracing::debug;

/// Print resource usage of a running container's main process
pub async fn show_usage<W: Write>(
    inspector: &mut dyn ContainerInspector,
    sampler: Arc<dyn ProcessSampler>,
    id: &str,
    out: &mut W,
) -> Result<()> {
    show_usage_at(
        inspector,
        sampler,
        id,
        || chrono::Utc::now().timestamp_millis(),
        out,
    )
    .await
}

/// Same as [`show_usage`], with uptime measured against `now_ms()`
async fn show_usage_at<W: Write>(
    inspector: &mut dyn ContainerInspector,
    sampler: Arc<dyn ProcessSampler>,
    id: &str,
    now_ms: impl FnOnce() -> i64,
    out: &mut W,
) -> Result<()> {
    let inspection = inspector
        .inspect(id, false)
        .await
        .with_context(|| format!("Failed to inspect container '{}'", id))?;
    let pid = inspection
        .record
        .state
        .as_ref()
        .and_then(|state| state.live_pid())
        .ok_or_else(|| Error::NotRunning(id.to_string()))
        .with_context(|| format!("Failed to get usage of container '{}'", id))?;
    debug!(id = %id, pid = pid, "Sampling container process");

    // Sampling sleeps between refreshes; keep it off the runtime thread
    let sample = tokio::task::spawn_blocking(move || sampler.sample(pid))
        .await
        .context("Sampling task failed")?
        .with_context(|| format!("Failed to sample process {} of container '{}'", pid, id))?;

    out.write_all(render_usage(&sample, now_ms()).as_bytes())?;
    Ok(())
}
