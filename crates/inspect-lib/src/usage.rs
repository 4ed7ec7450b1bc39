//! Process resource usage sampling and reporting
//!
//! CPU usage is a delta between two refreshes of the same process, so
//! sampling blocks for [`CPU_SAMPLE_INTERVAL`]. The first refresh alone
//! would always report 0%.

use crate::error::{Error, Result};
use crate::models::UsageSample;
use std::fmt::Write;
use std::time::Duration;
use sysinfo::{Pid, System};
use tracing::debug;

/// Delay between the two process refreshes used to compute CPU usage
pub const CPU_SAMPLE_INTERVAL: Duration = Duration::from_millis(200);

const BYTES_PER_MIB: f64 = 1024.0 * 1024.0;

/// Source of process usage samples. Sampling may block.
pub trait ProcessSampler: Send + Sync {
    /// Take one sample of the process with the given PID
    fn sample(&self, pid: i32) -> Result<UsageSample>;
}

/// Sampler backed by the host OS through `sysinfo`
#[derive(Debug, Default)]
pub struct SysinfoSampler;

impl SysinfoSampler {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessSampler for SysinfoSampler {
    fn sample(&self, pid: i32) -> Result<UsageSample> {
        if pid <= 0 {
            return Err(Error::ProcessNotFound(pid));
        }
        let spid = Pid::from_u32(pid as u32);
        let mut sys = System::new();

        // First refresh establishes the CPU baseline
        if !sys.refresh_process(spid) {
            return Err(Error::ProcessNotFound(pid));
        }
        std::thread::sleep(CPU_SAMPLE_INTERVAL);
        if !sys.refresh_process(spid) {
            return Err(Error::Sampling {
                pid,
                operation: "get CPU usage",
                reason: "process exited while sampling".to_string(),
            });
        }
        sys.refresh_memory();

        let process = sys.process(spid).ok_or(Error::ProcessNotFound(pid))?;
        let cpu_percent = process.cpu_usage();
        let resident_bytes = process.memory();
        let virtual_bytes = process.virtual_memory();

        let total_memory = sys.total_memory();
        if total_memory == 0 {
            return Err(Error::Sampling {
                pid,
                operation: "get memory percent",
                reason: "total system memory unavailable".to_string(),
            });
        }
        let memory_percent = (resident_bytes as f64 / total_memory as f64 * 100.0) as f32;

        let threads = thread_count(pid)?;
        let created_at_ms = (process.start_time() as i64).saturating_mul(1000);

        debug!(
            pid = pid,
            cpu_percent = cpu_percent,
            resident_bytes = resident_bytes,
            threads = threads,
            "Sampled process usage"
        );

        Ok(UsageSample {
            pid,
            cpu_percent,
            resident_bytes,
            virtual_bytes,
            memory_percent,
            threads,
            created_at_ms,
        })
    }
}

#[cfg(target_os = "linux")]
fn thread_count(pid: i32) -> Result<u64> {
    let sampling = |e: procfs::ProcError| Error::Sampling {
        pid,
        operation: "get number of threads",
        reason: e.to_string(),
    };
    let stat = procfs::process::Process::new(pid)
        .and_then(|process| process.stat())
        .map_err(sampling)?;
    Ok(stat.num_threads.max(0) as u64)
}

#[cfg(not(target_os = "linux"))]
fn thread_count(pid: i32) -> Result<u64> {
    Err(Error::Sampling {
        pid,
        operation: "get number of threads",
        reason: "not supported on this platform".to_string(),
    })
}

/// Convert bytes to mebibytes (1024-based)
pub fn bytes_to_mib(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_MIB
}

/// Format an elapsed duration in milliseconds as `HH:MM:SS`.
///
/// Hours are not wrapped at 24.
pub fn format_uptime(elapsed_ms: u64) -> String {
    let total_secs = elapsed_ms / 1000;
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

/// Uptime of a process created at `created_at_ms`, as seen at `now_ms`
pub fn uptime_since(created_at_ms: i64, now_ms: i64) -> String {
    let elapsed = now_ms.saturating_sub(created_at_ms).max(0) as u64;
    format_uptime(elapsed)
}

/// Render the usage block for a sample taken before `now_ms`
pub fn render_usage(sample: &UsageSample, now_ms: i64) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Usage:");
    let _ = writeln!(out, "PID: {}", sample.pid);
    let _ = writeln!(out, "CPU Usage: {:.2}%", sample.cpu_percent);
    let _ = writeln!(
        out,
        "Memory Usage: {:.2} MiB",
        bytes_to_mib(sample.resident_bytes)
    );
    let _ = writeln!(
        out,
        "Virtual Memory Usage: {:.2} MiB",
        bytes_to_mib(sample.virtual_bytes)
    );
    let _ = writeln!(out, "Memory Percentage: {:.2}%", sample.memory_percent);
    let _ = writeln!(out, "Number of Threads: {}", sample.threads);
    let _ = writeln!(
        out,
        "Process Uptime: {}",
        uptime_since(sample.created_at_ms, now_ms)
    );
    out
}
