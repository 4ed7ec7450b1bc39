//! Data models for container records and process usage samples

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Container record as returned by the engine's inspect endpoint.
///
/// Only the fields the detail view prints are modelled; everything else in
/// the engine response is ignored on decode (the raw body is kept separately
/// for JSON output).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ContainerRecord {
    #[serde(deserialize_with = "nullable")]
    pub id: String,
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    #[serde(deserialize_with = "nullable")]
    pub image: String,
    #[serde(deserialize_with = "nullable")]
    pub created: String,
    #[serde(deserialize_with = "nullable")]
    pub path: String,
    pub args: Option<Vec<String>>,
    #[serde(deserialize_with = "nullable")]
    pub driver: String,
    #[serde(deserialize_with = "nullable")]
    pub platform: String,
    #[serde(deserialize_with = "nullable")]
    pub mount_label: String,
    #[serde(deserialize_with = "nullable")]
    pub process_label: String,
    #[serde(deserialize_with = "nullable")]
    pub app_armor_profile: String,
    #[serde(rename = "ExecIDs")]
    pub exec_ids: Option<Vec<String>>,
    pub state: Option<RuntimeState>,
    #[serde(deserialize_with = "nullable")]
    pub resolv_conf_path: String,
    #[serde(deserialize_with = "nullable")]
    pub hostname_path: String,
    #[serde(deserialize_with = "nullable")]
    pub hosts_path: String,
    #[serde(deserialize_with = "nullable")]
    pub log_path: String,
    #[serde(deserialize_with = "nullable")]
    pub restart_count: i64,

    // Extended fields, only meaningful with full details
    pub host_config: Option<serde_json::Value>,
    pub size_rw: Option<i64>,
    pub size_root_fs: Option<i64>,
    pub node: Option<serde_json::Value>,
    #[serde(deserialize_with = "nullable")]
    pub graph_driver: GraphDriver,
}

/// Runtime state of a container
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct RuntimeState {
    #[serde(deserialize_with = "nullable")]
    pub status: ContainerStatus,
    #[serde(deserialize_with = "nullable")]
    pub running: bool,
    #[serde(deserialize_with = "nullable")]
    pub paused: bool,
    #[serde(deserialize_with = "nullable")]
    pub restarting: bool,
    #[serde(rename = "OOMKilled")]
    #[serde(deserialize_with = "nullable")]
    pub oom_killed: bool,
    #[serde(deserialize_with = "nullable")]
    pub dead: bool,
    #[serde(deserialize_with = "nullable")]
    pub pid: i32,
    #[serde(deserialize_with = "nullable")]
    pub exit_code: i64,
    #[serde(deserialize_with = "nullable")]
    pub error: String,
    #[serde(deserialize_with = "nullable")]
    pub started_at: String,
    #[serde(deserialize_with = "nullable")]
    pub finished_at: String,
    pub health: Option<Health>,
}

impl RuntimeState {
    /// PID of the container's main process, if it is running.
    pub fn live_pid(&self) -> Option<i32> {
        if self.running && self.pid > 0 {
            Some(self.pid)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerStatus {
    Created,
    Running,
    Paused,
    Restarting,
    Removing,
    Exited,
    Dead,
    #[default]
    #[serde(other)]
    Unknown,
}

impl fmt::Display for ContainerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ContainerStatus::Created => "created",
            ContainerStatus::Running => "running",
            ContainerStatus::Paused => "paused",
            ContainerStatus::Restarting => "restarting",
            ContainerStatus::Removing => "removing",
            ContainerStatus::Exited => "exited",
            ContainerStatus::Dead => "dead",
            ContainerStatus::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Health check status, present only when the container has a health check
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Health {
    #[serde(deserialize_with = "nullable")]
    pub status: String,
    #[serde(deserialize_with = "nullable")]
    pub failing_streak: i64,
}

/// Storage driver information
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct GraphDriver {
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    pub data: Option<BTreeMap<String, String>>,
}

impl fmt::Display for GraphDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name={} Data={{", self.name)?;
        if let Some(data) = &self.data {
            for (i, (key, value)) in data.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{}={}", key, value)?;
            }
        }
        f.write_str("}")
    }
}

/// Decode `null` as the field's default value
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Point-in-time resource usage of one OS process
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageSample {
    pub pid: i32,
    pub cpu_percent: f32,
    pub resident_bytes: u64,
    pub virtual_bytes: u64,
    pub memory_percent: f32,
    pub threads: u64,
    /// Process creation time, milliseconds since the Unix epoch
    pub created_at_ms: i64,
}
