//! Human-readable container detail view

use crate::models::ContainerRecord;
use std::fmt::Write;

/// Render a container record as `Label: value` lines in a fixed order.
///
/// Extended fields (host config, sizes, node, graph driver) are emitted only
/// when `full` is set, and the optional ones only when the engine reported
/// them.
pub fn render_details(record: &ContainerRecord, full: bool) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail
    let _ = write_details(&mut out, record, full);
    out
}

fn write_details(out: &mut String, record: &ContainerRecord, full: bool) -> std::fmt::Result {
    writeln!(out, "Container ID: {}", record.id)?;
    writeln!(out, "Name: {}", record.name)?;
    writeln!(out, "Image: {}", record.image)?;
    writeln!(out, "Created: {}", record.created)?;
    writeln!(out, "Path: {}", record.path)?;
    writeln!(out, "Args: {}", format_list(record.args.as_deref()))?;
    writeln!(out, "Driver: {}", record.driver)?;
    writeln!(out, "Platform: {}", record.platform)?;
    writeln!(out, "MountLabel: {}", record.mount_label)?;
    writeln!(out, "ProcessLabel: {}", record.process_label)?;
    writeln!(out, "AppArmorProfile: {}", record.app_armor_profile)?;
    writeln!(out, "ExecIDs: {}", format_list(record.exec_ids.as_deref()))?;

    if let Some(state) = &record.state {
        writeln!(out, "Status: {}", state.status)?;
        writeln!(out, "Running: {}", state.running)?;
        writeln!(out, "Paused: {}", state.paused)?;
        writeln!(out, "Restarting: {}", state.restarting)?;
        writeln!(out, "OOMKilled: {}", state.oom_killed)?;
        writeln!(out, "Dead: {}", state.dead)?;
        writeln!(out, "PID: {}", state.pid)?;
        writeln!(out, "ExitCode: {}", state.exit_code)?;
        writeln!(out, "Error: {}", state.error)?;
        writeln!(out, "StartedAt: {}", state.started_at)?;
        writeln!(out, "FinishedAt: {}", state.finished_at)?;
        if let Some(health) = &state.health {
            writeln!(out, "Health: {}", health.status)?;
        }
    }

    writeln!(out, "ResolvConfPath: {}", record.resolv_conf_path)?;
    writeln!(out, "HostnamePath: {}", record.hostname_path)?;
    writeln!(out, "HostsPath: {}", record.hosts_path)?;
    writeln!(out, "LogPath: {}", record.log_path)?;
    writeln!(out, "RestartCount: {}", record.restart_count)?;

    if !full {
        return Ok(());
    }

    if let Some(host_config) = &record.host_config {
        writeln!(out, "HostConfig: {}", host_config)?;
    }
    if let Some(size_rw) = record.size_rw {
        writeln!(out, "SizeRw: {}", size_rw)?;
    }
    if let Some(size_root_fs) = record.size_root_fs {
        writeln!(out, "SizeRootFs: {}", size_root_fs)?;
    }
    if let Some(node) = &record.node {
        writeln!(out, "Node: {}", node)?;
    }
    writeln!(out, "GraphDriver: {}", record.graph_driver)?;

    Ok(())
}

/// Format a list as `[a b c]`; a missing list prints as `[]`.
fn format_list(items: Option<&[String]>) -> String {
    format!("[{}]", items.unwrap_or_default().join(" "))
}
