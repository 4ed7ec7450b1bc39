//! Command dispatch and the help listing

pub mod inspect;
pub mod usage;

use anyhow::{Context, Result};
use clap::CommandFactory;
use ctrinspect_lib::{
    ContainerInspector, EngineClient, EngineConfig, ProcessSampler, SysinfoSampler,
};
use std::io::Write;
use std::sync::Arc;
use tracing::debug;

use crate::output::{two_columns, write_stdout};
use crate::{Cli, Commands};

/// Run a parsed command against the real engine and host.
///
/// Output is buffered and written only once the command has succeeded. The
/// engine connection is closed before returning, on success and on error.
pub async fn run(command: Commands) -> Result<()> {
    if command == Commands::Help {
        write_stdout(listing().as_bytes())?;
        return Ok(());
    }

    let config = EngineConfig::load().context("Failed to load engine configuration")?;
    debug!(endpoint = %config.endpoint, "Loaded engine configuration");

    let mut client = EngineClient::connect(&config)
        .await
        .context("Failed to open engine connection")?;
    let mut buffer = Vec::new();
    let sampler = Arc::new(SysinfoSampler::new());
    let result = execute(&command, &mut client, sampler, &mut buffer).await;
    client.close().await;
    result?;

    write_stdout(&buffer)?;
    Ok(())
}

/// Dispatch one command to its handler
pub async fn execute<W: Write>(
    command: &Commands,
    inspector: &mut dyn ContainerInspector,
    sampler: Arc<dyn ProcessSampler>,
    out: &mut W,
) -> Result<()> {
    match command {
        Commands::Inspect { id, full } => inspect::show_details(inspector, id, *full, out).await,
        Commands::Json { id } => inspect::show_raw(inspector, id, out).await,
        Commands::Usage { id } => usage::show_usage(inspector, sampler, id, out).await,
        Commands::Help => {
            out.write_all(listing().as_bytes())?;
            Ok(())
        }
    }
}

/// Every command with its parameters and description, in declaration order
pub fn listing() -> String {
    let cli = Cli::command();
    let rows: Vec<(String, String)> = cli
        .get_subcommands()
        .map(|sub| {
            let about = sub.get_about().map(|a| a.to_string()).unwrap_or_default();
            (signature(sub), about)
        })
        .collect();

    format!(
        "Usage: {} [--verbose] <COMMAND>\n\nCommands:\n{}",
        cli.get_name(),
        two_columns(&rows)
    )
}

/// `name ARG [--flag]` for one subcommand
fn signature(sub: &clap::Command) -> String {
    let mut parts = vec![sub.get_name().to_string()];
    for arg in sub.get_arguments() {
        if arg.is_global_set() || arg.get_id() == "help" || arg.get_id() == "version" {
            continue;
        }
        if arg.is_positional() {
            let name = arg
                .get_value_names()
                .and_then(|names| names.first())
                .map(|name| name.to_string())
                .unwrap_or_else(|| arg.get_id().as_str().to_uppercase());
            if arg.is_required_set() {
                parts.push(name);
            } else {
                parts.push(format!("[{}]", name));
            }
        } else if let Some(long) = arg.get_long() {
            parts.push(format!("[--{}]", long));
        }
    }
    parts.join(" ")
}


#[cfg(test)]
mod tests {
    use super::fakes::{FakeInspector, FakeSampler};
    use super::*;
    use ctrinspect_lib::{ContainerRecord, RuntimeState};

    fn record() -> ContainerRecord {
        ContainerRecord {
            id: "4fa6e0f0c678".to_string(),
            name: "/web".to_string(),
            state: Some(RuntimeState {
                running: true,
                pid: 4242,
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_listing_in_declaration_order() {
        let text = listing();
        let commands: Vec<&str> = text
            .lines()
            .skip_while(|line| *line != "Commands:")
            .skip(1)
            .map(|line| line.split_whitespace().next().unwrap())
            .collect();
        assert_eq!(commands, ["inspect", "usage", "json", "help"]);
    }

    #[test]
    fn test_listing_shows_signatures_and_descriptions() {
        let text = listing();
        assert!(text.starts_with("Usage: ctrinspect [--verbose] <COMMAND>\n"));
        assert!(text.contains("  inspect CONTAINER-ID [--full]  Show container details\n"));
        assert!(text.contains("usage CONTAINER-ID"));
        assert!(text.contains("json CONTAINER-ID"));
        assert!(text.contains("Print the engine's raw inspect response"));
        assert!(text.contains("List available commands"));
    }

    #[tokio::test]
    async fn test_execute_inspect_passes_full_flag() {
        let mut inspector = FakeInspector::returning(record(), b"{}");
        let sampler = Arc::new(FakeSampler { sample: None });
        let mut out = Vec::new();

        let command = Commands::Inspect {
            id: "web".to_string(),
            full: true,
        };
        execute(&command, &mut inspector, sampler, &mut out)
            .await
            .unwrap();

        assert_eq!(inspector.calls, vec![("web".to_string(), true)]);
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Container ID: 4fa6e0f0c678\n"));
        assert!(text.contains("GraphDriver: "));
    }

    #[tokio::test]
    async fn test_execute_help_writes_listing() {
        let mut inspector = FakeInspector::missing();
        let sampler = Arc::new(FakeSampler { sample: None });
        let mut out = Vec::new();

        execute(&Commands::Help, &mut inspector, sampler, &mut out)
            .await
            .unwrap();

        assert!(inspector.calls.is_empty());
        assert_eq!(String::from_utf8(out).unwrap(), listing());
    }

    #[tokio::test]
    async fn test_execute_propagates_inspection_error() {
        let mut inspector = FakeInspector::missing();
        let sampler = Arc::new(FakeSampler { sample: None });
        let mut out = Vec::new();

        let command = Commands::Json {
            id: "nope".to_string(),
        };
        let err = execute(&command, &mut inspector, sampler, &mut out)
            .await
            .unwrap_err();

        assert!(format!("{:#}", err).contains("No such container: nope"));
        assert!(out.is_empty());
    }
}
