//! ctrinspect CLI
//!
//! Inspects a container through the engine API and optionally reports the
//! resource usage of its main process.

mod commands;
mod output;

use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::{Parser, Subcommand};
use std::process::ExitCode;

/// Container inspection CLI
#[derive(Parser, Debug)]
#[command(name = "ctrinspect")]
#[command(author, version, about = "Inspect a container and its main process", long_about = None)]
#[command(disable_help_subcommand = true, arg_required_else_help = true)]
pub struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Commands in the order they are listed by `help`
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Show container details
    Inspect {
        /// Container ID or name
        #[arg(value_name = "CONTAINER-ID")]
        id: String,

        /// Include host config, sizes, node and storage driver details
        #[arg(long)]
        full: bool,
    },

    /// Show resource usage of the container's main process
    Usage {
        /// Container ID or name
        #[arg(value_name = "CONTAINER-ID")]
        id: String,
    },

    /// Print the engine's raw inspect response
    Json {
        /// Container ID or name
        #[arg(value_name = "CONTAINER-ID")]
        id: String,
    },

    /// List available commands
    Help,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => return report_parse_error(err),
    };

    ctrinspect_lib::observability::init_logging(cli.verbose);

    match commands::run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::print_error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

/// Print a parse failure the way each case calls for and pick the exit code
fn report_parse_error(err: clap::Error) -> ExitCode {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            let _ = err.print();
            ExitCode::SUCCESS
        }
        ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand | ErrorKind::MissingSubcommand => {
            eprint!("{}", commands::listing());
            ExitCode::FAILURE
        }
        ErrorKind::InvalidSubcommand => {
            let name = match err.get(ContextKind::InvalidSubcommand) {
                Some(ContextValue::String(name)) => name.clone(),
                _ => String::new(),
            };
            output::print_error(&format!("Unknown command: {}", name));
            eprint!("{}", commands::listing());
            ExitCode::FAILURE
        }
        _ => {
            let _ = err.print();
            ExitCode::FAILURE
        }
    }
}
