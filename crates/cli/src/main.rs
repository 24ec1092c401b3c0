//! paddockctl - F1 22 lap telemetry CLI
//!
//! Listens to the game's UDP stream, captures raw datagrams to disk, decodes
//! single datagrams and replays captures through the lap tracker offline.

#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![deny(clippy::unwrap_used)]

mod commands;
mod completion;
mod error;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::commands::{CaptureArgs, DecodeArgs, ListenArgs, ReplayArgs};
use crate::error::CliError;

#[derive(Parser)]
#[command(name = "paddockctl")]
#[command(about = "F1 22 lap telemetry CLI - listen, capture, decode and replay UDP telemetry")]
#[command(version)]
#[command(long_about = "
paddockctl turns the F1 22 UDP telemetry stream into lap records.

Live and History lap records are printed as they are derived; a lap that is
printed twice was corrected by the game's session history. Use --json for
one JSON object per line, suitable for piping into other tools.
")]
struct Cli {
    /// Output format (human-readable or JSON)
    #[arg(
        long,
        global = true,
        help = "Output one JSON object per line for machine parsing"
    )]
    json: bool,

    /// Verbose logging
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Listen for telemetry and print lap records until Ctrl-C
    Listen(ListenArgs),

    /// Write every received datagram to a directory, one file each
    Capture(CaptureArgs),

    /// Decode a single raw datagram file
    Decode(DecodeArgs),

    /// Feed captured datagrams through the lap tracker
    Replay(ReplayArgs),

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completion for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("paddock={log_level}").into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let result = execute_command(&cli).await;

    match result {
        Ok(()) => Ok(()),
        Err(e) => {
            if cli.json {
                output::print_error_json(&e);
            } else {
                output::print_error_human(&e);
            }

            let exit_code = match e.downcast_ref::<CliError>() {
                Some(CliError::InvalidConfiguration(_) | CliError::Listener(_)) => 2,
                Some(CliError::NoInput(_)) => 3,
                Some(CliError::Rejected(_) | CliError::Decode(_)) => 4,
                _ => 1,
            };

            std::process::exit(exit_code);
        }
    }
}

async fn execute_command(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Listen(args) => commands::listen::execute(args, cli.json).await,
        Commands::Capture(args) => commands::capture::execute(args, cli.json).await,
        Commands::Decode(args) => commands::decode::execute(args, cli.json),
        Commands::Replay(args) => commands::replay::execute(args, cli.json),
        Commands::Completion { shell } => {
            completion::generate_completion(*shell);
            Ok(())
        }
    }
}
