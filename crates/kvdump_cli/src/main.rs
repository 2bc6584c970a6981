//! kvdump CLI
//!
//! Moves the contents of a kvdump store to and from a binary-safe text
//! stream.
//!
//! # Commands
//!
//! - `dump <path>` - Write every record to stdout, one frame per record
//! - `load <path>` - Read frames from stdin and put each into the store
//!
//! Frames go to stdout, so logs are written to stderr.

mod commands;
mod error;

use clap::{Parser, Subcommand};
use commands::load::LoadOptions;
use error::CliError;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Dump a key-value store to a stream and load it back.
#[derive(Parser)]
#[command(name = "kvdump")]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help = true)]
struct Cli {
    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write all records of an existing store to stdout
    Dump {
        /// Path to the store directory
        path: PathBuf,

        /// Skip a damaged log tail instead of failing; the store is not modified
        #[arg(long)]
        no_strict: bool,
    },

    /// Read frames from stdin into a store, creating it if absent
    Load {
        /// Path to the store directory
        path: PathBuf,

        /// Recover from a damaged log tail instead of failing
        #[arg(long)]
        no_strict: bool,

        /// Fsync the store log before exiting
        #[arg(long)]
        sync: bool,
    },
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(kind = e.kind(), "{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Dump { path, no_strict } => {
            let stdout = io::stdout().lock();
            commands::dump::run(&path, !no_strict, stdout)?;
        }
        Commands::Load {
            path,
            no_strict,
            sync,
        } => {
            let stdin = io::stdin().lock();
            let options = LoadOptions {
                strict: !no_strict,
                sync,
            };
            commands::load::run(&path, options, stdin)?;
        }
    }
    Ok(())
}
