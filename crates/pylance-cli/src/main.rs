//! Operator CLI for the Pylance server installer.
//!
//! The CLI is organized around subcommands:
//! - `install` - Download and unpack the server package in the foreground
//! - `status` - Show the resolved cache paths and install state
//! - `config` - Print the merged launch configuration as JSON
//! - `clean` - Remove the installed package from disk
//! - `completions` - Generate shell completions
//!
//! # Examples
//!
//! ```bash
//! # Install the pinned server version into the default storage root
//! pylance-cli install
//!
//! # Inspect what would be launched, merging a settings file
//! pylance-cli config --settings LSP-pylance.json
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

/// Pylance server installer - marketplace download, caching, and launch
/// configuration for the Pylance language server.
#[derive(Parser, Debug)]
#[command(name = "pylance-cli")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Storage root the package installs under
    /// (default: platform data directory + "pylance")
    #[arg(long, global = true)]
    storage: Option<PathBuf>,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download and unpack the server package in the foreground.
    ///
    /// Resolves the versioned install directory, fetches the `.vsix`
    /// archive from the marketplace gallery, unpacks it, and verifies the
    /// server entry point exists. Does nothing when the pinned version is
    /// already installed.
    Install {
        /// Override the marketplace gallery base URL
        #[arg(long)]
        endpoint: Option<String>,
    },

    /// Show the resolved cache paths and install state.
    Status,

    /// Print the merged launch configuration as JSON.
    ///
    /// Reads the recognized settings keys out of `--settings` (when
    /// given), fills in the default launch command, and expands the
    /// install-time variables.
    Config {
        /// JSON settings file to merge (same shape as the package
        /// settings)
        #[arg(long)]
        settings: Option<PathBuf>,
    },

    /// Remove the installed package from disk.
    Clean,

    /// Generate shell completions.
    ///
    /// Prints a completion script to stdout that can be sourced or saved
    /// to enable tab completion for this CLI.
    Completions {
        /// Target shell for completion generation
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    match cli.command {
        Commands::Install { endpoint } => commands::install::run(cli.storage, endpoint).await,
        Commands::Status => commands::status::run(cli.storage),
        Commands::Config { settings } => commands::config::run(cli.storage, settings),
        Commands::Clean => commands::clean::run(cli.storage),
        Commands::Completions { shell } => {
            use clap::CommandFactory;
            let mut cmd = Cli::command();
            commands::completions::run(shell, &mut cmd);
            Ok(())
        }
    }
}

/// Initializes tracing with a level derived from the verbosity flag, or
/// from `RUST_LOG` when set.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
