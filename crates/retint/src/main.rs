//! Retint CLI - fetch remote images in bounded parallel batches and
//! color-correct them.
//!
//! Retint lists a remote directory, downloads every file with a fixed cap on
//! concurrent transfers, then white-balances and luminance-equalizes each
//! download before writing it locally.
//!
//! # Usage
//!
//! ```bash
//! # Fetch and correct the configured remote directory
//! retint fetch
//!
//! # Only download (no correction)
//! retint fetch --fetch-only --parallel 8
//!
//! # Correct one already-downloaded file
//! retint correct n_photo.jpg
//!
//! # Serve the HTTP endpoints
//! retint serve --bind 0.0.0.0:8080
//!
//! # View configuration
//! retint config show
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;
mod logging;

/// Retint - bounded-concurrency image fetching and color correction.
#[derive(Parser, Debug)]
#[command(name = "retint")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    /// Config file (defaults to the platform config directory)
    #[arg(short, long, global = true, env = "RETINT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch the remote directory and correct every downloaded image
    Fetch(cli::fetch::FetchArgs),

    /// Correct one image that is already in the download directory
    Correct(cli::correct::CorrectArgs),

    /// Serve the /correct and /last-image HTTP endpoints
    Serve(cli::serve::ServeArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so config warnings go through eprintln.
    let strict = !matches!(cli.command, Commands::Config(_));
    let config = cli::load_config(cli.config.as_deref(), strict)?;
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Retint v{}", retint_core::VERSION);

    match cli.command {
        Commands::Fetch(args) => cli::fetch::execute(args, config).await,
        Commands::Correct(args) => cli::correct::execute(args, config).await,
        Commands::Serve(args) => cli::serve::execute(args, config).await,
        Commands::Config(args) => cli::config::execute(args, config, cli.config).await,
    }
}
