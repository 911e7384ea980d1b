// This is the command-line entry point for the background remover.
// The lib.rs file holds everything else and serves as the public API.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use bg_remover_lib::{AppConfig, AppState, download_result, remove_background_file};

/// Remove the background of an image using a remote removal service.
#[derive(Debug, Parser)]
#[command(name = "bg-remover", version, about)]
struct Cli {
    /// Image to process (JPG, PNG or WebP)
    input: PathBuf,

    /// Where to save the result: a directory or a file path
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    /// JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Base URL of the removal service (overrides config and environment)
    #[arg(long)]
    endpoint: Option<String>,

    /// Log debug output
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)         // Remove file path
        .with_line_number(false)  // Remove line numbers
        .with_thread_ids(false)   // Remove thread IDs
        .with_thread_names(false) // Remove thread names
        .with_target(false)       // Remove module path
        .with_ansi(true)          // Keep colored output
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = AppConfig::load(cli.config.as_deref()).context("Failed to load config")?;
    if let Some(endpoint) = cli.endpoint {
        config.endpoint = endpoint;
        config.validate().context("Invalid endpoint")?;
    }

    let state = AppState::new(config).context("Failed to initialize client")?;

    let result = remove_background_file(&state, &cli.input)
        .await
        .with_context(|| format!("Failed to process {}", cli.input.display()))?;

    let saved = download_result(&result, &cli.output)
        .await
        .context("Failed to save result")?;

    info!("Saved {} ({} bytes)", saved.display(), result.size_bytes());
    println!("{}", saved.display());
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
