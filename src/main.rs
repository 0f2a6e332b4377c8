//! OEE Analytics server
//!
//! Serves OEE reports over HTTP from a local record store. The `import`
//! subcommand loads JSON-lines sensor documents into that store.

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

use oee_analytics::api::{create_app, ApiState};
use oee_analytics::config::OeeConfig;
use oee_analytics::storage::{import_jsonl, RecordSource, RecordStore};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "oee-analytics")]
#[command(about = "Overall Equipment Effectiveness engine and API")]
#[command(version)]
struct CliArgs {
    /// Override the server address (default: "0.0.0.0:8080")
    #[arg(short, long, env = "OEE_SERVER_ADDR")]
    addr: Option<String>,

    /// Path to the TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,

    #[command(subcommand)]
    command: Option<SubCommand>,
}

#[derive(clap::Subcommand, Debug)]
enum SubCommand {
    /// Run the HTTP API (the default when no subcommand is given)
    Serve,
    /// Load JSON-lines sensor documents into the record store
    Import {
        /// File with one document per line
        file: PathBuf,
    },
    /// Print the effective configuration as TOML
    PrintConfig,
}

// ============================================================================
// Setup
// ============================================================================

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

fn init_logging(json: bool) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_target(false);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn open_store(path: &Path) -> Result<RecordStore> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    RecordStore::open(path).with_context(|| format!("Failed to open record store at {}", path.display()))
}

// ============================================================================
// Commands
// ============================================================================

fn run_import(config: &OeeConfig, file: &Path) -> Result<()> {
    let store = open_store(&config.storage.path)?;
    let reader = BufReader::new(
        File::open(file).with_context(|| format!("Failed to open {}", file.display()))?,
    );
    let stats = import_jsonl(&store, reader)
        .with_context(|| format!("Import of {} failed", file.display()))?;
    info!(
        file = %file.display(),
        documents = stats.total(),
        "Imported {} status, {} production, {} quality documents",
        stats.status,
        stats.production,
        stats.quality
    );
    Ok(())
}

async fn run_server(config: &OeeConfig, addr: &str, cancel_token: CancellationToken) -> Result<()> {
    let store = open_store(&config.storage.path)?;
    let counts = store.counts().await.context("Failed to read record store")?;
    info!(
        path = %config.storage.path.display(),
        status = counts.status,
        production = counts.production,
        quality = counts.quality,
        "Record store opened"
    );

    let state = ApiState::new(Arc::new(store.clone()), &config.engine);
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;
    info!("HTTP server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            cancel_token.cancelled().await;
            info!("Received shutdown signal");
        })
        .await
        .context("HTTP server error")?;

    store.flush().context("Failed to flush record store")?;
    info!("Graceful shutdown complete");
    Ok(())
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();

    // Config warnings go to a plain subscriber until we know the output format.
    let bootstrap = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_target(false)
        .finish();
    let config = tracing::subscriber::with_default(bootstrap, || OeeConfig::load(args.config.as_deref()))
        .context("Failed to load configuration")?;

    init_logging(args.log_json || config.logging.json);

    match &args.command {
        Some(SubCommand::Import { file }) => return run_import(&config, file),
        Some(SubCommand::PrintConfig) => {
            print!("{}", config.to_toml()?);
            return Ok(());
        }
        Some(SubCommand::Serve) | None => {}
    }

    let addr = args.addr.unwrap_or_else(|| config.server.addr.clone());

    // Graceful shutdown via Ctrl+C
    let cancel_token = CancellationToken::new();
    let shutdown_token = cancel_token.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Received Ctrl+C, initiating shutdown...");
        shutdown_token.cancel();
    });

    run_server(&config, &addr, cancel_token).await
}
