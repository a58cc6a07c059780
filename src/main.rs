//! Notekeeper CLI - standalone note-taking HTTP server

use clap::Parser;
use notekeeper::config::{expand_path, LoggingConfig};
use notekeeper::{Config, Core};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "notekeeper")]
#[command(author = "Notekeeper Team")]
#[command(version)]
#[command(about = "Notekeeper - minimal multi-user note-taking service", long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "~/.notekeeper/config.toml")]
    config: PathBuf,

    /// Override server port
    #[arg(short, long)]
    port: Option<u16>,

    /// Override server host
    #[arg(long)]
    host: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Initialize a new config file with defaults
    #[arg(long)]
    init: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config_path = expand_path(&args.config);

    // Handle --init flag
    if args.init {
        init_logging(args.verbose, &LoggingConfig::default());
        if config_path.exists() {
            tracing::warn!("Config file already exists: {}", config_path.display());
            return Ok(());
        }
        Config::create_default(&config_path)?;
        tracing::info!("Created default config at: {}", config_path.display());
        return Ok(());
    }

    // Load configuration
    let config_found = config_path.exists();
    let mut config = if config_found {
        Config::from_file(&config_path)?
    } else {
        Config::default()
    };
    config.apply_env_overrides();

    // Apply CLI overrides
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(host) = args.host {
        config.server.host = host;
    }

    // Held until exit so buffered file logs are flushed
    let _log_guard = init_logging(args.verbose, &config.logging);

    if !config_found {
        tracing::warn!(
            "Config file not found at {}, using defaults",
            config_path.display()
        );
    }

    let core = Core::new(config);

    // Start API server (blocks until shutdown)
    core.start_api_server().await?;

    Ok(())
}

/// Install the stdout subscriber, plus a daily-rolling file layer when a log
/// directory is configured
fn init_logging(verbose: bool, logging: &LoggingConfig) -> Option<WorkerGuard> {
    let log_level = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("notekeeper={},tower_http=debug", log_level).into());

    let (file_layer, guard) = match logging.log_dir() {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, &logging.file_prefix);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .init();

    guard
}
