use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use homedash::{
    config::Config,
    icons::IconCatalog,
    registry::SourceRegistry,
    services::Reaper,
    web::{AppState, WebServer},
};

#[derive(Parser)]
#[command(name = "homedash")]
#[command(version)]
#[command(about = "Dashboard aggregator: sidecars push items, the dashboard reads them back")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Listening IP address
    #[arg(short = 'H', long, value_name = "IP")]
    host: Option<String>,

    /// Listening port
    #[arg(short, long, value_name = "PORT")]
    port: Option<u16>,

    /// Log level (defaults to info, or debug when `debug = true` in the config)
    #[arg(short = 'v', long)]
    log_level: Option<String>,

    /// Download a fresh icon catalog at startup even if a cached one exists
    #[arg(long)]
    refresh_icons: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logging comes up before the config so its load is logged; `debug = true`
    // is applied once the config is known.
    let log_level = cli.log_level.clone().unwrap_or_else(|| "info".to_string());
    let rust_log_set = std::env::var_os("RUST_LOG").is_some();
    let (filter_layer, filter_handle) = tracing_subscriber::reload::Layer::new(
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| log_filter(&log_level).into()),
    );
    tracing_subscriber::registry()
        .with(filter_layer)
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting HomeDash v{}", env!("CARGO_PKG_VERSION"));

    let mut config = Config::load_from_file(&cli.config)?;

    if let Some(level) = config_log_level(cli.log_level.is_some(), rust_log_set, config.debug) {
        if let Err(e) = filter_handle.reload(tracing_subscriber::EnvFilter::new(log_filter(level))) {
            warn!("Failed to apply log level {} from configuration: {}", level, e);
        }
    }
    info!("Configuration loaded from: {}", cli.config);

    if let Some(host) = cli.host {
        config.web.host = host;
    }
    if let Some(port) = cli.port {
        config.web.port = port;
    }
    if cli.refresh_icons {
        config.icons.refresh_on_start = true;
    }

    let cancellation_token = CancellationToken::new();
    let registry = SourceRegistry::new();

    let catalog = Arc::new(IconCatalog::from_config(&config.icons));
    info!(
        "Icon cache: {}, scratch: {}",
        config.icons.cache_dir.display(),
        config.icons.tmp_dir.display()
    );

    // The catalog loads in the background; until it does every icon
    // resolves to the default.
    let startup_catalog = Arc::clone(&catalog);
    let refresh_on_start = config.icons.refresh_on_start;
    tokio::spawn(async move {
        match startup_catalog.initialize(refresh_on_start).await {
            Ok(count) => info!("Icon catalog ready with {} icons", count),
            Err(e) => error!(
                "Icon catalog unavailable, serving default icons: {}",
                e
            ),
        }
    });

    let reaper = Reaper::from_config(registry.clone(), &config.registry);
    let reaper_handle = tokio::spawn(reaper.run(cancellation_token.clone()));

    if !config.static_items.apps.is_empty() {
        info!("Loaded {} static items", config.static_items.apps.len());
    }

    let state = AppState::new(config, registry, catalog);
    let web_server = WebServer::new(state)?;

    let signal_token = cancellation_token.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        signal_token.cancel();
    });

    let served = web_server
        .serve_with_cancellation(cancellation_token.clone())
        .await;

    cancellation_token.cancel();
    if let Err(e) = reaper_handle.await {
        warn!("Reaper task ended abnormally: {}", e);
    }

    info!("HomeDash stopped");
    served
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
        ) {
            (Ok(mut sigterm), Ok(mut sigint)) => {
                tokio::select! {
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down gracefully"),
                    _ = sigint.recv() => info!("Received SIGINT (Ctrl+C), shutting down gracefully"),
                }
            }
            _ => {
                warn!("Failed to install signal handlers, falling back to Ctrl+C");
                ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    ctrl_c().await;
}

async fn ctrl_c() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C, shutting down gracefully"),
        Err(e) => {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

fn log_filter(level: &str) -> String {
    if level == "trace" {
        format!("homedash={},tower_http=trace", level)
    } else {
        format!("homedash={}", level)
    }
}

/// Level to switch to once the config is loaded, if the config decides it.
/// An explicit `--log-level` or `RUST_LOG` always wins.
fn config_log_level(cli_level_set: bool, rust_log_set: bool, debug: bool) -> Option<&'static str> {
    (debug && !cli_level_set && !rust_log_set).then_some("debug")
}
