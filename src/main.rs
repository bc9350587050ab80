//! Precedent proxy server.
//!
//! ```text
//!     Client ──GET /api/proxy/...──▶ axum router ──▶ handler
//!                                                     │
//!                                                     ▼
//!                                         data.go.kr precedent service (XML)
//!                                                     │
//!     Client ◀──────── JSON envelope ◀── extract ◀── shape
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use precedent_proxy::config::loader::load_config;
use precedent_proxy::config::watcher::ConfigWatcher;
use precedent_proxy::config::ProxyConfig;
use precedent_proxy::http::HttpServer;
use precedent_proxy::lifecycle::{signals, Shutdown};
use precedent_proxy::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "precedent-proxy", version)]
#[command(about = "JSON proxy for the industrial-accident precedent open API", long_about = None)]
struct Args {
    /// TOML configuration file; watched for changes while running.
    #[arg(short, long, env = "PRECEDENT_PROXY_CONFIG")]
    config: Option<PathBuf>,

    /// Listen address, overriding `[listener] bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => ProxyConfig::default(),
    };
    if let Some(bind) = &args.bind {
        config.listener.bind_address = bind.clone();
    }

    logging::init(&config.observability)?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "precedent-proxy starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.base_url,
        timeout_secs = ?config.upstream.timeout_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics exporter");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let (update_tx, config_updates) = mpsc::unbounded_channel();
    let _watcher = match &args.config {
        Some(path) => {
            let (watcher, mut file_updates) = ConfigWatcher::new(path);
            let watcher = watcher.run()?;
            let bind_override = args.bind.clone();
            tokio::spawn(async move {
                while let Some(mut update) = file_updates.recv().await {
                    if let Some(bind) = &bind_override {
                        update.listener.bind_address = bind.clone();
                    }
                    if update_tx.send(update).is_err() {
                        break;
                    }
                }
            });
            Some(watcher)
        }
        None => None,
    };

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(shutdown.clone());

    let server = HttpServer::new(config)?;
    server.run(listener, config_updates, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
