//! Airdash server
//!
//! Usage:
//!   airdash                        # defaults, key from AIRDASH_SERVICE_KEY
//!   airdash -c airdash.yaml        # load config file
//!   airdash -c airdash.yaml -p 8080

use airdash::api;
use airdash::{Config, Dashboard, DataPortalClient, GeoStore, TtlCache};
use argh::FromArgs;
use std::sync::Arc;

/// Airdash - air quality and weather dashboard backend
#[derive(FromArgs)]
struct Args {
    /// path to YAML config file
    #[argh(option, short = 'c')]
    config: Option<String>,

    /// HTTP listen port (overrides the config file)
    #[argh(option, short = 'p')]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let args: Args = argh::from_env();

    let mut config = match &args.config {
        Some(path) => {
            log::info!("Loading config from {}", path);
            Config::from_file(path)?
        }
        None => Config::default(),
    };
    config.apply_env();
    if let Some(port) = args.port {
        config.server.port = port;
    }
    config.validate()?;

    let client = DataPortalClient::new(config.service_key.clone(), config.upstream.clone());
    let dashboard = Dashboard::new(
        client,
        TtlCache::new(config.cache_ttl()),
        GeoStore::new(&config.geodata.cache_file),
    );

    log::info!("Cache TTL: {}s", config.cache.ttl_secs);
    log::info!("Map snapshot: {}", config.geodata.cache_file.display());
    let static_dir = config.server.static_dir.as_deref().filter(|dir| {
        let exists = dir.is_dir();
        if !exists {
            log::warn!("Static directory {} not found, front-end disabled", dir.display());
        }
        exists
    });

    let app = api::router(Arc::new(dashboard), static_dir);
    api::serve(app, &config.listen_addr(), shutdown_signal()).await
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = ctrl_c => {},
            _ = sigterm.recv() => {},
        }
    }

    #[cfg(not(unix))]
    ctrl_c.await.expect("failed to install Ctrl+C handler");

    log::info!("Shutdown signal received");
}
