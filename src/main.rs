//! EVPulse API server.
//!
//! Reads configuration from a TOML file (`EVPULSE_CONFIG`, default
//! `~/.config/evpulse/config.toml`) plus environment overrides.

use tracing::{error, info};

use evpulse::config::{config_path_from_env, AppConfig};
use evpulse::server::{init_tracing, ServerHandle, ServerOptions};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = config_path_from_env();
    let config = match AppConfig::load(&config_path) {
        Ok(cfg) => {
            init_tracing(&cfg);
            info!("Configuration loaded from {}", config_path.display());
            cfg
        }
        Err(e) => {
            let cfg = AppConfig::default();
            init_tracing(&cfg);
            error!("Failed to load config: {}. Using defaults.", e);
            cfg
        }
    };

    let handle = ServerHandle::start(ServerOptions::from(config)).await?;
    handle.install_signal_handler();
    info!("Press Ctrl+C to shut down gracefully");

    handle.shutdown_signal().wait().await;
    handle.wait().await;
    Ok(())
}
