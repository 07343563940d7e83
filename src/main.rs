//! VoltEdge server binary.
//!
//! Reads `$VOLTEDGE_CONFIG` (or `~/.config/voltedge/config.toml`) and runs
//! until SIGINT/SIGTERM. The `voltedge` CLI in `cli/` offers overrides.

use tracing::{error, info};

use voltedge::server::{init_tracing, ServerHandle, ServerOptions};
use voltedge::{default_config_path, AppConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = default_config_path();
    let config = match AppConfig::load(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing_subscriber::fmt()
                .with_env_filter(tracing_subscriber::EnvFilter::new("info"))
                .init();
            error!(path = %config_path.display(), error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };
    init_tracing(&config);
    info!("Configuration loaded from {}", config_path.display());

    let handle = ServerHandle::start(ServerOptions {
        config,
        create_default_admin: true,
    })
    .await?;
    handle.install_signal_handler();

    handle.shutdown_signal().wait().await;
    handle.wait().await;
    Ok(())
}
