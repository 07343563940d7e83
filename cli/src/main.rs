//! VoltEdge command-line server
//!
//! ```sh
//! # Default config (~/.config/voltedge/config.toml)
//! voltedge
//!
//! # Custom config and port
//! voltedge --config /etc/voltedge/config.toml --port 8080
//!
//! # Write a default config file, then validate it
//! voltedge --init
//! voltedge --check
//! ```

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};

use voltedge::config::AppConfig;
use voltedge::server::{init_tracing, ServerHandle, ServerOptions};

#[derive(Parser, Debug)]
#[command(
    name = "voltedge",
    version,
    about = "EV charging network REST service",
    long_about = "VoltEdge: stations, chargers, metered charging sessions and maintenance \
                  behind a JSON REST API.\n\n\
                  Default config: ~/.config/voltedge/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "VOLTEDGE_CONFIG")]
    config: Option<PathBuf>,

    /// Override the listen address host.
    #[arg(long)]
    host: Option<String>,

    /// Override the listen port.
    #[arg(short, long)]
    port: Option<u16>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Validate the configuration and exit.
    #[arg(long)]
    check: bool,

    /// Write a default configuration file if none exists, then exit.
    #[arg(long)]
    init: bool,

    /// Skip creating the default admin user.
    #[arg(long)]
    no_admin: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config_path = cli.config.unwrap_or_else(voltedge::default_config_path);

    if cli.init {
        if config_path.exists() {
            println!("Config already exists at {}", config_path.display());
        } else {
            AppConfig::default().save(&config_path)?;
            println!("Wrote default config to {}", config_path.display());
        }
        return Ok(());
    }

    let mut config = match AppConfig::load(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Invalid configuration at {}: {}", config_path.display(), e);
            return Err(e.into());
        }
    };

    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }

    if cli.check {
        config.validate()?;
        println!("Configuration is valid");
        println!("   Config file : {}", config_path.display());
        println!("   Listen      : {}", config.listen_address());
        println!("   Log level   : {}", config.logging.level);
        println!("   Admin       : {}", if config.admin.enabled { config.admin.email.as_str() } else { "disabled" });
        return Ok(());
    }

    init_tracing(&config);
    info!("Configuration loaded from {}", config_path.display());

    let handle = match ServerHandle::start(ServerOptions {
        config,
        create_default_admin: !cli.no_admin,
    })
    .await
    {
        Ok(handle) => handle,
        Err(e) => {
            error!(error = %e, "Failed to start");
            return Err(e);
        }
    };

    handle.install_signal_handler();
    info!("Press Ctrl+C to shut down gracefully");

    handle.shutdown_signal().wait().await;
    handle.wait().await;
    Ok(())
}
