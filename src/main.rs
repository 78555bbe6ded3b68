// HRMS server entrypoint
//!
//! Loads configuration, installs logging, verifies the store and serves
//! HTTP until Ctrl+C.

use anyhow::Result;
use hrms_server::config::ServerConfig;
use hrms_server::{bootstrap, logging, run};
use log::info;
use std::env;

/// Environment variable naming the config file.
const CONFIG_PATH_ENV: &str = "HRMS_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[actix_web::main]
async fn main() -> Result<()> {
    let config_path = env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

    // Logging is not up yet, so report config problems on stderr.
    let (config, from_file) = match ServerConfig::load_or_default(&config_path) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("FATAL: failed to load {}: {}", config_path, e);
            std::process::exit(1);
        }
    };

    logging::init_logging(&config.logging)?;

    info!("HRMS server v{}", env!("CARGO_PKG_VERSION"));
    if from_file {
        info!("Loaded config from {}", config_path);
    } else {
        log::warn!("Config file {} not found, using defaults", config_path);
    }
    info!("Host: {}  Port: {}", config.server.host, config.server.port);

    let components = match bootstrap(&config).await {
        Ok(components) => components,
        Err(e) => {
            log::error!("Startup failed: {:#}", e);
            return Err(e);
        }
    };

    run(&config, components).await
}
