//! Server lifecycle: open and verify the store, wire the HTTP server, and
//! shut down gracefully on Ctrl+C.

use crate::middleware;
use actix_web::{web, App, HttpServer};
use anyhow::{Context, Result};
use hrms_configs::ServerConfig;
use hrms_core::{EmployeeDirectory, QueryGateway};
use hrms_store::{PoolConfig, QueryContext, SqlitePool};
use log::{debug, info};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Shared state handed to every actix worker.
#[derive(Clone)]
pub struct ApplicationComponents {
    pub pool: Arc<SqlitePool>,
    pub gateway: QueryGateway,
    pub directory: EmployeeDirectory,
}

impl ApplicationComponents {
    /// Register state and routes on an actix `App` or scope.
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(web::Data::new(self.gateway.clone()))
            .app_data(web::Data::new(self.directory.clone()))
            .configure(hrms_api::configure_routes);
    }
}

/// Open the connection pool and check the store answers before serving.
///
/// A store that cannot be reached aborts startup instead of surfacing as
/// per-request failures later.
pub async fn bootstrap(config: &ServerConfig) -> Result<ApplicationComponents> {
    let started = Instant::now();
    let pool_config = PoolConfig::from(&config.database);
    let acquire_timeout = pool_config.acquire_timeout;
    info!(
        "Opening SQLite store at {} (max_connections={}, read_only={})",
        pool_config.path.display(),
        pool_config.max_connections,
        pool_config.read_only
    );

    let pool = SqlitePool::new(pool_config).context("Failed to create connection pool")?;
    pool.ping(&QueryContext::with_timeout(acquire_timeout))
        .await
        .with_context(|| format!("Store at '{}' is not reachable", config.database.path))?;

    let query_timeout = Duration::from_millis(config.database.query_timeout_ms);
    let components = ApplicationComponents {
        gateway: QueryGateway::new(Arc::clone(&pool), query_timeout),
        directory: EmployeeDirectory::new(Arc::clone(&pool), query_timeout),
        pool,
    };

    info!(
        "Store ready in {:.2}ms",
        started.elapsed().as_secs_f64() * 1000.0
    );
    Ok(components)
}

/// Serve HTTP until the server stops or Ctrl+C is received.
pub async fn run(config: &ServerConfig, components: ApplicationComponents) -> Result<()> {
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let workers = config.server.effective_workers();
    info!("Starting HTTP server on {} (workers={})", bind_addr, workers);

    let cors_settings = config.security.cors.clone();
    let app_components = components.clone();
    let server = HttpServer::new(move || {
        App::new()
            .wrap(middleware::request_logger())
            .wrap(middleware::build_cors(&cors_settings))
            .configure(|cfg| app_components.configure(cfg))
    })
    .workers(workers)
    .keep_alive(Duration::from_secs(config.server.keepalive_timeout))
    .bind(&bind_addr)
    .with_context(|| format!("Failed to bind {}", bind_addr))?
    .run();

    let server_handle = server.handle();
    let server_task = tokio::spawn(server);

    tokio::select! {
        result = server_task => {
            match result {
                Ok(Err(e)) => log::error!("Server stopped with error: {}", e),
                Err(e) => log::error!("Server task failed: {}", e),
                Ok(Ok(())) => debug!("Server stopped"),
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, initiating graceful shutdown...");
            // Waits for in-flight requests; their store calls finish or are
            // interrupted by their own deadlines.
            server_handle.stop(true).await;
        }
    }

    let status = components.pool.status();
    debug!(
        "Pool at shutdown: open={} idle={} in_use={}",
        status.open, status.idle, status.in_use
    );
    info!("Server shutdown complete");
    Ok(())
}
