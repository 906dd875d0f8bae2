//! Web server and API endpoints for the SWR meter.
//!
//! Serves the latest reading and the meter configuration as JSON, plus the
//! dashboard's static files for every other path.

pub mod config;
pub mod handlers;
pub mod router;

// Re-export commonly used items
pub use config::WebConfig;
pub use handlers::SwrReading;
pub use router::create_app;

use crate::error::{Result, SwrError};
use crate::meter::MeterQuery;
use std::future::Future;
use std::net::SocketAddr;
use tracing::info;

/// Start the web server and run it until `shutdown` resolves.
pub async fn start_web_server<F>(config: WebConfig, query: MeterQuery, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = create_app(&config, query);

    let addr = config
        .bind_address()
        .parse::<SocketAddr>()
        .map_err(|e| SwrError::config_error(format!("Invalid bind address: {}", e)))?;

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| SwrError::web_server_error(format!("Failed to bind to address: {}", e)))?;

    info!("Starting SWR meter web server on http://{}", addr);
    info!("API endpoint: http://{}/api/swr", addr);
    info!("Config endpoint: http://{}/api/config", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| SwrError::web_server_error(format!("Server error: {}", e)))?;

    info!("Web server stopped");
    Ok(())
}
