//! Web application router and middleware setup.

use crate::meter::MeterQuery;
use crate::web::config::WebConfig;
use crate::web::handlers;
use axum::{routing::get, Router};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::{info, warn};

/// Create the axum application with the API routes, static files and middleware.
pub fn create_app(config: &WebConfig, query: MeterQuery) -> Router {
    let mut app = Router::new()
        .route("/api/swr", get(handlers::get_swr))
        .route("/api/config", get(handlers::get_config))
        .route("/api/health", get(handlers::health_check));

    match config.static_root() {
        Some(static_path) if static_path.is_dir() => {
            info!("Serving static files from: {:?}", static_path);

            if !static_path.join("index.html").exists() {
                app = app.route("/", get(handlers::default_index));
            }
            app = app.fallback_service(ServeDir::new(static_path));
        }
        Some(static_path) => {
            warn!(
                "Static path {:?} does not exist, serving default index",
                static_path
            );
            app = app.route("/", get(handlers::default_index));
        }
        None => {
            app = app.route("/", get(handlers::default_index));
        }
    }

    app = app.layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()));

    if config.enable_cors {
        app = app.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    app.with_state(query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meter::{snapshot_store, MeterConfig};

    #[tokio::test]
    async fn test_create_app() {
        let (_writer, reader) = snapshot_store();
        let config = WebConfig::default().with_static_path(Some("does/not/exist".to_string()));
        let _app = create_app(&config, MeterQuery::new(reader, MeterConfig::default()));
    }
}
