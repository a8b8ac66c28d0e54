//! Router assembly and the serving loop.

use anyhow::{Context, Result};
use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use log::{info, warn};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use super::handlers::{self, MAX_UPLOAD_BYTES};
use super::types::ApiState;
use crate::app_config::ServerConfig;

/// Body limit at the transport level; uploads between this and the handler
/// limit still get the handler's size message
const BODY_LIMIT_BYTES: usize = MAX_UPLOAD_BYTES + 10 * 1024 * 1024;

/// Build the application router
pub fn create_router(state: ApiState, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/api/upload-pdf", post(handlers::upload_pdf))
        .route("/api/generate-quiz", post(handlers::generate_quiz))
        .route("/api/generate-summary", post(handlers::generate_summary))
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(cors_layer(cors_origins))
        .with_state(state)
}

/// CORS policy: `*` allows any origin, otherwise only the listed ones
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if origins.iter().any(|origin| origin == "*") {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(allowed))
}

/// Bind and serve until Ctrl-C
pub async fn serve(state: ApiState, config: &ServerConfig) -> Result<()> {
    let router = create_router(state, &config.cors_origins_list());
    let address = config.bind_address();

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    info!("Listening on http://{}", address);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
