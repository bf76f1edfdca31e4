mod error;
mod handlers;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Config;
use crate::scdl::ScdlClient;

#[derive(Clone)]
pub struct AppState {
    pub scdl: Arc<ScdlClient>,
}

pub fn router(state: AppState) -> Router {
    // Wide open on purpose: this mirrors the service's development posture.
    // Lock the origins down before exposing it publicly.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::health))
        .route("/download", post(handlers::download_single))
        .route("/download/batch", post(handlers::download_batch))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

pub async fn run(config: Config) -> Result<()> {
    let scdl = Arc::new(ScdlClient::new(
        config.auth_token.clone(),
        config.scdl_timeout,
    ));
    let app = router(AppState { scdl });

    let listener = TcpListener::bind(config.listen)
        .await
        .with_context(|| format!("failed to bind {}", config.listen))?;
    info!("listening on {}", config.listen);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown signal received");
}
