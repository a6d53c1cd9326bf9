use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub mod error;
pub mod handlers;
pub mod render;

use crate::workflow::Orchestrator;

pub use error::{AppError, AppResult};

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
}

/// Routes for the three workflow steps plus clip downloads
pub fn router(orchestrator: Arc<Orchestrator>) -> Router {
    let clips = ServeDir::new(&orchestrator.settings().output_dir);

    Router::new()
        .route("/", get(handlers::index))
        .route("/new", post(handlers::new_video))
        .route("/step2", get(handlers::step2))
        .route("/generate", post(handlers::generate))
        .nest_service("/download", clips)
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { orchestrator })
}

pub async fn serve(orchestrator: Arc<Orchestrator>, addr: SocketAddr) -> anyhow::Result<()> {
    let app = router(orchestrator);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    tracing::info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await.context("HTTP server failed")?;
    Ok(())
}
