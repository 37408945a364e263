//! `api` crate — HTTP REST surface over the workflow engine.
//!
//! Exposes:
//!   GET    /api/v1/workflows
//!   GET    /api/v1/workflows/{id}
//!   POST   /api/v1/workflows/{id}/start
//!   POST   /api/v1/workflows/{id}/advance
//!   POST   /api/v1/workflows/{id}/back
//!   POST   /api/v1/workflows/{id}/restart
//!   GET    /api/v1/workflows/{id}/progress
//!   GET    /api/v1/workflows/{id}/step
//!
//! The actor is identified by an `X-User-Id` or `X-Session-Token` header
//! (exactly one).  Engine state lives in the in-memory [`SessionStore`],
//! keyed per (actor, workflow); concurrent writers resolve last-write-wins.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use catalog::DefinitionRepository;
use store::SubmissionStore;

pub mod dto;
pub mod error;
pub mod handlers;
pub mod session;

pub use error::ApiError;
pub use session::SessionStore;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub definitions: Arc<DefinitionRepository>,
    pub store: Arc<dyn SubmissionStore>,
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    pub fn new(definitions: Arc<DefinitionRepository>, store: Arc<dyn SubmissionStore>) -> Self {
        Self {
            definitions,
            store,
            sessions: Arc::new(SessionStore::default()),
        }
    }
}

/// Build the API router with all routes.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/workflows", get(handlers::workflows::list))
        .route("/api/v1/workflows/:id", get(handlers::workflows::get))
        .route("/api/v1/workflows/:id/start", post(handlers::filing::start))
        .route(
            "/api/v1/workflows/:id/advance",
            post(handlers::filing::advance),
        )
        .route("/api/v1/workflows/:id/back", post(handlers::filing::back))
        .route(
            "/api/v1/workflows/:id/restart",
            post(handlers::filing::restart),
        )
        .route(
            "/api/v1/workflows/:id/progress",
            get(handlers::filing::progress),
        )
        .route(
            "/api/v1/workflows/:id/step",
            get(handlers::filing::current_step),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn serve(bind: &str, state: AppState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("API listening on {bind}");
    axum::serve(listener, router(state)).await?;
    Ok(())
}
