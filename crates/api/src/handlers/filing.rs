//! Handlers that walk an actor through a workflow.
//!
//! Each request rebuilds the engine from the session store, performs one
//! operation, and persists the new state blob — nothing engine-shaped
//! outlives the request.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;

use engine::{Progress, WorkflowEngine};
use store::Actor;

use super::actor_from_headers;
use crate::dto::{AdvanceDto, FilingStateDto};
use crate::error::ApiError;
use crate::AppState;

/// Rebuild the engine for (actor, workflow) from the session store, or create
/// a fresh one on first contact.
fn load_engine(
    state: &AppState,
    actor: Actor,
    workflow_id: &str,
) -> Result<WorkflowEngine, ApiError> {
    let definition = state.definitions.load(workflow_id)?;
    let engine = match state.sessions.load(&actor, workflow_id) {
        Some(blob) => WorkflowEngine::from_state(definition, Arc::clone(&state.store), blob)?,
        None => WorkflowEngine::new(definition, Arc::clone(&state.store), actor)?,
    };
    Ok(engine)
}

pub async fn start(
    Path(id): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<FilingStateDto>, ApiError> {
    let actor = actor_from_headers(&headers)?;
    let mut engine = load_engine(&state, actor, &id)?;

    let submission = engine.start().await?;
    state.sessions.save(engine.to_state());
    Ok(Json(FilingStateDto::new(&engine, Some(submission))))
}

pub async fn advance(
    Path(id): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<AdvanceDto>,
) -> Result<Json<FilingStateDto>, ApiError> {
    let actor = actor_from_headers(&headers)?;
    let mut engine = load_engine(&state, actor, &id)?;

    let result = engine.advance(&payload.field_values).await;
    // Field writes stick even when the completion gate refuses, so persist
    // state before surfacing the error.
    state.sessions.save(engine.to_state());
    result?;

    let submission = engine.current_submission().await?;
    state.sessions.save(engine.to_state());
    Ok(Json(FilingStateDto::new(&engine, submission)))
}

pub async fn back(
    Path(id): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<FilingStateDto>, ApiError> {
    let actor = actor_from_headers(&headers)?;
    let mut engine = load_engine(&state, actor, &id)?;

    engine.go_back();
    let submission = engine.current_submission().await?;
    state.sessions.save(engine.to_state());
    Ok(Json(FilingStateDto::new(&engine, submission)))
}

pub async fn restart(
    Path(id): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<FilingStateDto>, ApiError> {
    let actor = actor_from_headers(&headers)?;
    let mut engine = load_engine(&state, actor, &id)?;

    engine.restart();
    state.sessions.save(engine.to_state());
    Ok(Json(FilingStateDto::new(&engine, None)))
}

pub async fn progress(
    Path(id): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Progress>, ApiError> {
    let actor = actor_from_headers(&headers)?;
    let engine = load_engine(&state, actor, &id)?;
    Ok(Json(engine.progress()))
}

pub async fn current_step(
    Path(id): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<FilingStateDto>, ApiError> {
    let actor = actor_from_headers(&headers)?;
    let mut engine = load_engine(&state, actor, &id)?;

    // First access to a step creates its submission, so record the id.
    let submission = engine.current_submission().await?;
    state.sessions.save(engine.to_state());
    Ok(Json(FilingStateDto::new(&engine, submission)))
}
