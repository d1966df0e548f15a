//! Route handlers for `/todos`.
//!
//! Path ids are taken as opaque strings: an id that is not a UUID cannot name
//! a stored item, so it takes the not-found path of each endpoint.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::ApiError;
use crate::model::{NewTodo, TodoPatch, TodoView};
use crate::AppState;

fn parse_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw).ok()
}

pub async fn health() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}

pub async fn list_todos(State(state): State<AppState>) -> Result<Json<Vec<TodoView>>, ApiError> {
    let todos = state.store.find_all().await?;
    let now = state.now();
    Ok(Json(
        todos.into_iter().map(|todo| TodoView::at(todo, now)).collect(),
    ))
}

pub async fn get_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TodoView>, ApiError> {
    let id = parse_id(&id).ok_or(ApiError::NotFound)?;
    let todo = state.store.find_by_id(id).await?.ok_or(ApiError::NotFound)?;
    Ok(Json(state.view(todo)))
}

pub async fn create_todo(
    State(state): State<AppState>,
    payload: Result<Json<NewTodo>, JsonRejection>,
) -> Result<(StatusCode, Json<TodoView>), ApiError> {
    let Json(input) = payload?;
    let todo = state.store.create(input).await?;
    info!(id = %todo.id, "todo created");
    Ok((StatusCode::CREATED, Json(state.view(todo))))
}

pub async fn update_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<TodoPatch>, JsonRejection>,
) -> Result<Json<TodoView>, ApiError> {
    // An unknown id is reported before the body is looked at.
    let id = parse_id(&id).ok_or(ApiError::NotFound)?;
    if state.store.find_by_id(id).await?.is_none() {
        return Err(ApiError::NotFound);
    }
    let Json(patch) = payload?;
    let todo = state
        .store
        .update_by_id(id, patch)
        .await?
        .ok_or(ApiError::NotFound)?;
    info!(%id, "todo updated");
    Ok(Json(state.view(todo)))
}

pub async fn delete_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if let Some(id) = parse_id(&id) {
        let removed = state.store.delete_by_id(id).await?;
        debug!(%id, removed, "todo delete");
    }
    Ok(StatusCode::NO_CONTENT)
}
