/// Task endpoints
///
/// All routes require a session; every lookup is scoped to the caller, so
/// another user's task answers 404 exactly like a missing one.
///
/// # Endpoints
///
/// - `POST /tasks` - Create a task
/// - `GET /tasks?completed=true&sortBy=createdAt:desc&limit=10&skip=20` - List tasks
/// - `GET /tasks/:id` - Fetch one task
/// - `PATCH /tasks/:id` - Update name, description, notes, priority or completed
/// - `DELETE /tasks/:id` - Delete a task, returning it

use crate::{
    app::AppState,
    error::ApiResult,
    extract::{JsonBody, QueryParams},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;
use taskmanager_shared::{
    auth::middleware::AuthContext,
    models::task::{ListTasksParams, NewTask, Task},
};

pub async fn create_task(
    State(state): State<AppState>,
    auth: AuthContext,
    JsonBody(req): JsonBody<NewTask>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let task = state.tasks.create(auth.user.id, req).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// Lists the caller's tasks
///
/// # Query Parameters
///
/// - `completed`: `true` selects done tasks, empty means no filter, any other value open ones
/// - `sortBy`: `<field>` or `<field>:desc`
/// - `limit`, `skip`: pagination; `limit=0` means no limit
pub async fn list_tasks(
    State(state): State<AppState>,
    auth: AuthContext,
    QueryParams(params): QueryParams<ListTasksParams>,
) -> ApiResult<Json<Vec<Task>>> {
    Ok(Json(state.tasks.list(auth.user.id, params).await?))
}

pub async fn get_task(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<String>,
) -> ApiResult<Json<Task>> {
    Ok(Json(state.tasks.get(auth.user.id, &id).await?))
}

pub async fn update_task(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<String>,
    JsonBody(patch): JsonBody<Value>,
) -> ApiResult<Json<Task>> {
    Ok(Json(state.tasks.update(auth.user.id, &id, patch).await?))
}

pub async fn delete_task(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<String>,
) -> ApiResult<Json<Task>> {
    Ok(Json(state.tasks.delete(auth.user.id, &id).await?))
}
