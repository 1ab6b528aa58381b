// SPDX-License-Identifier: MIT

//! Kanban board routes.
//!
//! Reads are open to every member; mutations require editor-or-above.
//! Moving a task into a terminal column advances the mover's streak.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{BoardColumn, BoardTask, Priority, Project};
use crate::services::membership::{require_editor, require_member, require_project};
use crate::services::{activity_log, streak};
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/board/{project_id}", get(get_board))
        .route("/api/board/{project_id}/tasks", post(create_task))
        .route(
            "/api/board/tasks/{id}",
            put(update_task).delete(delete_task),
        )
        .route("/api/board/tasks/{id}/move", put(move_task))
}

/// Columns and tasks of one project's board.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct BoardResponse {
    #[cfg_attr(feature = "binding-generation", ts(type = "unknown[]"))]
    pub columns: Vec<BoardColumn>,
    #[cfg_attr(feature = "binding-generation", ts(type = "unknown[]"))]
    pub tasks: Vec<BoardTask>,
}

/// Fetch a task and its project, checking editor access.
async fn task_for_edit(
    state: &AppState,
    task_id: &str,
    user_id: &str,
) -> Result<(BoardTask, Project)> {
    let task = state
        .db
        .get_board_task(task_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Task {} not found", task_id)))?;

    let project = require_project(&state.db, &task.project_id).await?;
    require_editor(&project, user_id)?;

    Ok((task, project))
}

// ─── Board ───────────────────────────────────────────────────

/// Get a project's board, lazily creating the default column triple the
/// first time it is read.
async fn get_board(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(project_id): Path<String>,
) -> Result<Json<BoardResponse>> {
    let project = require_project(&state.db, &project_id).await?;
    require_member(&project, &auth.user_id)?;

    let mut columns = state.db.list_board_columns(&project_id).await?;
    if columns.is_empty() {
        columns = BoardColumn::default_triple(
            &project_id,
            [
                Uuid::new_v4().to_string(),
                Uuid::new_v4().to_string(),
                Uuid::new_v4().to_string(),
            ],
        );
        state.db.insert_board_columns(&columns).await?;
        tracing::info!(project_id, "Board initialized with default columns");
    }

    let tasks = state.db.list_board_tasks(&project_id).await?;

    Ok(Json(BoardResponse { columns, tasks }))
}

// ─── Tasks ───────────────────────────────────────────────────

#[derive(Deserialize)]
struct CreateTaskRequest {
    title: String,
    #[serde(default)]
    description: String,
    column_id: String,
    assignee_id: Option<String>,
    priority: Option<Priority>,
    #[serde(default)]
    tags: Vec<String>,
    due_date: Option<String>,
    #[serde(default)]
    order: u32,
}

/// Create a board task. Editor-or-above.
async fn create_task(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(project_id): Path<String>,
    Json(req): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<BoardTask>)> {
    let project = require_project(&state.db, &project_id).await?;
    require_editor(&project, &auth.user_id)?;

    let title = req.title.trim();
    if title.is_empty() {
        return Err(AppError::Validation("title is required".to_string()));
    }

    let column = state
        .db
        .get_board_column(&req.column_id)
        .await?
        .filter(|c| c.project_id == project_id)
        .ok_or_else(|| AppError::NotFound(format!("Column {} not found", req.column_id)))?;

    let now = format_utc_rfc3339(chrono::Utc::now());
    let task = BoardTask {
        id: Uuid::new_v4().to_string(),
        project_id,
        title: title.to_string(),
        description: req.description,
        column_id: column.id,
        assignee_id: req.assignee_id,
        priority: req.priority.unwrap_or(Priority::Medium),
        tags: req.tags,
        due_date: req.due_date,
        order: req.order,
        created_by: auth.user_id.clone(),
        created_at: now.clone(),
        updated_at: now,
    };

    state.db.upsert_board_task(&task).await?;

    Ok((StatusCode::CREATED, Json(task)))
}

#[derive(Deserialize)]
struct UpdateTaskRequest {
    title: Option<String>,
    description: Option<String>,
    assignee_id: Option<Option<String>>,
    priority: Option<Priority>,
    tags: Option<Vec<String>>,
    due_date: Option<Option<String>>,
    order: Option<u32>,
}

/// Edit task fields (column changes go through `move_task`).
async fn update_task(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(task_id): Path<String>,
    Json(req): Json<UpdateTaskRequest>,
) -> Result<Json<BoardTask>> {
    let (mut task, _) = task_for_edit(&state, &task_id, &auth.user_id).await?;

    if let Some(title) = req.title {
        let title = title.trim().to_string();
        if title.is_empty() {
            return Err(AppError::Validation("title is required".to_string()));
        }
        task.title = title;
    }
    if let Some(description) = req.description {
        task.description = description;
    }
    if let Some(assignee_id) = req.assignee_id {
        task.assignee_id = assignee_id;
    }
    if let Some(priority) = req.priority {
        task.priority = priority;
    }
    if let Some(tags) = req.tags {
        task.tags = tags;
    }
    if let Some(due_date) = req.due_date {
        task.due_date = due_date;
    }
    if let Some(order) = req.order {
        task.order = order;
    }
    task.updated_at = format_utc_rfc3339(chrono::Utc::now());

    state.db.upsert_board_task(&task).await?;

    Ok(Json(task))
}

#[derive(Deserialize)]
struct MoveTaskRequest {
    column_id: String,
    order: Option<u32>,
}

/// Move a task between columns. Entering a terminal column advances the
/// mover's streak, whoever created or is assigned the task.
async fn move_task(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(task_id): Path<String>,
    Json(req): Json<MoveTaskRequest>,
) -> Result<Json<BoardTask>> {
    let (mut task, _) = task_for_edit(&state, &task_id, &auth.user_id).await?;

    let target = state
        .db
        .get_board_column(&req.column_id)
        .await?
        .filter(|c| c.project_id == task.project_id)
        .ok_or_else(|| AppError::NotFound(format!("Column {} not found", req.column_id)))?;

    let entering_terminal = target.is_terminal && task.column_id != target.id;

    task.column_id = target.id.clone();
    if let Some(order) = req.order {
        task.order = order;
    }
    let now = chrono::Utc::now();
    task.updated_at = format_utc_rfc3339(now);

    state.db.upsert_board_task(&task).await?;

    if entering_terminal {
        streak::advance_on_activity(&state.db, &auth.user_id, now).await?;
        activity_log::record(
            &state.db,
            &auth.user_id,
            "board_task_completed",
            serde_json::json!({
                "task_id": task.id,
                "project_id": task.project_id,
                "column_id": target.id,
            }),
        )
        .await;
    }

    Ok(Json(task))
}

/// Delete a task. Editor-or-above.
async fn delete_task(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(task_id): Path<String>,
) -> Result<StatusCode> {
    let (task, _) = task_for_edit(&state, &task_id, &auth.user_id).await?;

    state.db.delete_board_task(&task.id).await?;

    Ok(StatusCode::NO_CONTENT)
}
