// SPDX-License-Identifier: MIT

//! Todo routes.
//!
//! Inbox todos (no project) are owner-only. Project-attached todos are
//! open to any member regardless of role; membership is the only gate,
//! unlike the board.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{Priority, Todo, TodoStatus};
use crate::services::membership::get_user_role;
use crate::services::{activity_log, streak};
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/todos", get(list_todos).post(create_todo))
        .route(
            "/api/todos/{id}",
            get(get_todo).put(update_todo).delete(delete_todo),
        )
}

/// Check that the actor may touch this todo: owner for inbox items, any
/// member for project items.
async fn check_todo_access(
    state: &AppState,
    todo: &Todo,
    user_id: &str,
) -> Result<()> {
    match &todo.project_id {
        None => {
            if todo.owner_id != user_id {
                return Err(AppError::Forbidden(
                    "only the owner can access this todo".to_string(),
                ));
            }
        }
        Some(project_id) => {
            get_user_role(&state.db, project_id, user_id)
                .await?
                .ok_or_else(|| {
                    AppError::Forbidden("not a member of this project".to_string())
                })?;
        }
    }
    Ok(())
}

// ─── CRUD ────────────────────────────────────────────────────

#[derive(Deserialize)]
struct ListTodosQuery {
    /// Limit the listing to one project's todos.
    project_id: Option<String>,
}

/// List the caller's inbox, or one project's todos.
async fn list_todos(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Query(params): Query<ListTodosQuery>,
) -> Result<Json<Vec<Todo>>> {
    let todos = match params.project_id {
        Some(project_id) => {
            get_user_role(&state.db, &project_id, &auth.user_id)
                .await?
                .ok_or_else(|| {
                    AppError::Forbidden("not a member of this project".to_string())
                })?;
            state.db.list_todos_for_project(&project_id).await?
        }
        None => state.db.list_inbox_todos(&auth.user_id).await?,
    };
    Ok(Json(todos))
}

#[derive(Deserialize)]
struct CreateTodoRequest {
    title: String,
    #[serde(default)]
    description: String,
    project_id: Option<String>,
    due_date: Option<String>,
    priority: Option<Priority>,
    #[serde(default)]
    tags: Vec<String>,
}

async fn create_todo(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<CreateTodoRequest>,
) -> Result<(StatusCode, Json<Todo>)> {
    let title = req.title.trim();
    if title.is_empty() {
        return Err(AppError::Validation("title is required".to_string()));
    }

    // Attaching to a project requires membership (any role).
    if let Some(project_id) = &req.project_id {
        get_user_role(&state.db, project_id, &auth.user_id)
            .await?
            .ok_or_else(|| AppError::Forbidden("not a member of this project".to_string()))?;
    }

    let now = format_utc_rfc3339(chrono::Utc::now());
    let todo = Todo {
        id: Uuid::new_v4().to_string(),
        title: title.to_string(),
        description: req.description,
        project_id: req.project_id,
        owner_id: auth.user_id.clone(),
        status: TodoStatus::Todo,
        due_date: req.due_date,
        priority: req.priority.unwrap_or(Priority::Medium),
        tags: req.tags,
        completed_at: None,
        created_at: now.clone(),
        updated_at: now,
    };

    state.db.upsert_todo(&todo).await?;

    Ok((StatusCode::CREATED, Json(todo)))
}

async fn get_todo(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(todo_id): Path<String>,
) -> Result<Json<Todo>> {
    let todo = state
        .db
        .get_todo(&todo_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Todo {} not found", todo_id)))?;

    check_todo_access(&state, &todo, &auth.user_id).await?;

    Ok(Json(todo))
}

#[derive(Deserialize)]
struct UpdateTodoRequest {
    title: Option<String>,
    description: Option<String>,
    status: Option<TodoStatus>,
    due_date: Option<Option<String>>,
    priority: Option<Priority>,
    tags: Option<Vec<String>>,
}

/// Update a todo. Completing it advances the acting user's streak.
async fn update_todo(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(todo_id): Path<String>,
    Json(req): Json<UpdateTodoRequest>,
) -> Result<Json<Todo>> {
    let mut todo = state
        .db
        .get_todo(&todo_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Todo {} not found", todo_id)))?;

    check_todo_access(&state, &todo, &auth.user_id).await?;

    if let Some(title) = req.title {
        let title = title.trim().to_string();
        if title.is_empty() {
            return Err(AppError::Validation("title is required".to_string()));
        }
        todo.title = title;
    }
    if let Some(description) = req.description {
        todo.description = description;
    }
    if let Some(due_date) = req.due_date {
        todo.due_date = due_date;
    }
    if let Some(priority) = req.priority {
        todo.priority = priority;
    }
    if let Some(tags) = req.tags {
        todo.tags = tags;
    }

    let now = chrono::Utc::now();
    let just_completed = match req.status {
        Some(TodoStatus::Completed) if todo.status != TodoStatus::Completed => {
            todo.status = TodoStatus::Completed;
            todo.completed_at = Some(format_utc_rfc3339(now));
            true
        }
        Some(TodoStatus::Todo) if todo.status == TodoStatus::Completed => {
            // Reopening does not rewind the streak.
            todo.status = TodoStatus::Todo;
            todo.completed_at = None;
            false
        }
        _ => false,
    };
    todo.updated_at = format_utc_rfc3339(now);

    state.db.upsert_todo(&todo).await?;

    if just_completed {
        streak::advance_on_activity(&state.db, &auth.user_id, now).await?;
        activity_log::record(
            &state.db,
            &auth.user_id,
            "todo_completed",
            serde_json::json!({ "todo_id": todo.id, "project_id": todo.project_id }),
        )
        .await;
    }

    Ok(Json(todo))
}

async fn delete_todo(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(todo_id): Path<String>,
) -> Result<StatusCode> {
    let todo = state
        .db
        .get_todo(&todo_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Todo {} not found", todo_id)))?;

    check_todo_access(&state, &todo, &auth.user_id).await?;

    state.db.delete_todo(&todo_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
