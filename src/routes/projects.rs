// SPDX-License-Identifier: MIT

//! Project lifecycle and membership routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{Member, Project, ProjectKind, Role};
use crate::services::membership::{
    self, require_member, require_project, MemberProfile,
};
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;
use uuid::Uuid;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/projects", get(list_projects).post(create_project))
        .route(
            "/api/projects/{id}",
            get(get_project).put(update_project).delete(delete_project),
        )
        .route(
            "/api/projects/{id}/members",
            get(list_members).post(add_member),
        )
        .route(
            "/api/projects/{id}/members/{user_id}",
            axum::routing::put(update_member_role).delete(remove_member),
        )
}

// ─── Project CRUD ────────────────────────────────────────────

#[derive(Deserialize)]
struct CreateProjectRequest {
    name: String,
    #[serde(default)]
    description: String,
    kind: ProjectKind,
}

/// List projects the caller is a member of.
async fn list_projects(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<Project>>> {
    let projects = state.db.list_projects_for_member(&auth.user_id).await?;
    Ok(Json(projects))
}

/// Create a project. The caller becomes owner and admin member.
async fn create_project(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<CreateProjectRequest>,
) -> Result<(StatusCode, Json<Project>)> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("project name is required".to_string()));
    }

    let now = format_utc_rfc3339(chrono::Utc::now());
    let project = Project {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        description: req.description,
        owner_id: auth.user_id.clone(),
        members: vec![Member {
            user_id: auth.user_id.clone(),
            role: Role::Admin,
        }],
        member_ids: vec![auth.user_id.clone()],
        kind: req.kind,
        created_at: now.clone(),
        updated_at: now,
    };

    state.db.upsert_project(&project).await?;

    tracing::info!(project_id = %project.id, owner_id = %auth.user_id, "Project created");

    Ok((StatusCode::CREATED, Json(project)))
}

/// Get a project. Members only.
async fn get_project(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(project_id): Path<String>,
) -> Result<Json<Project>> {
    let project = require_project(&state.db, &project_id).await?;
    require_member(&project, &auth.user_id)?;
    Ok(Json(project))
}

#[derive(Deserialize)]
struct UpdateProjectRequest {
    name: Option<String>,
    description: Option<String>,
    kind: Option<ProjectKind>,
}

/// Update project metadata. Owner only (not merely any admin).
async fn update_project(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(project_id): Path<String>,
    Json(req): Json<UpdateProjectRequest>,
) -> Result<Json<Project>> {
    let project = require_project(&state.db, &project_id).await?;
    if project.owner_id != auth.user_id {
        return Err(AppError::Forbidden(
            "only the project owner can update the project".to_string(),
        ));
    }

    let updated = state
        .db
        .update_project_atomic(&project_id, |project| {
            if let Some(name) = &req.name {
                let name = name.trim();
                if name.is_empty() {
                    return Err(AppError::Validation("project name is required".to_string()));
                }
                project.name = name.to_string();
            }
            if let Some(description) = &req.description {
                project.description = description.clone();
            }
            if let Some(kind) = req.kind {
                project.kind = kind;
            }
            project.updated_at = format_utc_rfc3339(chrono::Utc::now());
            Ok(())
        })
        .await?;

    Ok(Json(updated))
}

/// Delete a project and its board/todo content. Owner only.
async fn delete_project(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(project_id): Path<String>,
) -> Result<StatusCode> {
    let project = require_project(&state.db, &project_id).await?;
    if project.owner_id != auth.user_id {
        return Err(AppError::Forbidden(
            "only the project owner can delete the project".to_string(),
        ));
    }

    state.db.delete_project_cascade(&project_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

// ─── Membership ──────────────────────────────────────────────

/// List members with display fields joined from the user collection.
async fn list_members(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(project_id): Path<String>,
) -> Result<Json<Vec<MemberProfile>>> {
    let members = membership::list_members(&state.db, &project_id, &auth.user_id).await?;
    Ok(Json(members))
}

#[derive(Deserialize)]
struct AddMemberRequest {
    email: String,
    /// Defaults to viewer when omitted.
    role: Option<String>,
}

async fn add_member(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(project_id): Path<String>,
    Json(req): Json<AddMemberRequest>,
) -> Result<(StatusCode, Json<MemberProfile>)> {
    let role = match req.role.as_deref() {
        None => Role::Viewer,
        Some(raw) => Role::parse(raw)
            .ok_or_else(|| AppError::Validation(format!("unrecognized role: {}", raw)))?,
    };

    let profile =
        membership::add_member(&state.db, &project_id, &req.email, role, &auth.user_id).await?;

    Ok((StatusCode::CREATED, Json(profile)))
}

#[derive(Deserialize)]
struct UpdateMemberRoleRequest {
    role: String,
}

async fn update_member_role(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path((project_id, member_user_id)): Path<(String, String)>,
    Json(req): Json<UpdateMemberRoleRequest>,
) -> Result<Json<Project>> {
    let role = Role::parse(&req.role)
        .ok_or_else(|| AppError::Validation(format!("unrecognized role: {}", req.role)))?;

    let project = membership::update_member_role(
        &state.db,
        &project_id,
        &member_user_id,
        role,
        &auth.user_id,
    )
    .await?;

    Ok(Json(project))
}

async fn remove_member(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path((project_id, member_user_id)): Path<(String, String)>,
) -> Result<StatusCode> {
    membership::remove_member(&state.db, &project_id, &member_user_id, &auth.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
