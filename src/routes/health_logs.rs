// SPDX-License-Identifier: MIT

//! Health log routes. Strictly owner-scoped; every creation counts as
//! qualifying activity for the streak.

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
use crate::models::{HealthLog, HealthLogKind};
use crate::services::{activity_log, streak};
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/health", get(list_logs).post(create_log))
        .route(
            "/api/health/{id}",
            get(get_log).put(update_log).delete(delete_log),
        )
}

/// Fetch a log and check ownership. Health data is never shared, so
/// anything that isn't yours is a 403.
async fn owned_log(state: &AppState, log_id: &str, user_id: &str) -> Result<HealthLog> {
    let log = state
        .db
        .get_health_log(log_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Health log {} not found", log_id)))?;

    if log.user_id != user_id {
        return Err(AppError::Forbidden(
            "health logs are private to their owner".to_string(),
        ));
    }

    Ok(log)
}

#[derive(Deserialize)]
struct ListLogsQuery {
    /// Filter by kind tag ("water", "gym", "sleep", "diet", "custom")
    kind: Option<String>,
}

async fn list_logs(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Query(params): Query<ListLogsQuery>,
) -> Result<Json<Vec<HealthLog>>> {
    if let Some(kind) = &params.kind {
        if !matches!(kind.as_str(), "water" | "gym" | "sleep" | "diet" | "custom") {
            return Err(AppError::Validation(format!(
                "unrecognized health log kind: {}",
                kind
            )));
        }
    }

    let logs = state
        .db
        .list_health_logs(&auth.user_id, params.kind.as_deref())
        .await?;

    Ok(Json(logs))
}

#[derive(Deserialize)]
struct CreateLogRequest {
    /// When the logged activity happened; defaults to now.
    logged_at: Option<String>,
    #[serde(flatten)]
    kind: HealthLogKind,
}

/// Create a health log and advance the owner's streak.
async fn create_log(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<CreateLogRequest>,
) -> Result<(StatusCode, Json<HealthLog>)> {
    let now = chrono::Utc::now();

    let logged_at = match req.logged_at {
        Some(raw) => chrono::DateTime::parse_from_rfc3339(&raw)
            .map_err(|_| {
                AppError::Validation("logged_at must be an RFC3339 datetime".to_string())
            })?
            .with_timezone(&chrono::Utc),
        None => now,
    };

    let log = HealthLog {
        id: Uuid::new_v4().to_string(),
        user_id: auth.user_id.clone(),
        logged_at: format_utc_rfc3339(logged_at),
        kind: req.kind,
        created_at: format_utc_rfc3339(now),
    };

    state.db.upsert_health_log(&log).await?;

    streak::advance_on_activity(&state.db, &auth.user_id, logged_at).await?;
    activity_log::record(
        &state.db,
        &auth.user_id,
        "health_logged",
        serde_json::json!({ "log_id": log.id, "kind": log.kind.type_name() }),
    )
    .await;

    Ok((StatusCode::CREATED, Json(log)))
}

async fn get_log(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(log_id): Path<String>,
) -> Result<Json<HealthLog>> {
    let log = owned_log(&state, &log_id, &auth.user_id).await?;
    Ok(Json(log))
}

#[derive(Deserialize)]
struct UpdateLogRequest {
    logged_at: Option<String>,
    /// Full replacement of the kind payload, tag included.
    #[serde(flatten)]
    kind: HealthLogKind,
}

/// Replace a health log's payload. Editing does not advance the streak
/// again.
async fn update_log(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(log_id): Path<String>,
    Json(req): Json<UpdateLogRequest>,
) -> Result<Json<HealthLog>> {
    let mut log = owned_log(&state, &log_id, &auth.user_id).await?;

    if let Some(raw) = req.logged_at {
        let parsed = chrono::DateTime::parse_from_rfc3339(&raw).map_err(|_| {
            AppError::Validation("logged_at must be an RFC3339 datetime".to_string())
        })?;
        log.logged_at = format_utc_rfc3339(parsed.with_timezone(&chrono::Utc));
    }
    log.kind = req.kind;

    state.db.upsert_health_log(&log).await?;

    Ok(Json(log))
}

async fn delete_log(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(log_id): Path<String>,
) -> Result<StatusCode> {
    let log = owned_log(&state, &log_id, &auth.user_id).await?;

    state.db.delete_health_log(&log.id).await?;

    Ok(StatusCode::NO_CONTENT)
}
