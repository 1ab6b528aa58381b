// SPDX-License-Identifier: MIT

//! Streak routes.

use axum::{extract::State, routing::get, Extension, Json, Router};
use std::sync::Arc;

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::Streak;
use crate::services::streak;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/streaks/me", get(get_my_streak))
}

/// Current user's streak snapshot. Never 404s: a user with no activity
/// gets a zeroed record.
async fn get_my_streak(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Streak>> {
    let streak = streak::get_for_user(&state.db, &auth.user_id).await?;
    Ok(Json(streak))
}
