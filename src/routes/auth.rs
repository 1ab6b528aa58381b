// SPDX-License-Identifier: MIT

//! Identity and session routes.
//!
//! Access tokens travel as bearer headers; refresh tokens live in an
//! httpOnly cookie scoped to the auth routes. Global logout bumps the
//! user's token version, which invalidates every outstanding refresh
//! token at the version check in `refresh`.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
    Extension, Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::user::{normalize_email, Preferences};
use crate::models::{PublicUser, User};
use crate::services::password::{hash_password, verify_password};
use crate::services::tokens::{issue_pair, verify_refresh_token, TokenPair};
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;

/// Cookie carrying the refresh token.
pub const REFRESH_COOKIE: &str = "pulseboard_refresh";

const MIN_PASSWORD_LEN: usize = 8;

/// Public auth routes (no bearer token required).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/auth/signup", post(sign_up))
        .route("/api/auth/login", post(log_in))
        .route("/api/auth/refresh", post(refresh))
}

/// Session routes that require an authenticated user.
pub fn protected_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/auth/logout", post(log_out))
        .route("/api/auth/me", get(get_me).put(update_me))
        .route("/api/users/search", get(search_user))
}

// ─── Requests / Responses ────────────────────────────────────

#[derive(Deserialize)]
struct SignUpRequest {
    name: String,
    email: String,
    password: String,
}

#[derive(Deserialize)]
struct LogInRequest {
    email: String,
    password: String,
}

/// Session response: profile plus the access token. The refresh token is
/// set as a cookie, never returned in the body.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SessionResponse {
    pub user: PublicUser,
    pub access_token: String,
}

fn refresh_cookie(pair: &TokenPair, ttl_days: i64) -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE, pair.refresh_token.clone()))
        .path("/api/auth")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::days(ttl_days))
        .build()
}

fn clear_refresh_cookie() -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE, ""))
        .path("/api/auth")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::ZERO)
        .build()
}

// ─── Signup / Login ──────────────────────────────────────────

/// Create an account and start a session.
async fn sign_up(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(req): Json<SignUpRequest>,
) -> Result<(StatusCode, CookieJar, Json<SessionResponse>)> {
    let name = req.name.trim();
    let email = normalize_email(&req.email);

    if name.is_empty() || email.is_empty() || req.password.trim().is_empty() {
        return Err(AppError::Validation(
            "name, email, and password are required".to_string(),
        ));
    }
    if req.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }

    if state.db.get_user_by_email(&email).await?.is_some() {
        return Err(AppError::Conflict("email is already registered".to_string()));
    }

    let user = User {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        email,
        password_hash: hash_password(&req.password)?,
        avatar_url: None,
        token_version: 0,
        preferences: Preferences::default(),
        created_at: format_utc_rfc3339(chrono::Utc::now()),
    };
    state.db.upsert_user(&user).await?;

    tracing::info!(user_id = %user.id, "User signed up");

    let pair = issue_pair(&user.id, user.token_version, &state.config)?;
    let jar = jar.add(refresh_cookie(&pair, state.config.refresh_token_ttl_days));

    Ok((
        StatusCode::CREATED,
        jar,
        Json(SessionResponse {
            user: user.into(),
            access_token: pair.access_token,
        }),
    ))
}

/// Verify credentials and start a session.
///
/// Unknown email and wrong password are deliberately indistinguishable to
/// avoid user enumeration.
async fn log_in(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(req): Json<LogInRequest>,
) -> Result<(CookieJar, Json<SessionResponse>)> {
    let invalid = || AppError::Auth("invalid credentials".to_string());

    let user = state
        .db
        .get_user_by_email(&normalize_email(&req.email))
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(&req.password, &user.password_hash) {
        return Err(invalid());
    }

    tracing::info!(user_id = %user.id, "User logged in");

    let pair = issue_pair(&user.id, user.token_version, &state.config)?;
    let jar = jar.add(refresh_cookie(&pair, state.config.refresh_token_ttl_days));

    Ok((
        jar,
        Json(SessionResponse {
            user: user.into(),
            access_token: pair.access_token,
        }),
    ))
}

// ─── Refresh / Logout ────────────────────────────────────────

/// Rotate the token pair using the refresh cookie.
///
/// Fails when the token is malformed/expired or when its version stamp
/// no longer matches the user's current version (global logout).
async fn refresh(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<SessionResponse>)> {
    let token = jar
        .get(REFRESH_COOKIE)
        .map(|c| c.value().to_string())
        .ok_or_else(|| AppError::Auth("missing refresh token".to_string()))?;

    let claims = verify_refresh_token(&token, &state.config.jwt_signing_key)?;

    let user = state
        .db
        .get_user(&claims.sub)
        .await?
        .ok_or_else(|| AppError::Auth("invalid or expired refresh token".to_string()))?;

    if claims.ver != user.token_version {
        return Err(AppError::Auth(
            "refresh token has been revoked".to_string(),
        ));
    }

    let pair = issue_pair(&user.id, user.token_version, &state.config)?;
    let jar = jar.add(refresh_cookie(&pair, state.config.refresh_token_ttl_days));

    Ok((
        jar,
        Json(SessionResponse {
            user: user.into(),
            access_token: pair.access_token,
        }),
    ))
}

/// Global logout: bump the token version so every previously issued
/// refresh token stops working, on every device.
async fn log_out(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    jar: CookieJar,
) -> Result<(StatusCode, CookieJar)> {
    state.db.bump_token_version(&auth.user_id).await?;

    tracing::info!(user_id = %auth.user_id, "User logged out (all sessions)");

    Ok((StatusCode::NO_CONTENT, jar.add(clear_refresh_cookie())))
}

// ─── Profile ─────────────────────────────────────────────────

/// Get current user profile.
async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<PublicUser>> {
    let user = state
        .db
        .get_user(&auth.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", auth.user_id)))?;

    Ok(Json(user.into()))
}

#[derive(Deserialize)]
struct UpdateProfileRequest {
    name: Option<String>,
    avatar_url: Option<String>,
    preferences: Option<Preferences>,
}

/// Update profile fields and preferences.
async fn update_me(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<PublicUser>> {
    let mut user = state
        .db
        .get_user(&auth.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", auth.user_id)))?;

    if let Some(name) = req.name {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::Validation("name cannot be blank".to_string()));
        }
        user.name = name;
    }
    if let Some(avatar_url) = req.avatar_url {
        user.avatar_url = Some(avatar_url);
    }
    if let Some(preferences) = req.preferences {
        user.preferences = preferences;
    }

    state.db.upsert_user(&user).await?;

    Ok(Json(user.into()))
}

// ─── User Search ─────────────────────────────────────────────

#[derive(Deserialize)]
struct SearchQuery {
    email: String,
}

/// Minimal public profile returned by email search.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserSearchResult {
    pub id: String,
    pub name: String,
    pub email: String,
    pub avatar_url: Option<String>,
}

/// Exact email lookup for the member-invite UI.
///
/// A miss is a `null` body, not an error, so the caller can distinguish
/// "no such user" from a failed request.
async fn search_user(
    State(state): State<Arc<AppState>>,
    axum::extract::Query(params): axum::extract::Query<SearchQuery>,
) -> Result<Json<Option<UserSearchResult>>> {
    let found = state
        .db
        .get_user_by_email(&normalize_email(&params.email))
        .await?
        .map(|u| UserSearchResult {
            id: u.id,
            name: u.name,
            email: u.email,
            avatar_url: u.avatar_url,
        });

    Ok(Json(found))
}
