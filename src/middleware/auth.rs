// SPDX-License-Identifier: MIT

//! Bearer-token authentication middleware.

use crate::error::AppError;
use crate::services::tokens::verify_access_token;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Authenticated user extracted from the access token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
}

/// Middleware that requires a valid bearer access token.
///
/// Refresh tokens travel in a cookie and are only accepted by the
/// refresh endpoint; presenting one here fails the `kind` check.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(h) if h.starts_with("Bearer ") => &h[7..],
        _ => return Err(AppError::Auth("missing bearer token".to_string())),
    };

    let claims = verify_access_token(token, &state.config.jwt_signing_key)?;

    let auth_user = AuthUser {
        user_id: claims.sub,
    };
    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}
