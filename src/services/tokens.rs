// SPDX-License-Identifier: MIT

//! Signed session tokens.
//!
//! Two token classes share one HS256 signing key and are distinguished by
//! a `kind` claim: short-lived access tokens (bearer header) and
//! longer-lived refresh tokens (httpOnly cookie) carrying the user's
//! token-version stamp. A version mismatch on refresh is how global
//! logout invalidates every outstanding refresh token without a session
//! table.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::AppError;

const KIND_ACCESS: &str = "access";
const KIND_REFRESH: &str = "refresh";

/// Claims carried by an access token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AccessClaims {
    /// Subject (user ID)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
    /// Token class; always "access"
    pub kind: String,
}

/// Claims carried by a refresh token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RefreshClaims {
    pub sub: String,
    pub exp: usize,
    pub iat: usize,
    /// Token class; always "refresh"
    pub kind: String,
    /// Refresh-token version stamp at issue time
    pub ver: u32,
}

/// An access + refresh token pair, issued at signup, login, and refresh
/// rotation.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

fn unix_now() -> anyhow::Result<usize> {
    use std::time::{SystemTime, UNIX_EPOCH};
    Ok(SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as usize)
}

/// Mint an access token for a user session.
pub fn create_access_token(user_id: &str, config: &Config) -> anyhow::Result<String> {
    let now = unix_now()?;
    let claims = AccessClaims {
        sub: user_id.to_string(),
        iat: now,
        exp: now + (config.access_token_ttl_minutes as usize) * 60,
        kind: KIND_ACCESS.to_string(),
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(&config.jwt_signing_key),
    )?)
}

/// Mint a refresh token stamped with the user's current token version.
pub fn create_refresh_token(
    user_id: &str,
    token_version: u32,
    config: &Config,
) -> anyhow::Result<String> {
    let now = unix_now()?;
    let claims = RefreshClaims {
        sub: user_id.to_string(),
        iat: now,
        exp: now + (config.refresh_token_ttl_days as usize) * 24 * 60 * 60,
        kind: KIND_REFRESH.to_string(),
        ver: token_version,
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(&config.jwt_signing_key),
    )?)
}

/// Issue a fresh access + refresh pair.
pub fn issue_pair(user_id: &str, token_version: u32, config: &Config) -> Result<TokenPair, AppError> {
    let access_token = create_access_token(user_id, config)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Access token creation failed: {}", e)))?;
    let refresh_token = create_refresh_token(user_id, token_version, config)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Refresh token creation failed: {}", e)))?;
    Ok(TokenPair {
        access_token,
        refresh_token,
    })
}

/// Decode and validate an access token. Rejects refresh tokens presented
/// as bearer tokens.
pub fn verify_access_token(token: &str, signing_key: &[u8]) -> Result<AccessClaims, AppError> {
    let key = DecodingKey::from_secret(signing_key);
    let validation = Validation::new(Algorithm::HS256);

    let data = decode::<AccessClaims>(token, &key, &validation)
        .map_err(|_| AppError::Auth("invalid or expired token".to_string()))?;

    if data.claims.kind != KIND_ACCESS {
        return Err(AppError::Auth("invalid or expired token".to_string()));
    }

    Ok(data.claims)
}

/// Decode and validate a refresh token. The version stamp is checked
/// against the stored user record by the caller.
pub fn verify_refresh_token(token: &str, signing_key: &[u8]) -> Result<RefreshClaims, AppError> {
    let key = DecodingKey::from_secret(signing_key);
    let validation = Validation::new(Algorithm::HS256);

    let data = decode::<RefreshClaims>(token, &key, &validation)
        .map_err(|_| AppError::Auth("invalid or expired refresh token".to_string()))?;

    if data.claims.kind != KIND_REFRESH {
        return Err(AppError::Auth("invalid or expired refresh token".to_string()));
    }

    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config::test_default()
    }

    #[test]
    fn test_access_token_round_trip() {
        let config = test_config();
        let token = create_access_token("user-1", &config).unwrap();
        let claims = verify_access_token(&token, &config.jwt_signing_key).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.kind, "access");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_refresh_token_carries_version() {
        let config = test_config();
        let token = create_refresh_token("user-1", 7, &config).unwrap();
        let claims = verify_refresh_token(&token, &config.jwt_signing_key).unwrap();
        assert_eq!(claims.ver, 7);
        assert_eq!(claims.kind, "refresh");
    }

    #[test]
    fn test_refresh_token_rejected_as_access() {
        let config = test_config();
        let token = create_refresh_token("user-1", 0, &config).unwrap();
        let err = verify_access_token(&token, &config.jwt_signing_key).unwrap_err();
        assert!(matches!(err, AppError::Auth(_)));
    }

    #[test]
    fn test_access_token_rejected_as_refresh() {
        let config = test_config();
        let token = create_access_token("user-1", &config).unwrap();
        let err = verify_refresh_token(&token, &config.jwt_signing_key).unwrap_err();
        assert!(matches!(err, AppError::Auth(_)));
    }

    #[test]
    fn test_wrong_key_rejected() {
        let config = test_config();
        let token = create_access_token("user-1", &config).unwrap();
        let err = verify_access_token(&token, b"another_signing_key_entirely!!!!").unwrap_err();
        assert!(matches!(err, AppError::Auth(_)));
    }

    #[test]
    fn test_issue_pair_contains_both_classes() {
        let config = test_config();
        let pair = issue_pair("user-1", 3, &config).unwrap();
        assert!(verify_access_token(&pair.access_token, &config.jwt_signing_key).is_ok());
        let refresh = verify_refresh_token(&pair.refresh_token, &config.jwt_signing_key).unwrap();
        assert_eq!(refresh.ver, 3);
    }
}
