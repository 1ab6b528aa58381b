// SPDX-License-Identifier: MIT

//! User model for storage and API.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// User profile stored in Firestore.
///
/// The password hash never leaves the storage layer; API responses use
/// [`PublicUser`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Document ID (UUID v4)
    pub id: String,
    /// Display name
    pub name: String,
    /// Unique email, stored trimmed and lowercased
    pub email: String,
    /// Argon2id password hash (PHC string)
    pub password_hash: String,
    /// Profile picture URL
    pub avatar_url: Option<String>,
    /// Refresh-token version stamp. Incremented on logout to invalidate
    /// every previously issued refresh token.
    #[serde(default)]
    pub token_version: u32,
    /// UI preferences
    #[serde(default)]
    pub preferences: Preferences,
    /// When the account was created (RFC 3339)
    pub created_at: String,
}

/// UI preferences carried on the user document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Preferences {
    /// Theme name ("light", "dark", ...)
    pub theme: String,
    /// Section shown after login ("todos", "board", "health")
    pub default_section: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            theme: "light".to_string(),
            default_section: "todos".to_string(),
        }
    }
}

/// Profile shape exposed by the API (no password hash, no token version).
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PublicUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub avatar_url: Option<String>,
    pub preferences: Preferences,
    pub created_at: String,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            avatar_url: user.avatar_url,
            preferences: user.preferences,
            created_at: user.created_at,
        }
    }
}

/// Normalize an email for storage and lookup: trimmed, lowercased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
