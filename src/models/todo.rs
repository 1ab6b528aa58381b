// SPDX-License-Identifier: MIT

//! Todo model for storage and API.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Todo status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum TodoStatus {
    Todo,
    Completed,
}

/// Priority shared by todos and board tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum Priority {
    Low,
    Medium,
    High,
}

/// Todo document stored in Firestore.
///
/// `project_id = None` means an inbox item owned solely by its creator;
/// project-attached todos are visible and editable by any project member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Todo {
    /// Document ID (UUID v4)
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub project_id: Option<String>,
    pub owner_id: String,
    pub status: TodoStatus,
    /// Optional due date (RFC 3339)
    pub due_date: Option<String>,
    pub priority: Priority,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Set when the todo transitions to completed; cleared on reopen
    pub completed_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}
