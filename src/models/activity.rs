// SPDX-License-Identifier: MIT

//! Activity log model.
//!
//! Pure telemetry: appended best-effort when something streak-worthy
//! happens, never read back by the application.

use serde::{Deserialize, Serialize};

/// Append-only activity log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEvent {
    /// Document ID (UUID v4)
    pub id: String,
    pub user_id: String,
    /// Event type ("todo_completed", "board_task_completed", "health_logged", ...)
    pub event: String,
    /// Free-form event metadata
    #[serde(default)]
    pub metadata: serde_json::Value,
    pub recorded_at: String,
}
