// SPDX-License-Identifier: MIT

//! Database layer (Firestore).

pub mod firestore;

pub use firestore::FirestoreDb;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    pub const PROJECTS: &str = "projects";
    pub const TODOS: &str = "todos";
    pub const BOARD_COLUMNS: &str = "board_columns";
    pub const BOARD_TASKS: &str = "board_tasks";
    pub const HEALTH_LOGS: &str = "health_logs";
    /// Per-user streak documents (keyed by user ID)
    pub const STREAKS: &str = "streaks";
    /// Best-effort telemetry, append-only
    pub const ACTIVITY_LOG: &str = "activity_log";
}
