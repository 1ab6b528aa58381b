// SPDX-License-Identifier: MIT

//! Best-effort activity logging.
//!
//! Pure telemetry: nothing in the application reads these records back.
//! Write failures are logged and swallowed; they must never fail the
//! request that triggered them.

use uuid::Uuid;

use crate::db::FirestoreDb;
use crate::models::ActivityEvent;
use crate::time_utils::format_utc_rfc3339;

/// Record an activity event. Never returns an error.
pub async fn record(db: &FirestoreDb, user_id: &str, event: &str, metadata: serde_json::Value) {
    let entry = ActivityEvent {
        id: Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        event: event.to_string(),
        metadata,
        recorded_at: format_utc_rfc3339(chrono::Utc::now()),
    };

    if let Err(e) = db.append_activity_event(&entry).await {
        tracing::warn!(user_id, event, error = %e, "Failed to record activity event");
    }
}
