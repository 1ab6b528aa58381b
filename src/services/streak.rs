// SPDX-License-Identifier: MIT

//! Streak accounting service.
//!
//! Advanced as a side effect by every qualifying activity, independent of
//! which subsystem triggered it: a todo completed, a board task entering
//! a terminal column, or a health log created. Always the *acting* user's
//! streak.

use chrono::{DateTime, Utc};

use crate::db::FirestoreDb;
use crate::error::Result;
use crate::models::Streak;
use crate::time_utils::utc_day;

/// Advance the user's streak for an activity at the given instant.
///
/// The instant is normalized to its UTC calendar day before the
/// transition; the storage layer applies the transition transactionally
/// so repeated same-day activities are no-ops.
pub async fn advance_on_activity(
    db: &FirestoreDb,
    user_id: &str,
    activity_at: DateTime<Utc>,
) -> Result<Streak> {
    db.advance_streak(user_id, utc_day(activity_at)).await
}

/// Read the user's streak, lazily materializing a zeroed record so reads
/// never fail for a user who has never logged activity.
pub async fn get_for_user(db: &FirestoreDb, user_id: &str) -> Result<Streak> {
    Ok(db
        .get_streak(user_id)
        .await?
        .unwrap_or_else(|| Streak::zeroed(user_id.to_string())))
}
