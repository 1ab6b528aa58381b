// SPDX-License-Identifier: MIT

//! Health log models.
//!
//! The five log kinds are a tagged union so serialization and per-kind
//! form logic get exhaustiveness checking instead of a flat record full
//! of optional fields.

use serde::{Deserialize, Serialize};

/// Sleep quality on a 1-5 scale.
pub type SleepQuality = u8;

/// Kind-specific payload of a health log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HealthLogKind {
    Water {
        glasses: u32,
        milliliters: u32,
    },
    Gym {
        workout_type: String,
        duration_minutes: u32,
        #[serde(default)]
        intensity: Option<String>,
    },
    Sleep {
        /// Bedtime (RFC 3339)
        bedtime: String,
        /// Wake time (RFC 3339)
        wake_time: String,
        quality: SleepQuality,
    },
    Diet {
        meal: String,
        #[serde(default)]
        calories: Option<u32>,
        #[serde(default)]
        notes: Option<String>,
    },
    Custom {
        label: String,
        value: String,
        #[serde(default)]
        notes: Option<String>,
    },
}

impl HealthLogKind {
    /// Wire name of the variant tag, for filtering.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Water { .. } => "water",
            Self::Gym { .. } => "gym",
            Self::Sleep { .. } => "sleep",
            Self::Diet { .. } => "diet",
            Self::Custom { .. } => "custom",
        }
    }
}

/// Health log document. Always owned by exactly one user; never shared
/// with a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthLog {
    /// Document ID (UUID v4)
    pub id: String,
    pub user_id: String,
    /// When the logged activity happened (RFC 3339)
    pub logged_at: String,
    #[serde(flatten)]
    pub kind: HealthLogKind,
    pub created_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_serializes_with_type_tag() {
        let log = HealthLog {
            id: "h1".to_string(),
            user_id: "u1".to_string(),
            logged_at: "2026-02-01T08:00:00Z".to_string(),
            kind: HealthLogKind::Water {
                glasses: 3,
                milliliters: 750,
            },
            created_at: "2026-02-01T08:00:01Z".to_string(),
        };

        let json = serde_json::to_value(&log).unwrap();
        assert_eq!(json["type"], "water");
        assert_eq!(json["glasses"], 3);
        // Fields of other variants are absent, not null.
        assert!(json.get("bedtime").is_none());
        assert!(json.get("workout_type").is_none());
    }

    #[test]
    fn test_sleep_round_trip() {
        let json = serde_json::json!({
            "id": "h2",
            "user_id": "u1",
            "logged_at": "2026-02-01T22:30:00Z",
            "type": "sleep",
            "bedtime": "2026-02-01T22:30:00Z",
            "wake_time": "2026-02-02T06:45:00Z",
            "quality": 4,
            "created_at": "2026-02-02T07:00:00Z",
        });

        let log: HealthLog = serde_json::from_value(json).unwrap();
        match log.kind {
            HealthLogKind::Sleep { quality, .. } => assert_eq!(quality, 4),
            other => panic!("expected sleep variant, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_type_rejected() {
        let json = serde_json::json!({
            "id": "h3",
            "user_id": "u1",
            "logged_at": "2026-02-01T08:00:00Z",
            "type": "meditation",
            "created_at": "2026-02-01T08:00:01Z",
        });
        assert!(serde_json::from_value::<HealthLog>(json).is_err());
    }
}
