// SPDX-License-Identifier: MIT

//! Kanban board models.

use crate::models::todo::Priority;
use serde::{Deserialize, Serialize};

/// Board column document.
///
/// Columns are only ever created as the fixed default triple when a
/// project's board is first initialized. `is_terminal` marks the column
/// whose entry counts as work complete for streak purposes; this is an
/// explicit flag, not a column-name match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardColumn {
    /// Document ID (UUID v4)
    pub id: String,
    pub project_id: String,
    pub name: String,
    pub order: u32,
    #[serde(default)]
    pub is_terminal: bool,
}

impl BoardColumn {
    /// The default column triple for a freshly initialized board.
    /// The third column is the terminal one.
    pub fn default_triple(project_id: &str, ids: [String; 3]) -> Vec<Self> {
        let [todo_id, pending_id, completed_id] = ids;
        vec![
            Self {
                id: todo_id,
                project_id: project_id.to_string(),
                name: "Todo".to_string(),
                order: 0,
                is_terminal: false,
            },
            Self {
                id: pending_id,
                project_id: project_id.to_string(),
                name: "Pending".to_string(),
                order: 1,
                is_terminal: false,
            },
            Self {
                id: completed_id,
                project_id: project_id.to_string(),
                name: "Completed".to_string(),
                order: 2,
                is_terminal: true,
            },
        ]
    }
}

/// Board task document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardTask {
    /// Document ID (UUID v4)
    pub id: String,
    pub project_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Current column
    pub column_id: String,
    pub assignee_id: Option<String>,
    pub priority: Priority,
    #[serde(default)]
    pub tags: Vec<String>,
    pub due_date: Option<String>,
    /// Position within the column
    pub order: u32,
    pub created_by: String,
    pub created_at: String,
    pub updated_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_triple_marks_third_column_terminal() {
        let columns = BoardColumn::default_triple(
            "p1",
            ["c1".to_string(), "c2".to_string(), "c3".to_string()],
        );
        assert_eq!(columns.len(), 3);
        assert_eq!(
            columns.iter().filter(|c| c.is_terminal).count(),
            1,
            "exactly one terminal column"
        );
        assert!(columns[2].is_terminal);
        assert_eq!(columns[2].name, "Completed");
        assert_eq!(columns[0].order, 0);
        assert_eq!(columns[2].order, 2);
    }
}
