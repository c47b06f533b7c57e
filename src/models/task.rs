use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

/// Read-mostly task record from the catalog. The timer references tasks by
/// id; the aggregator reads the due date, completion flag, and creation
/// time.
///
/// `created_at` is optional because records synced from the remote document
/// store may predate the field; the aggregator's date fallback chain treats
/// a task with neither due date, sessions, nor creation time as undatable
/// and excludes it rather than guessing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub due_date: Option<DateTime<Utc>>,
    pub completed: bool,
    pub priority: Priority,
    pub created_at: Option<DateTime<Utc>>,
}
