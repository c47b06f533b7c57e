use std::cmp;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// One interval of work logged against a task.
///
/// A session with `ended_at` absent is *active*; at most one session per
/// owner may be active at a time (enforced by the store on insert). Once
/// `ended_at` is set it is never rewritten.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkSession {
    pub id: String,
    pub owner_id: String,
    pub task_id: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WorkSession {
    pub fn is_active(&self) -> bool {
        self.ended_at.is_none()
    }

    /// Elapsed time for this session. Active sessions measure against the
    /// supplied `now`; stopped sessions use their recorded end. Never
    /// negative: a backward-skewed clock clamps to zero.
    pub fn elapsed(&self, now: DateTime<Utc>) -> Duration {
        let end = self.ended_at.unwrap_or(now);
        cmp::max(end - self.started_at, Duration::zero())
    }
}
