use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Recurring habit with its set of completed calendar days and the streak
/// values derived from them.
///
/// `completed_dates` holds unique day keys. The three derived fields are
/// denormalized for cheap reads and are rewritten from a full recompute
/// after every marker mutation; they are never adjusted incrementally.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub completed_dates: Vec<NaiveDate>,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub total_completed_days: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
