use chrono::NaiveDate;
use serde::Serialize;

use crate::models::PeriodWindow;

/// Hour of day with the most accumulated work, labeled as an inclusive
/// `[start_hour, end_hour]` range for display.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PeakHour {
    pub start_hour: u32,
    pub end_hour: u32,
    pub seconds: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySummary {
    pub day: NaiveDate,
    pub task_ids: Vec<String>,
    pub completed_count: usize,
    pub work_secs: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodSummary {
    pub window: PeriodWindow,
    /// One entry per day in the window, empty days included, ascending.
    pub per_day: Vec<DaySummary>,
    pub peak_hour: Option<PeakHour>,
    /// 0..=10, see `scoring::productivity_score`.
    pub productivity_score: u8,
    /// Longest run of consecutive days with logged work time.
    pub best_streak: u32,
}
