//! Period aggregation: bucket tasks and sessions into a calendar-day
//! window and derive the summary metrics used by reporting.

pub mod bucket;
pub mod scoring;
pub mod types;

pub use bucket::{best_streak_in_window, bucket_by_day, resolve_day};
pub use scoring::{peak_hour, productivity_score};
pub use types::{DaySummary, PeakHour, PeriodSummary};

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::models::{PeriodWindow, Task, WorkSession};

/// Build the full summary for one owner's window.
///
/// Pure over its inputs; the service layer fetches fresh task and session
/// records (sessions already bounded to the window) and injects `now` so
/// live sessions are counted consistently across every metric.
pub fn summarize(
    tasks: &[Task],
    sessions: &[WorkSession],
    window: &PeriodWindow,
    now: DateTime<Utc>,
) -> PeriodSummary {
    let buckets = bucket_by_day(tasks, sessions, window);

    let mut work_secs_by_task: HashMap<String, i64> = HashMap::new();
    for session in sessions {
        *work_secs_by_task.entry(session.task_id.clone()).or_insert(0) +=
            session.elapsed(now).num_seconds();
    }

    let mut total_in_window = 0usize;
    let mut completed_in_window = 0usize;
    let mut window_work_secs = 0i64;

    let per_day: Vec<DaySummary> = buckets
        .iter()
        .map(|(day, tasks)| {
            let completed_count = tasks.iter().filter(|t| t.completed).count();
            let work_secs: i64 = tasks
                .iter()
                .map(|t| work_secs_by_task.get(&t.id).copied().unwrap_or(0))
                .sum();

            total_in_window += tasks.len();
            completed_in_window += completed_count;
            window_work_secs += work_secs;

            DaySummary {
                day: *day,
                task_ids: tasks.iter().map(|t| t.id.clone()).collect(),
                completed_count,
                work_secs,
            }
        })
        .collect();

    PeriodSummary {
        window: *window,
        per_day,
        peak_hour: peak_hour(sessions, now),
        productivity_score: productivity_score(
            total_in_window,
            completed_in_window,
            window_work_secs,
        ),
        best_streak: best_streak_in_window(&buckets, &work_secs_by_task),
    }
}
