use chrono::{DateTime, Timelike, Utc};

use crate::models::WorkSession;

use super::types::PeakHour;

/// Completion/efficiency weights for the productivity score.
const COMPLETION_WEIGHT: f64 = 0.6;
const EFFICIENCY_WEIGHT: f64 = 0.4;

/// One nominal hour of work per task saturates the efficiency component.
const EFFICIENCY_SECS_PER_TASK: f64 = 3600.0;

/// Find the hour of day with the most accumulated work seconds.
///
/// Each session's full elapsed time is credited to its start hour. Ties
/// resolve to the earliest hour (single ascending scan, first maximum
/// wins). Returns `None` when no session contributed any time.
pub fn peak_hour(sessions: &[WorkSession], now: DateTime<Utc>) -> Option<PeakHour> {
    let mut by_hour = [0i64; 24];
    for session in sessions {
        let hour = session.started_at.hour() as usize;
        by_hour[hour] += session.elapsed(now).num_seconds();
    }

    let mut best: Option<(usize, i64)> = None;
    for (hour, secs) in by_hour.iter().enumerate() {
        if *secs > 0 && best.map_or(true, |(_, top)| *secs > top) {
            best = Some((hour, *secs));
        }
    }

    best.map(|(hour, seconds)| PeakHour {
        start_hour: hour as u32,
        end_hour: (hour as u32 + 1) % 24,
        seconds,
    })
}

/// Weighted 0-10 productivity score: 60% completion ratio, 40% time
/// efficiency (capped at one hour of logged work per task). Zero when the
/// window holds no tasks.
pub fn productivity_score(total_tasks: usize, completed_tasks: usize, work_secs: i64) -> u8 {
    if total_tasks == 0 {
        return 0;
    }

    let completion = completed_tasks as f64 / total_tasks as f64;
    let efficiency =
        (work_secs.max(0) as f64 / (total_tasks as f64 * EFFICIENCY_SECS_PER_TASK)).min(1.0);

    let score = COMPLETION_WEIGHT * completion + EFFICIENCY_WEIGHT * efficiency;
    (score * 10.0).round() as u8
}
