use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;

use crate::models::{day_key, PeriodWindow, Task, WorkSession};

/// Resolve the calendar day a task belongs to, in order of preference:
/// its due date, else its earliest session start, else its creation time.
/// A task with none of these has no day and is excluded from bucketing
/// rather than guessed at.
pub fn resolve_day(task: &Task, sessions: &[WorkSession]) -> Option<NaiveDate> {
    if let Some(due) = task.due_date {
        return Some(day_key(due));
    }

    sessions
        .iter()
        .filter(|s| s.task_id == task.id)
        .map(|s| s.started_at)
        .min()
        .map(day_key)
        .or_else(|| task.created_at.map(day_key))
}

/// Bucket tasks into the window by resolved day.
///
/// Every day of the window is present in the result, empty days included,
/// so downstream charts see zero rather than a gap. Tasks resolving
/// outside the window (or to no day at all) are dropped.
pub fn bucket_by_day<'a>(
    tasks: &'a [Task],
    sessions: &[WorkSession],
    window: &PeriodWindow,
) -> BTreeMap<NaiveDate, Vec<&'a Task>> {
    let mut buckets: BTreeMap<NaiveDate, Vec<&Task>> =
        window.days().map(|day| (day, Vec::new())).collect();

    for task in tasks {
        let Some(day) = resolve_day(task, sessions) else {
            continue;
        };
        if let Some(bucket) = buckets.get_mut(&day) {
            bucket.push(task);
        }
    }

    buckets
}

/// Longest run of consecutive days on which at least one bucketed task
/// has nonzero logged work time.
///
/// Same shape as the habit streak scan, kept separate because the per-day
/// predicate is presence-of-work-time, not an explicit completion marker.
pub fn best_streak_in_window(
    buckets: &BTreeMap<NaiveDate, Vec<&Task>>,
    work_secs_by_task: &HashMap<String, i64>,
) -> u32 {
    let mut best = 0u32;
    let mut run = 0u32;

    // BTreeMap iterates the window days in order with no gaps, so a plain
    // run counter is enough.
    for tasks in buckets.values() {
        let day_has_work = tasks.iter().any(|task| {
            work_secs_by_task
                .get(&task.id)
                .is_some_and(|secs| *secs > 0)
        });

        if day_has_work {
            run += 1;
            best = best.max(run);
        } else {
            run = 0;
        }
    }

    best
}
