use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use log::info;
use tokio::sync::broadcast;

use crate::analytics::{self, PeriodSummary};
use crate::clock::Clock;
use crate::error::Result;
use crate::events::{EventBus, WorklogEvent};
use crate::models::{day_key, PeriodWindow, WorkSession};
use crate::store::Store;
use crate::streaks::StreakSummary;
use crate::timer::SessionTimer;

/// Operation surface the surrounding app talks to.
///
/// Composes the store, the session timer, the streak recomputation, and
/// the period aggregator. Every operation reads fresh store state, fails
/// synchronously on logical-state violations, and never retries.
#[derive(Clone)]
pub struct WorklogService {
    store: Store,
    clock: Arc<dyn Clock>,
    timer: SessionTimer,
    events: EventBus,
}

impl WorklogService {
    pub fn new(store: Store, clock: Arc<dyn Clock>) -> Self {
        let events = EventBus::default();
        let timer = SessionTimer::new(store.clone(), clock.clone(), events.clone());
        Self {
            store,
            clock,
            timer,
            events,
        }
    }

    /// Receive change notifications (session starts/stops, streak
    /// recomputes).
    pub fn subscribe(&self) -> broadcast::Receiver<WorklogEvent> {
        self.events.subscribe()
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub async fn start_session(&self, owner_id: &str, task_id: &str) -> Result<WorkSession> {
        self.timer.start(owner_id, task_id).await
    }

    pub async fn stop_session(&self, session_id: &str) -> Result<WorkSession> {
        self.timer.stop(session_id).await
    }

    pub async fn get_elapsed(&self, session_id: &str) -> Result<Duration> {
        self.timer.elapsed(session_id).await
    }

    pub async fn get_total_duration(&self, task_id: &str) -> Result<Duration> {
        self.timer.total_duration(task_id).await
    }

    /// Recompute and persist a habit's derived streak fields from its full
    /// marker set. Called after every completion-marker mutation.
    pub async fn recompute_habit_streaks(&self, habit_id: &str) -> Result<StreakSummary> {
        let now = self.clock.now();
        let summary = self
            .store
            .recompute_habit_streaks(habit_id, day_key(now), now)
            .await?;
        self.emit_streaks(habit_id, summary).await?;
        Ok(summary)
    }

    /// Mark one calendar day completed for a habit. Set semantics: marking
    /// an already-marked day is a no-op mutation, but streaks are still
    /// recomputed and persisted.
    pub async fn mark_habit_day(&self, habit_id: &str, day: NaiveDate) -> Result<StreakSummary> {
        self.apply_marker(habit_id, day, true).await
    }

    /// Remove one completion marker. The full recompute handles interior
    /// removals that would break an incrementally tracked streak.
    pub async fn unmark_habit_day(&self, habit_id: &str, day: NaiveDate) -> Result<StreakSummary> {
        self.apply_marker(habit_id, day, false).await
    }

    async fn apply_marker(
        &self,
        habit_id: &str,
        day: NaiveDate,
        completed: bool,
    ) -> Result<StreakSummary> {
        let now = self.clock.now();
        let summary = self
            .store
            .apply_habit_marker(habit_id, day, completed, day_key(now), now)
            .await?;

        info!(
            "habit {habit_id}: day {day} {}, current streak {}",
            if completed { "marked" } else { "unmarked" },
            summary.current_streak
        );
        self.emit_streaks(habit_id, summary).await?;
        Ok(summary)
    }

    async fn emit_streaks(&self, habit_id: &str, summary: StreakSummary) -> Result<()> {
        let habit = self.store.get_habit(habit_id).await?;
        self.events.emit(WorklogEvent::HabitStreaksRecomputed {
            habit_id: habit.id,
            owner_id: habit.owner_id,
            summary,
        });
        Ok(())
    }

    /// Summarize one owner's tasks and sessions over a calendar-day
    /// window. The window type already guarantees `start <= end`; sessions
    /// are fetched bounded to the window's instants.
    pub async fn summarize_period(
        &self,
        owner_id: &str,
        window: PeriodWindow,
    ) -> Result<PeriodSummary> {
        let now = self.clock.now();
        let tasks = self.store.list_tasks_for_owner(owner_id).await?;
        let sessions = self
            .store
            .list_sessions_started_between(
                owner_id,
                window.start_instant(),
                window.end_instant_exclusive(),
            )
            .await?;

        Ok(analytics::summarize(&tasks, &sessions, &window, now))
    }
}
