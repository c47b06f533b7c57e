use std::sync::Arc;

use chrono::Duration;
use log::info;
use uuid::Uuid;

use crate::clock::Clock;
use crate::error::Result;
use crate::events::{EventBus, WorklogEvent};
use crate::models::WorkSession;
use crate::store::Store;

use super::total_elapsed;

/// Store-backed session timer.
///
/// There is no in-memory "running" flag: the active session row *is* the
/// timer state, so the single-active-session invariant holds across
/// processes and restarts. Every elapsed/total query reads fresh store
/// state before computing.
#[derive(Clone)]
pub struct SessionTimer {
    store: Store,
    clock: Arc<dyn Clock>,
    events: EventBus,
}

impl SessionTimer {
    pub fn new(store: Store, clock: Arc<dyn Clock>, events: EventBus) -> Self {
        Self {
            store,
            clock,
            events,
        }
    }

    /// Start a session for `owner_id` against `task_id`.
    ///
    /// Fails with `Conflict` if the owner already has an active session;
    /// the caller must stop it first, there is no implicit stop.
    pub async fn start(&self, owner_id: &str, task_id: &str) -> Result<WorkSession> {
        let now = self.clock.now();
        let session = WorkSession {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            task_id: task_id.to_string(),
            started_at: now,
            ended_at: None,
            created_at: now,
            updated_at: now,
        };

        self.store.insert_active_session(&session).await?;

        info!(
            "started session {} for task {} (owner {})",
            session.id, task_id, owner_id
        );
        self.events.emit(WorklogEvent::SessionStarted {
            session_id: session.id.clone(),
            owner_id: owner_id.to_string(),
            task_id: task_id.to_string(),
        });

        Ok(session)
    }

    /// Stop the active session with this id. A duplicate stop surfaces
    /// `AlreadyStopped` without touching the recorded end time.
    pub async fn stop(&self, session_id: &str) -> Result<WorkSession> {
        let now = self.clock.now();
        let session = self.store.mark_session_ended(session_id, now).await?;

        info!(
            "stopped session {} after {}s",
            session.id,
            session.elapsed(now).num_seconds()
        );
        self.events.emit(WorklogEvent::SessionStopped {
            session_id: session.id.clone(),
            owner_id: session.owner_id.clone(),
            task_id: session.task_id.clone(),
        });

        Ok(session)
    }

    /// Live elapsed time for a session, reading the latest persisted row.
    pub async fn elapsed(&self, session_id: &str) -> Result<Duration> {
        let session = self.store.get_session(session_id).await?;
        Ok(session.elapsed(self.clock.now()))
    }

    /// Total time logged against a task across all its sessions, live
    /// value included for the (at most one) active session among them.
    pub async fn total_duration(&self, task_id: &str) -> Result<Duration> {
        let sessions = self.store.list_sessions_for_task(task_id).await?;
        Ok(total_elapsed(&sessions, self.clock.now()))
    }
}
