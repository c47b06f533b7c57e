use serde::Serialize;
use tokio::sync::broadcast;

use crate::streaks::StreakSummary;

/// Change notifications fanned out to whatever layer sits on top of this
/// crate (UI, sync, caching). Dropped when nobody is subscribed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum WorklogEvent {
    SessionStarted {
        session_id: String,
        owner_id: String,
        task_id: String,
    },
    SessionStopped {
        session_id: String,
        owner_id: String,
        task_id: String,
    },
    HabitStreaksRecomputed {
        habit_id: String,
        owner_id: String,
        summary: StreakSummary,
    },
}

#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<WorklogEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<WorklogEvent> {
        self.sender.subscribe()
    }

    /// Send failures mean no live subscribers, which is fine.
    pub fn emit(&self, event: WorklogEvent) {
        let _ = self.sender.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}
