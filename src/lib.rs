//! Temporal accounting core for the worklog app.
//!
//! Three cooperating components over one sqlite-backed record store:
//! the session timer (single active work session per owner), the streak
//! calculator (pure day-key math), and the period aggregator (per-day
//! buckets and summary metrics for reporting).

pub mod analytics;
pub mod clock;
pub mod error;
pub mod events;
pub mod models;
pub mod service;
pub mod store;
pub mod streaks;
pub mod timer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{Error, Result};
pub use events::{EventBus, WorklogEvent};
pub use models::{Habit, PeriodWindow, Priority, Task, WorkSession};
pub use service::WorklogService;
pub use store::Store;
pub use streaks::StreakSummary;
