use chrono::NaiveDate;
use thiserror::Error;

/// Errors surfaced by the timer, habit, and aggregation operations.
///
/// All of these describe logical-state violations, not transient faults:
/// nothing here is retried internally, and an operation that fails leaves
/// no partial mutation behind.
#[derive(Debug, Error)]
pub enum Error {
    /// A session is already running for this owner; it must be stopped
    /// explicitly before a new one can start.
    #[error("a work session is already running for owner {owner_id}")]
    Conflict { owner_id: String },

    /// The referenced record does not exist or is outside the caller's
    /// owner scope.
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: String },

    /// Duplicate stop on a session that already has an end time. The first
    /// stop's `ended_at` is left untouched; callers may treat this as a
    /// no-op success.
    #[error("session {session_id} is already stopped")]
    AlreadyStopped { session_id: String },

    /// Period window with `start` after `end`; rejected before any
    /// bucketing work begins.
    #[error("invalid period window: start {start} is after end {end}")]
    InvalidWindow { start: NaiveDate, end: NaiveDate },

    #[error("store error: {0}")]
    Store(#[source] anyhow::Error),
}

impl Error {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Error::NotFound {
            kind,
            id: id.into(),
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Store(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Store(anyhow::Error::new(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Store(anyhow::Error::new(err))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
