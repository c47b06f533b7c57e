pub mod controller;

pub use controller::SessionTimer;

use chrono::{DateTime, Duration, Utc};

use crate::models::WorkSession;

/// Total time across a set of sessions, counting the live elapsed value
/// for any still-active session. Always recomputed from the sessions
/// themselves; active sessions grow monotonically while open, so a cached
/// total would immediately go stale.
pub fn total_elapsed(sessions: &[WorkSession], now: DateTime<Utc>) -> Duration {
    sessions
        .iter()
        .fold(Duration::zero(), |acc, s| acc + s.elapsed(now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn session(id: &str, start_offset_secs: i64, len_secs: Option<i64>) -> WorkSession {
        let base = Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap();
        let started_at = base + Duration::seconds(start_offset_secs);
        WorkSession {
            id: id.into(),
            owner_id: "o1".into(),
            task_id: "t1".into(),
            started_at,
            ended_at: len_secs.map(|len| started_at + Duration::seconds(len)),
            created_at: started_at,
            updated_at: started_at,
        }
    }

    #[test]
    fn sums_stopped_sessions() {
        let sessions = vec![session("a", 0, Some(600)), session("b", 3600, Some(900))];
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        assert_eq!(total_elapsed(&sessions, now), Duration::seconds(1500));
    }

    #[test]
    fn includes_live_value_for_the_active_session() {
        let sessions = vec![session("a", 0, Some(600)), session("b", 3600, None)];
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 9, 10, 0).unwrap();
        // Active session has been open 600s at `now`.
        assert_eq!(total_elapsed(&sessions, now), Duration::seconds(1200));
    }

    #[test]
    fn empty_set_is_zero() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
        assert_eq!(total_elapsed(&[], now), Duration::zero());
    }
}
