use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use tempfile::TempDir;

use worklog_core::{
    Clock, Error, Habit, ManualClock, PeriodWindow, Priority, Store, Task, WorklogEvent,
    WorklogService,
};

const OWNER: &str = "owner-1";

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap()
}

struct Harness {
    service: WorklogService,
    clock: Arc<ManualClock>,
    // Held so the sqlite file outlives the test body.
    _dir: TempDir,
}

fn harness() -> Harness {
    init_logs();
    let dir = tempfile::tempdir().expect("tempdir");
    let store = Store::new(dir.path().join("worklog.db")).expect("store");
    let clock = Arc::new(ManualClock::new(start_time()));
    let service = WorklogService::new(store, clock.clone());
    Harness {
        service,
        clock,
        _dir: dir,
    }
}

async fn seed_task(service: &WorklogService, id: &str, due: Option<DateTime<Utc>>) -> Task {
    let task = Task {
        id: id.to_string(),
        owner_id: OWNER.to_string(),
        title: format!("task {id}"),
        due_date: due,
        completed: false,
        priority: Priority::Medium,
        created_at: Some(start_time()),
    };
    service.store().insert_task(&task).await.expect("insert task");
    task
}

async fn seed_habit(service: &WorklogService, id: &str, days: Vec<NaiveDate>) -> Habit {
    let habit = Habit {
        id: id.to_string(),
        owner_id: OWNER.to_string(),
        name: format!("habit {id}"),
        completed_dates: days,
        current_streak: 0,
        longest_streak: 0,
        total_completed_days: 0,
        created_at: start_time(),
        updated_at: start_time(),
    };
    service
        .store()
        .insert_habit(&habit)
        .await
        .expect("insert habit");
    habit
}

#[tokio::test]
async fn start_stop_accumulates_total_duration() {
    let h = harness();
    seed_task(&h.service, "t1", None).await;

    let session = h.service.start_session(OWNER, "t1").await.unwrap();
    h.clock.advance_secs(1500);
    h.service.stop_session(&session.id).await.unwrap();

    let total = h.service.get_total_duration("t1").await.unwrap();
    assert_eq!(total, Duration::seconds(1500));

    let stored = h.service.store().get_session(&session.id).await.unwrap();
    assert_eq!(stored.ended_at, Some(start_time() + Duration::seconds(1500)));
}

#[tokio::test]
async fn second_start_conflicts_until_the_first_stops() {
    let h = harness();
    seed_task(&h.service, "t1", None).await;
    seed_task(&h.service, "t2", None).await;

    let first = h.service.start_session(OWNER, "t1").await.unwrap();

    let err = h.service.start_session(OWNER, "t2").await.unwrap_err();
    assert!(matches!(err, Error::Conflict { .. }));

    // Still exactly one active session.
    let active = h.service.store().get_active_session(OWNER).await.unwrap();
    assert_eq!(active.map(|s| s.id), Some(first.id.clone()));

    h.service.stop_session(&first.id).await.unwrap();
    h.service.start_session(OWNER, "t2").await.unwrap();
}

#[tokio::test]
async fn another_owner_can_run_a_timer_concurrently() {
    let h = harness();
    seed_task(&h.service, "t1", None).await;

    let other_task = Task {
        id: "t-other".to_string(),
        owner_id: "owner-2".to_string(),
        title: "other".to_string(),
        due_date: None,
        completed: false,
        priority: Priority::Low,
        created_at: Some(start_time()),
    };
    h.service.store().insert_task(&other_task).await.unwrap();

    h.service.start_session(OWNER, "t1").await.unwrap();
    h.service
        .start_session("owner-2", "t-other")
        .await
        .expect("independent owner timer");
}

#[tokio::test]
async fn duplicate_stop_is_already_stopped_and_keeps_ended_at() {
    let h = harness();
    seed_task(&h.service, "t1", None).await;

    let session = h.service.start_session(OWNER, "t1").await.unwrap();
    h.clock.advance_secs(600);
    let stopped = h.service.stop_session(&session.id).await.unwrap();

    h.clock.advance_secs(300);
    let err = h.service.stop_session(&session.id).await.unwrap_err();
    assert!(matches!(err, Error::AlreadyStopped { .. }));

    let stored = h.service.store().get_session(&session.id).await.unwrap();
    assert_eq!(stored.ended_at, stopped.ended_at);
}

#[tokio::test]
async fn stopping_an_unknown_session_is_not_found() {
    let h = harness();
    let err = h.service.stop_session("nope").await.unwrap_err();
    assert!(matches!(err, Error::NotFound { kind: "session", .. }));
}

#[tokio::test]
async fn starting_against_a_foreign_task_is_not_found() {
    let h = harness();
    seed_task(&h.service, "t1", None).await;

    let err = h
        .service
        .start_session("owner-2", "t1")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound { kind: "task", .. }));
}

#[tokio::test]
async fn elapsed_grows_monotonically_while_active() {
    let h = harness();
    seed_task(&h.service, "t1", None).await;
    let session = h.service.start_session(OWNER, "t1").await.unwrap();

    let mut last = h.service.get_elapsed(&session.id).await.unwrap();
    assert!(last >= Duration::zero());

    for _ in 0..3 {
        h.clock.advance_secs(30);
        let next = h.service.get_elapsed(&session.id).await.unwrap();
        assert!(next >= last);
        last = next;
    }

    // Backward clock skew clamps to zero instead of going negative.
    h.clock.set(start_time() - Duration::seconds(120));
    let skewed = h.service.get_elapsed(&session.id).await.unwrap();
    assert_eq!(skewed, Duration::zero());
}

#[tokio::test]
async fn total_duration_includes_the_live_session() {
    let h = harness();
    seed_task(&h.service, "t1", None).await;

    let first = h.service.start_session(OWNER, "t1").await.unwrap();
    h.clock.advance_secs(600);
    h.service.stop_session(&first.id).await.unwrap();

    h.clock.advance_secs(60);
    h.service.start_session(OWNER, "t1").await.unwrap();
    h.clock.advance_secs(300);

    let total = h.service.get_total_duration("t1").await.unwrap();
    assert_eq!(total, Duration::seconds(900));
}

#[tokio::test]
async fn habit_marker_mutations_recompute_both_streaks() {
    let h = harness();
    let today = start_time().date_naive();
    seed_habit(
        &h.service,
        "h1",
        vec![today - Duration::days(2), today - Duration::days(1)],
    )
    .await;

    let summary = h.service.mark_habit_day("h1", today).await.unwrap();
    assert_eq!(summary.current_streak, 3);
    assert_eq!(summary.longest_streak, 3);
    assert_eq!(summary.total_completed_days, 3);

    // Removing the interior day must drop the current streak to 1, which
    // only a full recompute gets right.
    let summary = h
        .service
        .unmark_habit_day("h1", today - Duration::days(1))
        .await
        .unwrap();
    assert_eq!(summary.current_streak, 1);
    assert_eq!(summary.longest_streak, 1);
    assert_eq!(summary.total_completed_days, 2);

    let habit = h.service.store().get_habit("h1").await.unwrap();
    assert_eq!(habit.current_streak, 1);
    assert_eq!(habit.completed_dates.len(), 2);
}

#[tokio::test]
async fn recompute_reads_persisted_markers() {
    let h = harness();
    let today = start_time().date_naive();
    seed_habit(
        &h.service,
        "h1",
        vec![
            today - Duration::days(5),
            today - Duration::days(4),
            today - Duration::days(1),
            today,
        ],
    )
    .await;

    let summary = h.service.recompute_habit_streaks("h1").await.unwrap();
    assert_eq!(summary.current_streak, 2);
    assert_eq!(summary.longest_streak, 2);
    assert_eq!(summary.total_completed_days, 4);
}

#[tokio::test]
async fn recompute_for_missing_habit_is_not_found() {
    let h = harness();
    let err = h.service.recompute_habit_streaks("nope").await.unwrap_err();
    assert!(matches!(err, Error::NotFound { kind: "habit", .. }));
}

#[tokio::test]
async fn summarize_period_end_to_end() {
    let h = harness();
    let day = |d: u32| Utc.with_ymd_and_hms(2025, 3, d, 10, 0, 0).unwrap();

    seed_task(&h.service, "t1", Some(day(10))).await;
    seed_task(&h.service, "t2", Some(day(11))).await;
    seed_task(&h.service, "t3", Some(day(13))).await;
    seed_task(&h.service, "t4", Some(day(12))).await;
    h.service.store().set_task_completed("t1", true).await.unwrap();
    h.service.store().set_task_completed("t2", true).await.unwrap();

    // One hour on t1 (day 10), one hour on t2 (day 11), both at 10:00.
    h.clock.set(day(10));
    let s1 = h.service.start_session(OWNER, "t1").await.unwrap();
    h.clock.advance_secs(3600);
    h.service.stop_session(&s1.id).await.unwrap();

    h.clock.set(day(11));
    let s2 = h.service.start_session(OWNER, "t2").await.unwrap();
    h.clock.advance_secs(3600);
    h.service.stop_session(&s2.id).await.unwrap();

    let window = PeriodWindow::new(
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
        NaiveDate::from_ymd_opt(2025, 3, 16).unwrap(),
    )
    .unwrap();

    let summary = h.service.summarize_period(OWNER, window).await.unwrap();

    assert_eq!(summary.per_day.len(), 7);
    assert_eq!(summary.per_day[0].task_ids, vec!["t1".to_string()]);
    assert_eq!(summary.per_day[0].work_secs, 3600);
    // Empty day present as zero, not missing.
    assert_eq!(summary.per_day[5].task_ids.len(), 0);

    // 4 tasks, 2 completed, 2h logged -> 5 (worked example).
    assert_eq!(summary.productivity_score, 5);
    // Work on days 10 and 11, none on 12.
    assert_eq!(summary.best_streak, 2);

    let peak = summary.peak_hour.expect("peak hour");
    assert_eq!(peak.start_hour, 10);
    assert_eq!(peak.seconds, 7200);
}

#[tokio::test]
async fn invalid_window_is_rejected_before_any_bucketing() {
    let start = NaiveDate::from_ymd_opt(2025, 3, 16).unwrap();
    let end = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
    let err = PeriodWindow::new(start, end).unwrap_err();
    assert!(matches!(err, Error::InvalidWindow { .. }));
}

#[tokio::test]
async fn subscribers_see_session_and_streak_events() {
    let h = harness();
    seed_task(&h.service, "t1", None).await;
    seed_habit(&h.service, "h1", vec![]).await;

    let mut events = h.service.subscribe();

    let session = h.service.start_session(OWNER, "t1").await.unwrap();
    match events.try_recv().expect("start event") {
        WorklogEvent::SessionStarted { session_id, .. } => assert_eq!(session_id, session.id),
        other => panic!("unexpected event {other:?}"),
    }

    h.clock.advance_secs(60);
    h.service.stop_session(&session.id).await.unwrap();
    assert!(matches!(
        events.try_recv().expect("stop event"),
        WorklogEvent::SessionStopped { .. }
    ));

    let today = h.clock.now().date_naive();
    h.service.mark_habit_day("h1", today).await.unwrap();
    match events.try_recv().expect("streak event") {
        WorklogEvent::HabitStreaksRecomputed { summary, .. } => {
            assert_eq!(summary.current_streak, 1);
        }
        other => panic!("unexpected event {other:?}"),
    }
}
