use feed_sentiment::{SessionId, SessionTracker};
use std::sync::Arc;

#[test]
fn test_second_begin_is_rejected_until_complete() {
    let tracker = SessionTracker::new();
    let tab = SessionId::from(7u64);

    assert!(tracker.begin_if_idle(&tab));
    assert!(!tracker.begin_if_idle(&tab));
    assert!(tracker.is_in_progress(&tab));

    tracker.complete(&tab, 0.5);

    assert!(!tracker.is_in_progress(&tab));
    assert_eq!(tracker.latest(&tab), Some(0.5));
    assert!(tracker.begin_if_idle(&tab));
}

#[test]
fn test_sessions_are_independent() {
    let tracker = SessionTracker::new();
    let first = SessionId::from("tab-1");
    let second = SessionId::from("tab-2");

    assert!(tracker.begin_if_idle(&first));
    assert!(tracker.begin_if_idle(&second));

    tracker.complete(&second, -0.1);
    assert!(tracker.is_in_progress(&first));
    assert_eq!(tracker.latest(&first), None);
    assert_eq!(tracker.latest(&second), Some(-0.1));
}

#[test]
fn test_failure_releases_without_clearing_previous_score() {
    let tracker = SessionTracker::new();
    let tab = SessionId::from("tab");

    tracker.begin_if_idle(&tab);
    tracker.complete(&tab, 0.2);
    tracker.begin_if_idle(&tab);
    tracker.fail(&tab);

    assert!(!tracker.is_in_progress(&tab));
    assert_eq!(tracker.latest(&tab), Some(0.2));
}

#[test]
fn test_dropped_guard_releases_session() {
    let tracker = Arc::new(SessionTracker::new());
    let tab = SessionId::from("tab");

    {
        let guard = tracker.begin(&tab).expect("idle session should start");
        assert!(tracker.begin(&tab).is_none());
        assert_eq!(guard.session(), &tab);
    }

    assert!(!tracker.is_in_progress(&tab));
    assert_eq!(tracker.latest(&tab), None);

    let guard = tracker.begin(&tab).expect("released session should start again");
    guard.complete(0.75);
    assert_eq!(tracker.latest(&tab), Some(0.75));
    assert!(!tracker.is_in_progress(&tab));
}

#[test]
fn test_guard_released_on_panic() {
    let tracker = Arc::new(SessionTracker::new());
    let tab = SessionId::from("tab");

    let worker = {
        let tracker = tracker.clone();
        let tab = tab.clone();
        std::thread::spawn(move || {
            let _guard = tracker.begin(&tab).expect("idle session should start");
            panic!("scoring crashed");
        })
    };
    assert!(worker.join().is_err());

    assert!(!tracker.is_in_progress(&tab));
    assert!(tracker.begin_if_idle(&tab));
}

#[test]
fn test_scores_and_discard() {
    let tracker = SessionTracker::new();
    let scored = SessionId::from("scored");
    let pending = SessionId::from("pending");

    tracker.begin_if_idle(&scored);
    tracker.complete(&scored, 0.3);
    tracker.begin_if_idle(&pending);

    assert_eq!(tracker.active_sessions(), vec![pending.clone(), scored.clone()]);
    let scores = tracker.scores();
    assert_eq!(scores.len(), 1);
    assert_eq!(scores[&scored], 0.3);

    assert!(tracker.discard(&scored));
    assert!(!tracker.discard(&scored));
    assert_eq!(tracker.latest(&scored), None);

    // A late result for a discarded session does not resurrect it
    tracker.complete(&scored, 0.9);
    assert_eq!(tracker.latest(&scored), None);
    assert_eq!(tracker.active_sessions(), vec![pending]);
}

#[test]
fn test_state_records_completion_time_and_run() {
    let tracker = SessionTracker::new();
    let tab = SessionId::from("tab");
    assert!(tracker.state(&tab).is_none());

    tracker.begin_if_idle(&tab);
    let running = tracker.state(&tab).expect("begun session should have state");
    assert!(running.in_progress);
    assert!(running.last_completed_at.is_none());

    tracker.complete(&tab, 0.1);
    let done = tracker.state(&tab).expect("completed session should have state");
    assert!(!done.in_progress);
    assert_eq!(done.last_score, Some(0.1));
    assert!(done.last_completed_at.is_some());

    tracker.begin_if_idle(&tab);
    let next = tracker.state(&tab).expect("session should still exist");
    assert!(next.run > running.run);
}

#[test]
fn test_discarded_run_cannot_release_its_successor() {
    let tracker = Arc::new(SessionTracker::new());
    let tab = SessionId::from("tab");

    let stale = tracker.begin(&tab).expect("idle session should start");
    assert!(tracker.discard(&tab));
    let current = tracker.begin(&tab).expect("discarded session should start fresh");

    // The old computation finishing must not touch the new one
    drop(stale);
    assert!(tracker.is_in_progress(&tab));
    assert!(tracker.begin(&tab).is_none());

    current.complete(0.4);
    assert_eq!(tracker.latest(&tab), Some(0.4));
    assert!(!tracker.is_in_progress(&tab));
}

#[test]
fn test_stale_guard_score_is_ignored() {
    let tracker = Arc::new(SessionTracker::new());
    let tab = SessionId::from("tab");

    let stale = tracker.begin(&tab).expect("idle session should start");
    tracker.discard(&tab);
    let current = tracker.begin(&tab).expect("discarded session should start fresh");

    stale.complete(-0.9);
    assert_eq!(tracker.latest(&tab), None);
    assert!(tracker.is_in_progress(&tab));

    drop(current);
    assert!(!tracker.is_in_progress(&tab));
}
