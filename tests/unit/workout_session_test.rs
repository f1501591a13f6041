//! Unit tests for the WorkoutSession state machine.

use chrono::{Duration, TimeZone, Utc};
use fitex::workouts::{
    ActiveExercise, RestTick, SessionError, SessionStatus, SetOutcome, WorkoutSession,
};

fn create_test_session() -> WorkoutSession {
    WorkoutSession::new(
        Some("plan-7".to_string()),
        vec![
            ActiveExercise::new("squat", "Kniebeuge", 3, Some(8), 90),
            ActiveExercise::new("plank", "Unterarmstütz", 2, None, 30),
            ActiveExercise::new("lunge", "Ausfallschritt", 2, Some(12), 0),
        ],
        Utc.with_ymd_and_hms(2026, 3, 14, 18, 0, 0).unwrap(),
    )
    .expect("Should create session")
}

/// Drive the session with a fixed command pattern and check the counter
/// invariants after every step.
#[test]
fn test_counters_stay_within_targets() {
    let mut session = create_test_session();
    let mut steps = 0;

    while !session.is_complete() {
        let before: Vec<u32> = session.exercises().iter().map(|e| e.completed_sets).collect();
        let current = session.current_index();

        match session.complete_set() {
            Ok(_) => {
                let after: Vec<u32> =
                    session.exercises().iter().map(|e| e.completed_sets).collect();
                let changed: Vec<usize> = (0..after.len())
                    .filter(|&i| after[i] != before[i])
                    .collect();
                assert_eq!(changed, vec![current]);
                assert_eq!(after[current], before[current] + 1);
            }
            Err(SessionError::Resting) => {
                while let RestTick::Counting { .. } = session.tick() {}
            }
            Err(e) => panic!("unexpected error: {e}"),
        }

        for exercise in session.exercises() {
            assert!(exercise.completed_sets <= exercise.sets);
        }
        steps += 1;
        assert!(steps < 100, "session never completed");
    }

    assert_eq!(session.status(), SessionStatus::Complete);
    assert!(session.exercises().iter().all(|e| e.completed_sets == e.sets));
}

#[test]
fn test_rest_countdown_matches_exercise() {
    let mut session = create_test_session();

    assert_eq!(
        session.complete_set().unwrap(),
        SetOutcome::Resting { seconds: 90 }
    );
    assert_eq!(session.rest_remaining(), 90);

    let mut ticks = 0;
    loop {
        ticks += 1;
        match session.tick() {
            RestTick::Counting { remaining } => assert_eq!(remaining, 90 - ticks),
            RestTick::Finished => break,
            RestTick::Idle => panic!("countdown stopped early"),
        }
    }
    assert_eq!(ticks, 90);
    assert!(!session.is_resting());
    assert_eq!(session.tick(), RestTick::Idle);
}

#[test]
fn test_skip_rest_always_clears() {
    let mut session = create_test_session();

    assert!(!session.skip_rest());
    assert_eq!(session.rest_remaining(), 0);

    session.complete_set().unwrap();
    session.tick();
    assert!(session.skip_rest());
    assert!(!session.is_resting());
    assert_eq!(session.rest_remaining(), 0);
}

#[test]
fn test_select_and_finish_out_of_order() {
    let mut session = create_test_session();

    session.select_exercise(2).unwrap();
    assert_eq!(session.complete_set().unwrap(), SetOutcome::NextSet);
    assert_eq!(session.complete_set().unwrap(), SetOutcome::ExerciseDone);
    assert_eq!(session.current_index(), 2);
    assert!(matches!(
        session.complete_set(),
        Err(SessionError::ExerciseDone { index: 2 })
    ));

    session.select_exercise(0).unwrap();
    assert_eq!(session.current_exercise().exercise_id, "squat");
    assert!(!session.is_complete());
}

#[test]
fn test_partial_log() {
    let mut session = create_test_session();
    session.complete_set().unwrap();
    session.skip_rest();

    let finished = session.started_at() + Duration::minutes(42) + Duration::seconds(20);
    let log = session.to_log(finished);

    assert_eq!(log.plan_id.as_deref(), Some("plan-7"));
    assert_eq!(log.date.to_string(), "2026-03-14");
    assert_eq!(log.duration_minutes, 42);
    let sets: Vec<u32> = log.exercises.iter().map(|e| e.sets_completed).collect();
    assert_eq!(sets, vec![1, 0, 0]);
    assert_eq!(log.exercises[1].reps_completed, None);
}

#[test]
fn test_progress_percent() {
    let mut session = create_test_session();
    assert_eq!(session.progress().total_sets, 7);
    assert_eq!(session.progress().percent(), 0.0);

    session.select_exercise(2).unwrap();
    session.complete_set().unwrap();
    let progress = session.progress();
    assert_eq!(progress.completed_sets, 1);
    assert!((progress.percent() - 100.0 / 7.0).abs() < 0.01);
}
