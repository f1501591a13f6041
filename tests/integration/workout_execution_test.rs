//! Integration tests for workout execution.
//!
//! Loads a session from a plan through the public loader, drives it with
//! the async runner under paused time, and checks what reaches the backend.

use std::collections::HashSet;

use chrono::Utc;
use fitex::catalog::Category;
use fitex::storage::config::{Language, WorkoutSettings};
use fitex::workouts::{
    LoadError, RunOutcome, SessionCommand, SessionEvent, SessionLoader, SessionRunner, SetOutcome,
};
use tokio::sync::{broadcast, mpsc};

use super::backend_mock::{exercise, MockBackend};

async fn next_event(events: &mut broadcast::Receiver<SessionEvent>) -> SessionEvent {
    loop {
        match events.recv().await.expect("event channel closed") {
            SessionEvent::RestTick { .. } => continue,
            event => return event,
        }
    }
}

#[tokio::test(start_paused = true)]
async fn test_plan_workout_end_to_end() {
    let backend = MockBackend::with_push_plan();
    let settings = WorkoutSettings::default();
    let loader = SessionLoader::new(&backend, &settings, Language::German);

    let loaded = loader.load(Some("push"), Utc::now()).await.unwrap();
    assert!(loaded.unresolved.is_empty());
    let names: Vec<&str> = loaded
        .session
        .exercises()
        .iter()
        .map(|ex| ex.name.as_str())
        .collect();
    assert_eq!(names, vec!["Bankdrücken", "Dips"]);

    let (runner, mut events) = SessionRunner::new(loaded.session, &backend);
    let (tx, rx) = mpsc::channel(8);

    let driver = async move {
        tx.send(SessionCommand::CompleteSet).await.unwrap();
        assert_eq!(
            next_event(&mut events).await,
            SessionEvent::SetCompleted {
                exercise_index: 0,
                outcome: SetOutcome::Resting { seconds: 5 },
            }
        );
        assert_eq!(next_event(&mut events).await, SessionEvent::RestFinished);

        tx.send(SessionCommand::CompleteSet).await.unwrap();
        assert_eq!(
            next_event(&mut events).await,
            SessionEvent::SetCompleted {
                exercise_index: 0,
                outcome: SetOutcome::Advanced { index: 1 },
            }
        );

        tx.send(SessionCommand::CompleteSet).await.unwrap();
        assert_eq!(
            next_event(&mut events).await,
            SessionEvent::SetCompleted {
                exercise_index: 1,
                outcome: SetOutcome::SessionComplete,
            }
        );

        tx.send(SessionCommand::Finish).await.unwrap();
        assert!(matches!(
            next_event(&mut events).await,
            SessionEvent::Submitted { .. }
        ));
    };

    let (outcome, ()) = tokio::join!(runner.run(rx), driver);
    assert!(matches!(outcome, RunOutcome::Submitted(_)));

    let submissions = backend.submissions();
    assert_eq!(submissions.len(), 1);
    let log = &submissions[0];
    assert_eq!(log.plan_id.as_deref(), Some("push"));
    assert_eq!(log.duration_minutes, 1);
    assert_eq!(log.exercises[0].sets_completed, 2);
    assert_eq!(log.exercises[0].weight_used, Some(60.0));
    assert_eq!(log.exercises[1].sets_completed, 1);
}

#[tokio::test(start_paused = true)]
async fn test_failed_submission_can_be_retried() {
    let backend = MockBackend::with_push_plan();
    *backend.reject_submissions.lock().unwrap() = 1;
    let settings = WorkoutSettings::default();
    let loader = SessionLoader::new(&backend, &settings, Language::German);
    let loaded = loader.load(Some("push"), Utc::now()).await.unwrap();

    let (runner, mut events) = SessionRunner::new(loaded.session, &backend);
    let (tx, rx) = mpsc::channel(8);

    let driver = async move {
        tx.send(SessionCommand::CompleteSet).await.unwrap();
        next_event(&mut events).await;
        assert_eq!(next_event(&mut events).await, SessionEvent::RestFinished);
        tx.send(SessionCommand::CompleteSet).await.unwrap();
        next_event(&mut events).await;
        tx.send(SessionCommand::CompleteSet).await.unwrap();
        assert_eq!(
            next_event(&mut events).await,
            SessionEvent::SetCompleted {
                exercise_index: 1,
                outcome: SetOutcome::SessionComplete,
            }
        );

        tx.send(SessionCommand::Finish).await.unwrap();
        match next_event(&mut events).await {
            SessionEvent::SubmitFailed { message } => assert!(message.contains("500")),
            other => panic!("expected submit failure, got {other:?}"),
        }

        tx.send(SessionCommand::Finish).await.unwrap();
        assert!(matches!(
            next_event(&mut events).await,
            SessionEvent::Submitted { .. }
        ));
    };

    let (outcome, ()) = tokio::join!(runner.run(rx), driver);
    assert!(matches!(outcome, RunOutcome::Submitted(_)));

    let submissions = backend.submissions();
    assert_eq!(submissions.len(), 1);
    assert_eq!(submissions[0].exercises[0].sets_completed, 2);
    assert_eq!(submissions[0].exercises[1].sets_completed, 1);
}

#[tokio::test(start_paused = true)]
async fn test_finish_mid_workout_submits_nothing() {
    let backend = MockBackend::with_push_plan();
    let settings = WorkoutSettings::default();
    let loader = SessionLoader::new(&backend, &settings, Language::German);
    let loaded = loader.load(Some("push"), Utc::now()).await.unwrap();

    let (runner, mut events) = SessionRunner::new(loaded.session, &backend);
    let (tx, rx) = mpsc::channel(8);

    let driver = async move {
        tx.send(SessionCommand::CompleteSet).await.unwrap();
        next_event(&mut events).await;

        tx.send(SessionCommand::Finish).await.unwrap();
        match next_event(&mut events).await {
            SessionEvent::CommandRejected { reason } => {
                assert!(reason.contains("not complete"))
            }
            other => panic!("expected rejection, got {other:?}"),
        }

        tx.send(SessionCommand::Abandon).await.unwrap();
        assert_eq!(next_event(&mut events).await, SessionEvent::Abandoned);
    };

    let (outcome, ()) = tokio::join!(runner.run(rx), driver);
    assert!(matches!(outcome, RunOutcome::Abandoned(_)));
    assert!(backend.submissions().is_empty());
}

#[tokio::test]
async fn test_unreachable_exercise_degrades_to_id() {
    let mut backend = MockBackend::with_push_plan();
    backend.unreachable = HashSet::from(["bench".to_string()]);
    let settings = WorkoutSettings::default();
    let loader = SessionLoader::new(&backend, &settings, Language::English);

    let loaded = loader.load(Some("push"), Utc::now()).await.unwrap();
    let names: Vec<&str> = loaded
        .session
        .exercises()
        .iter()
        .map(|ex| ex.name.as_str())
        .collect();

    assert_eq!(names, vec!["bench", "Dips"]);
    assert_eq!(loaded.unresolved.len(), 1);
    assert!(loaded.unresolved[0].error.is_transient());
}

#[tokio::test]
async fn test_quick_workout_uses_configured_category() {
    let mut backend = MockBackend::with_push_plan();
    backend
        .exercises
        .push(exercise("run", "Running", "Laufen", Category::Cardio));
    backend
        .exercises
        .push(exercise("bike", "Cycling", "Radfahren", Category::Cardio));

    let settings = WorkoutSettings {
        quick_category: Category::Cardio,
        quick_exercise_count: 1,
        quick_sets: 1,
        quick_rest_seconds: 0,
        ..Default::default()
    };
    let loader = SessionLoader::new(&backend, &settings, Language::German);

    let loaded = loader.load(None, Utc::now()).await.unwrap();
    let exercises = loaded.session.exercises();
    assert_eq!(exercises.len(), 1);
    assert_eq!(exercises[0].name, "Laufen");
    assert_eq!(exercises[0].sets, 1);

    let settings = WorkoutSettings {
        quick_category: Category::Flexibility,
        ..Default::default()
    };
    let loader = SessionLoader::new(&backend, &settings, Language::German);
    assert!(matches!(
        loader.load(None, Utc::now()).await,
        Err(LoadError::NoExercises(Category::Flexibility))
    ));
}
