//! Guided workout session state machine.
//!
//! Tracks set completion, exercise navigation and the rest countdown of a
//! single session. The state machine is synchronous and clock-free: the
//! caller drives the countdown with `tick()` once per second and passes the
//! submission time to `to_log()`.

use chrono::{DateTime, Utc};

use super::backend::WorkoutBackend;
use super::types::{
    ActiveExercise, RestTick, SessionError, SessionProgress, SessionStatus, SetOutcome,
};
use crate::api::{LoggedExercise, NewWorkoutLog, WorkoutLog};

/// One guided workout attempt.
#[derive(Debug, Clone)]
pub struct WorkoutSession {
    /// Plan the session was built from
    plan_id: Option<String>,
    /// Exercises in execution order (never empty)
    exercises: Vec<ActiveExercise>,
    /// Index of the exercise being performed
    current: usize,
    /// Whether the rest countdown is running
    resting: bool,
    /// Seconds left in the rest countdown
    rest_remaining: u32,
    /// When the session was created
    started_at: DateTime<Utc>,
}

impl WorkoutSession {
    /// Create a session. Completed-set counters are reset to zero and the
    /// first exercise with sets to do becomes current.
    pub fn new(
        plan_id: Option<String>,
        exercises: Vec<ActiveExercise>,
        started_at: DateTime<Utc>,
    ) -> Result<Self, SessionError> {
        if exercises.is_empty() {
            return Err(SessionError::EmptySession);
        }

        let exercises = exercises
            .into_iter()
            .map(|ex| ActiveExercise {
                completed_sets: 0,
                ..ex
            })
            .collect::<Vec<_>>();

        tracing::info!(
            "Workout session created with {} exercises{}",
            exercises.len(),
            plan_id
                .as_deref()
                .map(|id| format!(" from plan {id}"))
                .unwrap_or_default()
        );

        let current = exercises
            .iter()
            .position(|ex| !ex.is_done())
            .unwrap_or(0);

        Ok(Self {
            plan_id,
            exercises,
            current,
            resting: false,
            rest_remaining: 0,
            started_at,
        })
    }

    /// Current status.
    pub fn status(&self) -> SessionStatus {
        if self.is_complete() {
            SessionStatus::Complete
        } else if self.resting {
            SessionStatus::Resting
        } else {
            SessionStatus::ActiveExercise
        }
    }

    /// Whether every exercise reached its target.
    pub fn is_complete(&self) -> bool {
        self.exercises.iter().all(ActiveExercise::is_done)
    }

    /// Whether the rest countdown is running.
    pub fn is_resting(&self) -> bool {
        self.resting
    }

    /// Seconds left in the rest countdown.
    pub fn rest_remaining(&self) -> u32 {
        self.rest_remaining
    }

    /// Plan the session was built from.
    pub fn plan_id(&self) -> Option<&str> {
        self.plan_id.as_deref()
    }

    /// Exercises in execution order.
    pub fn exercises(&self) -> &[ActiveExercise] {
        &self.exercises
    }

    /// Index of the current exercise.
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// The current exercise.
    pub fn current_exercise(&self) -> &ActiveExercise {
        &self.exercises[self.current]
    }

    /// Session start time.
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Completed and total sets across all exercises.
    pub fn progress(&self) -> SessionProgress {
        SessionProgress {
            completed_sets: self.exercises.iter().map(|ex| ex.completed_sets).sum(),
            total_sets: self.exercises.iter().map(|ex| ex.sets).sum(),
        }
    }

    /// Record one completed set of the current exercise.
    ///
    /// Finishing an exercise moves to the next one without rest; any other
    /// set starts the exercise's rest countdown.
    pub fn complete_set(&mut self) -> Result<SetOutcome, SessionError> {
        match self.status() {
            SessionStatus::Complete => return Err(SessionError::AlreadyComplete),
            SessionStatus::Resting => return Err(SessionError::Resting),
            SessionStatus::ActiveExercise => {}
        }

        let index = self.current;
        let exercise = &mut self.exercises[index];
        if exercise.is_done() {
            return Err(SessionError::ExerciseDone { index });
        }

        exercise.completed_sets += 1;
        let exercise_done = exercise.is_done();
        let rest_seconds = exercise.rest_seconds;

        tracing::debug!(
            "Set {}/{} of {} completed",
            exercise.completed_sets,
            exercise.sets,
            exercise.name
        );

        if exercise_done {
            let next = self.next_open_after(index);
            if let Some(next) = next {
                self.current = next;
            }
            if self.is_complete() {
                tracing::info!("Workout complete");
                return Ok(SetOutcome::SessionComplete);
            }
            return Ok(match next {
                Some(index) => SetOutcome::Advanced { index },
                None => SetOutcome::ExerciseDone,
            });
        }

        if rest_seconds == 0 {
            return Ok(SetOutcome::NextSet);
        }

        self.resting = true;
        self.rest_remaining = rest_seconds;
        Ok(SetOutcome::Resting {
            seconds: rest_seconds,
        })
    }

    /// First exercise after `index` that still has sets to do.
    fn next_open_after(&self, index: usize) -> Option<usize> {
        self.exercises
            .iter()
            .enumerate()
            .skip(index + 1)
            .find(|(_, ex)| !ex.is_done())
            .map(|(i, _)| i)
    }

    /// Advance the rest countdown by one second.
    pub fn tick(&mut self) -> RestTick {
        if !self.resting {
            return RestTick::Idle;
        }

        if self.rest_remaining <= 1 {
            self.rest_remaining = 0;
            self.resting = false;
            tracing::debug!("Rest finished");
            return RestTick::Finished;
        }

        self.rest_remaining -= 1;
        RestTick::Counting {
            remaining: self.rest_remaining,
        }
    }

    /// End the rest countdown immediately. Returns whether one was running.
    pub fn skip_rest(&mut self) -> bool {
        let was_resting = self.resting;
        self.resting = false;
        self.rest_remaining = 0;
        if was_resting {
            tracing::debug!("Rest skipped");
        }
        was_resting
    }

    /// Jump to another exercise.
    pub fn select_exercise(&mut self, index: usize) -> Result<(), SessionError> {
        if self.resting {
            return Err(SessionError::Resting);
        }
        if index >= self.exercises.len() {
            return Err(SessionError::InvalidIndex {
                index,
                len: self.exercises.len(),
            });
        }
        self.current = index;
        Ok(())
    }

    /// Build the workout log for a submission at `finished_at`.
    pub fn to_log(&self, finished_at: DateTime<Utc>) -> NewWorkoutLog {
        NewWorkoutLog {
            plan_id: self.plan_id.clone(),
            date: finished_at.date_naive(),
            exercises: self
                .exercises
                .iter()
                .map(|ex| LoggedExercise {
                    exercise_id: ex.exercise_id.clone(),
                    sets_completed: ex.completed_sets,
                    reps_completed: ex.reps,
                    weight_used: ex.weight_kg,
                })
                .collect(),
            duration_minutes: duration_minutes(self.started_at, finished_at),
            notes: None,
            user_id: String::new(),
        }
    }

    /// Submit a complete session. The session is left untouched on failure.
    pub async fn submit<B: WorkoutBackend>(
        &self,
        backend: &B,
        finished_at: DateTime<Utc>,
    ) -> Result<WorkoutLog, SessionError> {
        if !self.is_complete() {
            let progress = self.progress();
            return Err(SessionError::NotComplete {
                completed_sets: progress.completed_sets,
                total_sets: progress.total_sets,
            });
        }

        let log = self.to_log(finished_at);
        match backend.log_workout(&log).await {
            Ok(stored) => {
                tracing::info!(
                    "Workout saved ({} min, {} exercises)",
                    stored.duration_minutes,
                    stored.exercises.len()
                );
                Ok(stored)
            }
            Err(e) => {
                tracing::warn!("Workout submission failed: {}", e);
                Err(SessionError::SubmitFailed(e))
            }
        }
    }
}

/// Elapsed minutes between two instants, rounded, never below 1.
pub fn duration_minutes(started_at: DateTime<Utc>, finished_at: DateTime<Utc>) -> u32 {
    let elapsed_ms = (finished_at - started_at).num_milliseconds().max(0);
    let minutes = (elapsed_ms + 30_000) / 60_000;
    minutes.clamp(1, u32::MAX as i64) as u32
}
