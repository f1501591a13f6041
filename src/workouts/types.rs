//! Guided workout session types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::{ApiError, WorkoutExercise};

/// One exercise of a running session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveExercise {
    /// Catalog identifier
    pub exercise_id: String,
    /// Display name, or the identifier when the lookup failed
    pub name: String,
    /// Target number of sets
    pub sets: u32,
    /// Target repetitions per set
    pub reps: Option<u32>,
    /// Rest between sets in seconds
    pub rest_seconds: u32,
    /// Sets completed so far (never above `sets`)
    pub completed_sets: u32,
    /// Working weight in kg
    pub weight_kg: Option<f32>,
}

impl ActiveExercise {
    /// Create an entry with no completed sets.
    pub fn new(
        exercise_id: impl Into<String>,
        name: impl Into<String>,
        sets: u32,
        reps: Option<u32>,
        rest_seconds: u32,
    ) -> Self {
        Self {
            exercise_id: exercise_id.into(),
            name: name.into(),
            sets,
            reps,
            rest_seconds,
            completed_sets: 0,
            weight_kg: None,
        }
    }

    /// Create an entry from a plan prescription.
    pub fn from_plan_entry(entry: &WorkoutExercise, name: impl Into<String>) -> Self {
        Self {
            weight_kg: entry.weight_kg,
            ..Self::new(
                entry.exercise_id.clone(),
                name,
                entry.sets,
                entry.reps,
                entry.rest_seconds,
            )
        }
    }

    /// Set the working weight.
    pub fn with_weight(mut self, weight_kg: f32) -> Self {
        self.weight_kg = Some(weight_kg);
        self
    }

    /// Whether every target set is done.
    pub fn is_done(&self) -> bool {
        self.completed_sets >= self.sets
    }

    /// Sets still to do.
    pub fn remaining_sets(&self) -> u32 {
        self.sets.saturating_sub(self.completed_sets)
    }
}

/// Observable state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Waiting for the user to perform a set
    ActiveExercise,
    /// Rest countdown running
    Resting,
    /// Every exercise reached its target
    Complete,
}

impl SessionStatus {
    /// Identifier matching the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::ActiveExercise => "active_exercise",
            SessionStatus::Resting => "resting",
            SessionStatus::Complete => "complete",
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What completing a set led to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOutcome {
    /// Rest countdown started
    Resting { seconds: u32 },
    /// More sets of the same exercise, no rest configured
    NextSet,
    /// Exercise done, moved on to the next one
    Advanced { index: usize },
    /// Exercise done, no open exercise after it while earlier ones are open
    ExerciseDone,
    /// Every exercise reached its target
    SessionComplete,
}

/// Result of one countdown tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestTick {
    /// Countdown still running
    Counting { remaining: u32 },
    /// Countdown reached zero on this tick
    Finished,
    /// No countdown running
    Idle,
}

/// Overall set progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionProgress {
    pub completed_sets: u32,
    pub total_sets: u32,
}

impl SessionProgress {
    /// Completed share in percent (0 when there are no sets).
    pub fn percent(&self) -> f32 {
        if self.total_sets == 0 {
            0.0
        } else {
            self.completed_sets as f32 / self.total_sets as f32 * 100.0
        }
    }
}

/// Session errors.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Workout has no exercises")]
    EmptySession,

    #[error("Rest countdown is running")]
    Resting,

    #[error("Workout already complete")]
    AlreadyComplete,

    #[error("Workout not complete yet ({completed_sets}/{total_sets} sets)")]
    NotComplete { completed_sets: u32, total_sets: u32 },

    #[error("Exercise {index} already has all sets completed")]
    ExerciseDone { index: usize },

    #[error("No exercise at position {index} (workout has {len})")]
    InvalidIndex { index: usize, len: usize },

    #[error("Workout could not be saved: {0}")]
    SubmitFailed(#[source] ApiError),
}
