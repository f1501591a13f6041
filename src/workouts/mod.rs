//! Guided workout execution.
//!
//! A session is loaded from a training plan (or sampled from the catalog for
//! a quick workout), driven set by set with a rest countdown between sets,
//! and finally submitted as a workout log.

pub mod backend;
pub mod loader;
pub mod runner;
pub mod session;
pub mod timer;
pub mod types;

pub use backend::WorkoutBackend;
pub use loader::{
    display_name, resolve_exercises, ExerciseLookup, LoadError, LoadedSession, SessionLoader,
    UnresolvedExercise,
};
pub use runner::{RunOutcome, SessionCommand, SessionEvent, SessionRunner};
pub use session::{duration_minutes, WorkoutSession};
pub use timer::{RestTimer, TICK_PERIOD};
pub use types::{
    ActiveExercise, RestTick, SessionError, SessionProgress, SessionStatus, SetOutcome,
};
