//! Backend API access.
//!
//! All data comes from the remote backend over HTTP; this module holds the
//! client and the JSON payload types.

pub mod client;
pub mod types;

pub use client::ApiClient;
pub use types::{
    Anamnesis, ApiError, AuthResponse, CategoryCatalog, DailyProgress, Exercise, ExerciseFilter,
    ExerciseProgressEntry, GeneratePlanRequest, HealthStatus, LoggedExercise, NewTrainingPlan,
    NewWorkoutLog, TrainingPlan, User, UserProfile, WorkoutExercise, WorkoutLog, WorkoutStats,
};
