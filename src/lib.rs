//! Fitex - Fitness Tracking Client
//!
//! Client library for the Fitex fitness-tracking backend. Provides the
//! exercise catalog, training plans, workout logging and statistics over the
//! backend's JSON API, persistent login sessions, and a guided workout
//! session with rest countdowns.

pub mod api;
pub mod auth;
pub mod catalog;
pub mod storage;
pub mod workouts;

// Re-export commonly used types
pub use api::client::ApiClient;
pub use api::types::ApiError;
pub use auth::session::{AuthSession, AuthState};
pub use storage::config::AppConfig;
pub use workouts::runner::{SessionCommand, SessionEvent, SessionRunner};
pub use workouts::session::WorkoutSession;
