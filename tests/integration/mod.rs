//! Integration test modules.

mod auth_session_test;
mod backend_mock;
mod workout_execution_test;
