//! Unit test modules.

mod api_payload_test;
mod workout_session_test;
