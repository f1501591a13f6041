//! Local storage: configuration file and data directory.

pub mod config;

pub use config::{
    AppConfig, ApiSettings, AuthSettings, ConfigError, DisplaySettings, Language, TokenBackend,
    WorkoutSettings,
};
