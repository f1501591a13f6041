//! Shared taxonomy of the fitness catalog.
//!
//! Every stringly-typed identifier the backend exchanges (exercise category,
//! training goal, difficulty, joint, gender, experience level) is a closed
//! enumeration here, with its wire id and its display label in one place.

pub mod bmi;
pub mod taxonomy;

pub use bmi::{BmiClass, body_mass_index};
pub use taxonomy::{
    Category, Difficulty, ExperienceLevel, Gender, Goal, Joint, UnknownVariant,
};
