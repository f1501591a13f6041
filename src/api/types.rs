//! Backend payload types and API errors.

use crate::catalog::{
    BmiClass, Category, Difficulty, ExperienceLevel, Gender, Goal, Joint,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error types for backend calls.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection failure or timeout
    #[error("Network unavailable: {0}")]
    Network(String),

    /// Missing, expired or rejected token (HTTP 401)
    #[error("Not authorized: {detail}")]
    Unauthorized { detail: String },

    /// Resource does not exist (HTTP 404)
    #[error("Not found: {detail}")]
    NotFound { detail: String },

    /// Any other non-success status
    #[error("Server returned {status}: {detail}")]
    Server { status: u16, detail: String },

    /// Response body did not match the expected shape
    #[error("Unexpected response: {0}")]
    Decode(String),

    /// Request could not be built
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ApiError {
    /// Server-provided detail message, if the backend sent one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Unauthorized { detail }
            | ApiError::NotFound { detail }
            | ApiError::Server { detail, .. } => Some(detail.as_str()),
            _ => None,
        }
    }

    /// Whether retrying the same request later could succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::Network(_) => true,
            ApiError::Server { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

/// A catalog exercise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: String,
    pub name: String,
    pub name_de: String,
    pub category: Category,
    #[serde(default)]
    pub muscle_groups: Vec<String>,
    #[serde(default)]
    pub equipment: Option<String>,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub description_de: String,
    #[serde(default)]
    pub instructions: Vec<String>,
    #[serde(default)]
    pub instructions_de: Vec<String>,
    /// Conditions for which the exercise should be avoided
    #[serde(default)]
    pub contraindications: Vec<String>,
    #[serde(default)]
    pub is_rehabilitation: bool,
    #[serde(default)]
    pub calories_per_minute: Option<f32>,
}

/// Query filters for listing exercises.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExerciseFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub muscle_group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_rehabilitation: Option<bool>,
}

impl ExerciseFilter {
    /// Filter by category only.
    pub fn category(category: Category) -> Self {
        Self {
            category: Some(category),
            ..Default::default()
        }
    }
}

/// Category entry of the catalog listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryInfo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
}

/// Difficulty entry of the catalog listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifficultyInfo {
    pub id: String,
    pub name: String,
}

/// Categories, muscle groups and difficulty levels known to the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryCatalog {
    #[serde(default)]
    pub categories: Vec<CategoryInfo>,
    #[serde(default)]
    pub muscle_groups: Vec<String>,
    #[serde(default)]
    pub difficulty_levels: Vec<DifficultyInfo>,
}

fn default_sets() -> u32 {
    3
}

fn default_reps() -> Option<u32> {
    Some(10)
}

fn default_rest_seconds() -> u32 {
    60
}

fn default_days_per_week() -> u32 {
    3
}

fn default_duration_weeks() -> u32 {
    4
}

/// One exercise prescription inside a training plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutExercise {
    pub exercise_id: String,
    #[serde(default = "default_sets")]
    pub sets: u32,
    #[serde(default = "default_reps")]
    pub reps: Option<u32>,
    #[serde(default)]
    pub duration_seconds: Option<u32>,
    #[serde(default)]
    pub weight_kg: Option<f32>,
    #[serde(default = "default_rest_seconds")]
    pub rest_seconds: u32,
    #[serde(default)]
    pub notes: Option<String>,
}

impl WorkoutExercise {
    /// Prescription with the backend defaults (3 x 10, 60 s rest).
    pub fn new(exercise_id: impl Into<String>) -> Self {
        Self {
            exercise_id: exercise_id.into(),
            sets: default_sets(),
            reps: default_reps(),
            duration_seconds: None,
            weight_kg: None,
            rest_seconds: default_rest_seconds(),
            notes: None,
        }
    }
}

/// A stored training plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingPlan {
    pub id: String,
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub goal: Goal,
    #[serde(default)]
    pub exercises: Vec<WorkoutExercise>,
    #[serde(default = "default_days_per_week")]
    pub days_per_week: u32,
    #[serde(default = "default_duration_weeks")]
    pub duration_weeks: u32,
    #[serde(default)]
    pub is_ai_generated: bool,
    #[serde(default)]
    pub created_at: String,
}

/// Body of plan create and update requests.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewTrainingPlan {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub goal: Goal,
    pub exercises: Vec<WorkoutExercise>,
    pub days_per_week: u32,
    pub duration_weeks: u32,
    pub is_ai_generated: bool,
    /// Overwritten by the backend with the caller's id
    pub user_id: String,
}

impl NewTrainingPlan {
    /// Create a plan draft with the default schedule (3 days, 4 weeks).
    pub fn new(name: impl Into<String>, goal: Goal, exercises: Vec<WorkoutExercise>) -> Self {
        Self {
            name: name.into(),
            description: None,
            goal,
            exercises,
            days_per_week: default_days_per_week(),
            duration_weeks: default_duration_weeks(),
            is_ai_generated: false,
            user_id: String::new(),
        }
    }

    /// Check the draft before sending it.
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.name.trim().is_empty() {
            return Err(ApiError::InvalidRequest("plan name must not be empty".into()));
        }
        if self.exercises.is_empty() {
            return Err(ApiError::InvalidRequest(
                "plan needs at least one exercise".into(),
            ));
        }
        if !(1..=7).contains(&self.days_per_week) {
            return Err(ApiError::InvalidRequest(
                "days per week must be between 1 and 7".into(),
            ));
        }
        Ok(())
    }
}

impl From<&TrainingPlan> for NewTrainingPlan {
    fn from(plan: &TrainingPlan) -> Self {
        Self {
            name: plan.name.clone(),
            description: plan.description.clone(),
            goal: plan.goal,
            exercises: plan.exercises.clone(),
            days_per_week: plan.days_per_week,
            duration_weeks: plan.duration_weeks,
            is_ai_generated: plan.is_ai_generated,
            user_id: plan.user_id.clone(),
        }
    }
}

/// Request for a generated plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratePlanRequest {
    pub goal: Goal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goals: Option<Vec<Goal>>,
    pub days_per_week: u32,
    pub duration_weeks: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focus_areas: Option<Vec<String>>,
}

impl GeneratePlanRequest {
    /// Request for a single goal with the default schedule.
    pub fn new(goal: Goal) -> Self {
        Self {
            goal,
            goals: None,
            days_per_week: default_days_per_week(),
            duration_weeks: default_duration_weeks(),
            focus_areas: None,
        }
    }
}

/// Per-exercise entry of a workout log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggedExercise {
    pub exercise_id: String,
    pub sets_completed: u32,
    #[serde(default)]
    pub reps_completed: Option<u32>,
    #[serde(default)]
    pub weight_used: Option<f32>,
}

/// Body of a workout-log submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewWorkoutLog {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan_id: Option<String>,
    /// ISO calendar date (YYYY-MM-DD)
    pub date: NaiveDate,
    pub exercises: Vec<LoggedExercise>,
    pub duration_minutes: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Overwritten by the backend with the caller's id
    pub user_id: String,
}

/// A stored workout log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutLog {
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub plan_id: Option<String>,
    pub date: String,
    #[serde(default)]
    pub exercises: Vec<LoggedExercise>,
    pub duration_minutes: u32,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: String,
}

/// Daily activity point of the stats endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyProgress {
    pub date: String,
    pub workouts: u32,
    pub duration: u32,
}

/// Aggregated workout statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkoutStats {
    pub total_workouts: u32,
    pub total_duration_minutes: u32,
    pub workouts_this_week: u32,
    pub workouts_this_month: u32,
    pub streak_days: u32,
    #[serde(default)]
    pub progress_data: Vec<DailyProgress>,
}

impl WorkoutStats {
    /// The most recent `days` entries of the progress series.
    pub fn last_days(&self, days: usize) -> &[DailyProgress] {
        let start = self.progress_data.len().saturating_sub(days);
        &self.progress_data[start..]
    }

    /// Largest daily duration among the most recent `days`, at least 1.
    pub fn max_duration(&self, days: usize) -> u32 {
        self.last_days(days)
            .iter()
            .map(|d| d.duration)
            .max()
            .unwrap_or(0)
            .max(1)
    }
}

/// One historical performance of an exercise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseProgressEntry {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub weight: Option<f32>,
    #[serde(default)]
    pub sets: Option<u32>,
    #[serde(default)]
    pub reps: Option<u32>,
}

/// Self-reported body data and preferences.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Weight in kg
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f32>,
    /// Height in cm
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fitness_goal: Option<Goal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience_level: Option<ExperienceLevel>,
    /// Computed by the backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bmi: Option<f32>,
}

impl UserProfile {
    /// Weight class of the stored BMI.
    pub fn bmi_class(&self) -> Option<BmiClass> {
        self.bmi.map(BmiClass::from_bmi)
    }
}

/// Health and contraindication questionnaire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Anamnesis {
    #[serde(default)]
    pub heart_conditions: bool,
    #[serde(default)]
    pub high_blood_pressure: bool,
    #[serde(default)]
    pub diabetes: bool,
    #[serde(default)]
    pub joint_problems: Vec<Joint>,
    #[serde(default)]
    pub other_conditions: Option<String>,
    #[serde(default)]
    pub medications: Option<String>,
    #[serde(default)]
    pub physical_limitations: Option<String>,
}

impl Anamnesis {
    /// Whether any condition or limitation has been reported.
    pub fn has_findings(&self) -> bool {
        self.heart_conditions
            || self.high_blood_pressure
            || self.diabetes
            || !self.joint_problems.is_empty()
            || self.other_conditions.as_deref().is_some_and(|s| !s.trim().is_empty())
            || self
                .physical_limitations
                .as_deref()
                .is_some_and(|s| !s.trim().is_empty())
    }
}

/// An authenticated user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub profile: Option<UserProfile>,
    #[serde(default)]
    pub anamnesis: Option<Anamnesis>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Body of login requests.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Body of registration requests.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub name: &'a str,
}

/// Login and registration response.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

/// Response of the profile update.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileUpdate {
    pub profile: UserProfile,
}

/// Response of the anamnesis update.
#[derive(Debug, Clone, Deserialize)]
pub struct AnamnesisUpdate {
    pub anamnesis: Anamnesis,
}

/// Backend health report.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}
