//! Building a workout session from a plan or from the quick-workout default.

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use thiserror::Error;

use super::backend::WorkoutBackend;
use super::session::WorkoutSession;
use super::types::{ActiveExercise, SessionError};
use crate::api::{ApiError, Exercise, ExerciseFilter};
use crate::catalog::Category;
use crate::storage::config::{Language, WorkoutSettings};

/// Outcome of resolving one exercise identifier.
#[derive(Debug)]
pub enum ExerciseLookup {
    /// Exercise details fetched
    Found(Exercise),
    /// Lookup failed; the identifier is used as display name
    NotFound { exercise_id: String, error: ApiError },
}

impl ExerciseLookup {
    /// Identifier the lookup was for.
    pub fn exercise_id(&self) -> &str {
        match self {
            ExerciseLookup::Found(exercise) => &exercise.id,
            ExerciseLookup::NotFound { exercise_id, .. } => exercise_id,
        }
    }

    /// Display name in the given language, falling back to the identifier.
    pub fn display_name(&self, language: Language) -> String {
        match self {
            ExerciseLookup::Found(exercise) => display_name(exercise, language),
            ExerciseLookup::NotFound { exercise_id, .. } => exercise_id.clone(),
        }
    }

    /// Whether the lookup succeeded.
    pub fn is_found(&self) -> bool {
        matches!(self, ExerciseLookup::Found(_))
    }
}

/// Exercise name in the given language. Falls back to the other language
/// when the preferred one is blank.
pub fn display_name(exercise: &Exercise, language: Language) -> String {
    let (preferred, other) = match language {
        Language::German => (&exercise.name_de, &exercise.name),
        Language::English => (&exercise.name, &exercise.name_de),
    };
    if !preferred.trim().is_empty() {
        preferred.clone()
    } else if !other.trim().is_empty() {
        other.clone()
    } else {
        exercise.id.clone()
    }
}

/// Identifier whose details could not be fetched.
#[derive(Debug)]
pub struct UnresolvedExercise {
    pub exercise_id: String,
    pub error: ApiError,
}

/// A freshly loaded session and the lookups that degraded.
#[derive(Debug)]
pub struct LoadedSession {
    pub session: WorkoutSession,
    pub unresolved: Vec<UnresolvedExercise>,
}

/// Session loading errors.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Training plan could not be loaded: {0}")]
    Plan(#[source] ApiError),

    #[error("Exercise catalog could not be loaded: {0}")]
    Catalog(#[source] ApiError),

    #[error("No {0} exercises available for a quick workout")]
    NoExercises(Category),

    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Resolve exercise identifiers concurrently, at most `concurrency` at a
/// time. Results are returned in input order.
pub async fn resolve_exercises<B: WorkoutBackend>(
    backend: &B,
    exercise_ids: &[String],
    concurrency: usize,
) -> Vec<ExerciseLookup> {
    stream::iter(exercise_ids.iter().cloned())
        .map(|exercise_id| async move {
            match backend.get_exercise(&exercise_id).await {
                Ok(exercise) => ExerciseLookup::Found(exercise),
                Err(error) => {
                    tracing::warn!("Exercise {} unavailable: {}", exercise_id, error);
                    ExerciseLookup::NotFound { exercise_id, error }
                }
            }
        })
        .buffered(concurrency.max(1))
        .collect()
        .await
}

/// Loads workout sessions.
pub struct SessionLoader<'a, B: WorkoutBackend> {
    backend: &'a B,
    settings: &'a WorkoutSettings,
    language: Language,
}

impl<'a, B: WorkoutBackend> SessionLoader<'a, B> {
    /// Create a loader.
    pub fn new(backend: &'a B, settings: &'a WorkoutSettings, language: Language) -> Self {
        Self {
            backend,
            settings,
            language,
        }
    }

    /// Load the plan's session, or a quick workout when no plan is given.
    pub async fn load(
        &self,
        plan_id: Option<&str>,
        started_at: DateTime<Utc>,
    ) -> Result<LoadedSession, LoadError> {
        match plan_id {
            Some(plan_id) => self.load_plan(plan_id, started_at).await,
            None => self.load_quick(started_at).await,
        }
    }

    /// Load a session from a stored plan.
    ///
    /// Failing exercise lookups degrade to the raw identifier and are listed
    /// in `unresolved`; only a failing plan lookup aborts.
    pub async fn load_plan(
        &self,
        plan_id: &str,
        started_at: DateTime<Utc>,
    ) -> Result<LoadedSession, LoadError> {
        let plan = self
            .backend
            .get_plan(plan_id)
            .await
            .map_err(LoadError::Plan)?;

        let ids: Vec<String> = plan
            .exercises
            .iter()
            .map(|entry| entry.exercise_id.clone())
            .collect();
        let lookups = resolve_exercises(self.backend, &ids, self.settings.lookup_concurrency).await;

        let exercises = plan
            .exercises
            .iter()
            .zip(&lookups)
            .map(|(entry, lookup)| {
                ActiveExercise::from_plan_entry(entry, lookup.display_name(self.language))
            })
            .collect();

        let unresolved: Vec<UnresolvedExercise> = lookups
            .into_iter()
            .filter_map(|lookup| match lookup {
                ExerciseLookup::Found(_) => None,
                ExerciseLookup::NotFound { exercise_id, error } => {
                    Some(UnresolvedExercise { exercise_id, error })
                }
            })
            .collect();

        tracing::info!(
            "Loaded plan {} ({} exercises, {} unresolved)",
            plan.name,
            ids.len(),
            unresolved.len()
        );

        let session = WorkoutSession::new(Some(plan.id.clone()), exercises, started_at)?;
        Ok(LoadedSession {
            session,
            unresolved,
        })
    }

    /// Load a quick workout: the first exercises of the configured category.
    pub async fn load_quick(&self, started_at: DateTime<Utc>) -> Result<LoadedSession, LoadError> {
        let category = self.settings.quick_category;
        let catalog = self
            .backend
            .list_exercises(&ExerciseFilter::category(category))
            .await
            .map_err(LoadError::Catalog)?;

        let exercises: Vec<ActiveExercise> = catalog
            .iter()
            .take(self.settings.quick_exercise_count)
            .map(|exercise| {
                ActiveExercise::new(
                    exercise.id.clone(),
                    display_name(exercise, self.language),
                    self.settings.quick_sets,
                    Some(self.settings.quick_reps),
                    self.settings.quick_rest_seconds,
                )
            })
            .collect();

        if exercises.is_empty() {
            return Err(LoadError::NoExercises(category));
        }

        tracing::info!("Loaded quick {} workout", category.as_str());
        let session = WorkoutSession::new(None, exercises, started_at)?;
        Ok(LoadedSession {
            session,
            unresolved: Vec::new(),
        })
    }
}
