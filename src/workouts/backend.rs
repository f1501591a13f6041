//! Backend operations a guided workout depends on.

use std::future::Future;

use crate::api::{
    ApiClient, ApiError, Exercise, ExerciseFilter, NewWorkoutLog, TrainingPlan, WorkoutLog,
};

/// Trait for the remote collaborators of a workout session.
pub trait WorkoutBackend: Send + Sync {
    /// Fetch a plan with its ordered exercise prescriptions.
    fn get_plan(
        &self,
        plan_id: &str,
    ) -> impl Future<Output = Result<TrainingPlan, ApiError>> + Send;

    /// Fetch one exercise. May fail per identifier.
    fn get_exercise(
        &self,
        exercise_id: &str,
    ) -> impl Future<Output = Result<Exercise, ApiError>> + Send;

    /// List exercises matching a filter.
    fn list_exercises(
        &self,
        filter: &ExerciseFilter,
    ) -> impl Future<Output = Result<Vec<Exercise>, ApiError>> + Send;

    /// Persist a finished workout.
    fn log_workout(
        &self,
        log: &NewWorkoutLog,
    ) -> impl Future<Output = Result<WorkoutLog, ApiError>> + Send;
}

impl WorkoutBackend for ApiClient {
    async fn get_plan(&self, plan_id: &str) -> Result<TrainingPlan, ApiError> {
        ApiClient::get_plan(self, plan_id).await
    }

    async fn get_exercise(&self, exercise_id: &str) -> Result<Exercise, ApiError> {
        ApiClient::get_exercise(self, exercise_id).await
    }

    async fn list_exercises(&self, filter: &ExerciseFilter) -> Result<Vec<Exercise>, ApiError> {
        ApiClient::list_exercises(self, filter).await
    }

    async fn log_workout(&self, log: &NewWorkoutLog) -> Result<WorkoutLog, ApiError> {
        ApiClient::log_workout(self, log).await
    }
}

#[cfg(test)]
pub(crate) mod mock {
    //! In-memory backend for unit tests.

    use super::*;
    use crate::catalog::{Category, Difficulty};
    use std::collections::{HashMap, HashSet};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    pub(crate) fn exercise(id: &str, name_de: &str, category: Category) -> Exercise {
        Exercise {
            id: id.to_string(),
            name: format!("{id} (en)"),
            name_de: name_de.to_string(),
            category,
            muscle_groups: vec![],
            equipment: None,
            difficulty: Difficulty::Beginner,
            description: String::new(),
            description_de: String::new(),
            instructions: vec![],
            instructions_de: vec![],
            contraindications: vec![],
            is_rehabilitation: false,
            calories_per_minute: None,
        }
    }

    #[derive(Default)]
    pub(crate) struct MockBackend {
        pub plans: HashMap<String, TrainingPlan>,
        pub exercises: Vec<Exercise>,
        pub failing_ids: HashSet<String>,
        pub lookup_delay: Option<Duration>,
        pub fail_submit: bool,
        pub submitted: Mutex<Vec<NewWorkoutLog>>,
        pub in_flight: AtomicUsize,
        pub max_in_flight: AtomicUsize,
    }

    impl WorkoutBackend for MockBackend {
        async fn get_plan(&self, plan_id: &str) -> Result<TrainingPlan, ApiError> {
            self.plans.get(plan_id).cloned().ok_or(ApiError::NotFound {
                detail: "Trainingsplan nicht gefunden".to_string(),
            })
        }

        async fn get_exercise(&self, exercise_id: &str) -> Result<Exercise, ApiError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            if let Some(delay) = self.lookup_delay {
                tokio::time::sleep(delay).await;
            }
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if self.failing_ids.contains(exercise_id) {
                return Err(ApiError::Network("connection reset".to_string()));
            }
            self.exercises
                .iter()
                .find(|ex| ex.id == exercise_id)
                .cloned()
                .ok_or(ApiError::NotFound {
                    detail: "Übung nicht gefunden".to_string(),
                })
        }

        async fn list_exercises(&self, filter: &ExerciseFilter) -> Result<Vec<Exercise>, ApiError> {
            Ok(self
                .exercises
                .iter()
                .filter(|ex| filter.category.map_or(true, |c| ex.category == c))
                .cloned()
                .collect())
        }

        async fn log_workout(&self, log: &NewWorkoutLog) -> Result<WorkoutLog, ApiError> {
            if self.fail_submit {
                return Err(ApiError::Network("timed out".to_string()));
            }
            self.submitted
                .lock()
                .unwrap()
                .push(log.clone());
            Ok(WorkoutLog {
                id: "log-1".to_string(),
                user_id: "u1".to_string(),
                plan_id: log.plan_id.clone(),
                date: log.date.to_string(),
                exercises: log.exercises.clone(),
                duration_minutes: log.duration_minutes,
                notes: None,
                created_at: String::new(),
            })
        }
    }
}
