//! In-memory workout backend for integration tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use fitex::api::{
    ApiError, Exercise, ExerciseFilter, NewWorkoutLog, TrainingPlan, WorkoutExercise, WorkoutLog,
};
use fitex::catalog::{Category, Difficulty, Goal};
use fitex::workouts::WorkoutBackend;

/// Backend serving fixed plans and exercises and recording submissions.
#[derive(Default)]
pub struct MockBackend {
    pub plans: HashMap<String, TrainingPlan>,
    pub exercises: Vec<Exercise>,
    /// Exercise lookups that fail with a network error
    pub unreachable: HashSet<String>,
    /// Number of submissions to reject before accepting
    pub reject_submissions: Mutex<u32>,
    pub submitted: Mutex<Vec<NewWorkoutLog>>,
}

impl MockBackend {
    /// Backend with one plan `push` and its exercises.
    pub fn with_push_plan() -> Self {
        let mut backend = Self::default();
        backend.exercises = vec![
            exercise("bench", "Bench Press", "Bankdrücken", Category::Strength),
            exercise("dips", "Dips", "Dips", Category::Bodyweight),
            exercise("pushup", "Push-up", "Liegestütz", Category::Bodyweight),
        ];

        let mut bench = WorkoutExercise::new("bench");
        bench.sets = 2;
        bench.reps = Some(8);
        bench.weight_kg = Some(60.0);
        bench.rest_seconds = 5;
        let mut dips = WorkoutExercise::new("dips");
        dips.sets = 1;
        dips.rest_seconds = 5;

        backend.plans.insert(
            "push".to_string(),
            TrainingPlan {
                id: "push".to_string(),
                user_id: "u1".to_string(),
                name: "Push Day".to_string(),
                description: None,
                goal: Goal::MuscleGain,
                exercises: vec![bench, dips],
                days_per_week: 3,
                duration_weeks: 4,
                is_ai_generated: false,
                created_at: String::new(),
            },
        );
        backend
    }

    pub fn submissions(&self) -> Vec<NewWorkoutLog> {
        self.submitted.lock().unwrap().clone()
    }
}

pub fn exercise(id: &str, name: &str, name_de: &str, category: Category) -> Exercise {
    Exercise {
        id: id.to_string(),
        name: name.to_string(),
        name_de: name_de.to_string(),
        category,
        muscle_groups: vec![],
        equipment: None,
        difficulty: Difficulty::Intermediate,
        description: String::new(),
        description_de: String::new(),
        instructions: vec![],
        instructions_de: vec![],
        contraindications: vec![],
        is_rehabilitation: false,
        calories_per_minute: None,
    }
}

impl WorkoutBackend for MockBackend {
    async fn get_plan(&self, plan_id: &str) -> Result<TrainingPlan, ApiError> {
        self.plans.get(plan_id).cloned().ok_or(ApiError::NotFound {
            detail: "Trainingsplan nicht gefunden".to_string(),
        })
    }

    async fn get_exercise(&self, exercise_id: &str) -> Result<Exercise, ApiError> {
        if self.unreachable.contains(exercise_id) {
            return Err(ApiError::Network("connection refused".to_string()));
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
        {
            let mut rejections = self.reject_submissions.lock().unwrap();
            if *rejections > 0 {
                *rejections -= 1;
                return Err(ApiError::Server {
                    status: 500,
                    detail: "Internal Server Error".to_string(),
                });
            }
        }

        self.submitted.lock().unwrap().push(log.clone());
        Ok(WorkoutLog {
            id: format!("log-{}", self.submitted.lock().unwrap().len()),
            user_id: "u1".to_string(),
            plan_id: log.plan_id.clone(),
            date: log.date.to_string(),
            exercises: log.exercises.clone(),
            duration_minutes: log.duration_minutes,
            notes: log.notes.clone(),
            created_at: String::new(),
        })
    }
}
