//! Unit tests for decoding backend payloads.

use fitex::api::{Exercise, TrainingPlan, User, WorkoutStats};
use fitex::catalog::{BmiClass, Category, Difficulty, ExperienceLevel, Gender, Goal, Joint};

#[test]
fn test_decode_exercise() {
    let json = r#"{
        "id": "ex_squat",
        "name": "Squat",
        "name_de": "Kniebeuge",
        "category": "strength",
        "muscle_groups": ["quadriceps", "glutes"],
        "equipment": null,
        "difficulty": "beginner",
        "description": "Lower body compound movement",
        "description_de": "Grundübung für die Beine",
        "instructions": ["Stand hip-width", "Lower hips"],
        "instructions_de": ["Hüftbreit stehen", "Hüfte absenken"],
        "contraindications": ["acute knee injury"],
        "is_rehabilitation": false,
        "calories_per_minute": 6.5
    }"#;

    let exercise: Exercise = serde_json::from_str(json).unwrap();
    assert_eq!(exercise.category, Category::Strength);
    assert_eq!(exercise.difficulty, Difficulty::Beginner);
    assert_eq!(exercise.instructions_de.len(), 2);
    assert_eq!(exercise.calories_per_minute, Some(6.5));
}

#[test]
fn test_decode_exercise_rejects_unknown_category() {
    let json = r#"{
        "id": "x", "name": "X", "name_de": "X",
        "category": "yoga", "difficulty": "beginner"
    }"#;
    assert!(serde_json::from_str::<Exercise>(json).is_err());
}

#[test]
fn test_decode_generated_plan() {
    let json = r#"{
        "id": "p9",
        "user_id": "u1",
        "name": "Reha Knie",
        "description": "Sanfter Aufbau",
        "goal": "rehabilitation",
        "exercises": [
            {"exercise_id": "ex_bridge", "sets": 2, "reps": 15, "rest_seconds": 45},
            {"exercise_id": "ex_plank", "reps": null, "duration_seconds": 30}
        ],
        "days_per_week": 2,
        "duration_weeks": 6,
        "is_ai_generated": true,
        "created_at": "2026-02-01T09:30:00"
    }"#;

    let plan: TrainingPlan = serde_json::from_str(json).unwrap();
    assert_eq!(plan.goal, Goal::Rehabilitation);
    assert!(plan.is_ai_generated);
    assert_eq!(plan.exercises[0].rest_seconds, 45);
    assert_eq!(plan.exercises[1].sets, 3);
    assert_eq!(plan.exercises[1].reps, None);
    assert_eq!(plan.exercises[1].duration_seconds, Some(30));
    assert_eq!(plan.exercises[1].rest_seconds, 60);
}

#[test]
fn test_decode_user_with_health_data() {
    let json = r#"{
        "id": "u1",
        "email": "lena@example.de",
        "name": "Lena",
        "profile": {
            "weight": 68.0,
            "height": 172.0,
            "age": 34,
            "gender": "female",
            "fitness_goal": "endurance",
            "experience_level": "intermediate",
            "bmi": 23.0
        },
        "anamnesis": {
            "heart_conditions": false,
            "high_blood_pressure": false,
            "diabetes": false,
            "joint_problems": ["knee", "back"],
            "other_conditions": null,
            "medications": null,
            "physical_limitations": null
        },
        "created_at": "2026-01-10T12:00:00"
    }"#;

    let user: User = serde_json::from_str(json).unwrap();
    let profile = user.profile.unwrap();
    assert_eq!(profile.gender, Some(Gender::Female));
    assert_eq!(profile.experience_level, Some(ExperienceLevel::Intermediate));
    assert_eq!(profile.bmi_class(), Some(BmiClass::Normal));

    let anamnesis = user.anamnesis.unwrap();
    assert_eq!(anamnesis.joint_problems, vec![Joint::Knee, Joint::Back]);
    assert!(anamnesis.has_findings());
}

#[test]
fn test_decode_stats_chart_window() {
    let days: Vec<String> = (1..=10)
        .map(|d| format!(r#"{{"date":"2026-03-{d:02}","workouts":1,"duration":{}}}"#, d * 5))
        .collect();
    let json = format!(
        r#"{{"total_workouts":10,"total_duration_minutes":275,"workouts_this_week":4,
            "workouts_this_month":10,"streak_days":10,"progress_data":[{}]}}"#,
        days.join(",")
    );

    let stats: WorkoutStats = serde_json::from_str(&json).unwrap();
    let week = stats.last_days(7);
    assert_eq!(week.len(), 7);
    assert_eq!(week[0].date, "2026-03-04");
    assert_eq!(stats.max_duration(7), 50);

    let empty = WorkoutStats::default();
    assert!(empty.last_days(7).is_empty());
    assert_eq!(empty.max_duration(7), 1);
}
