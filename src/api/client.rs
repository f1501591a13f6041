//! HTTP client for the Fitex backend.
//!
//! One configured `reqwest::Client` per application with a base URL, a
//! request timeout and an optional bearer token.

use std::time::Duration;

use reqwest::{Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::types::{
    Anamnesis, AnamnesisUpdate, ApiError, AuthResponse, CategoryCatalog, Exercise,
    ExerciseFilter, ExerciseProgressEntry, GeneratePlanRequest, HealthStatus, LoginRequest,
    NewTrainingPlan, NewWorkoutLog, ProfileUpdate, RegisterRequest, TrainingPlan, User,
    UserProfile, WorkoutLog, WorkoutStats,
};
use crate::storage::config::ApiSettings;

/// Timeout for the health probe, independent of the configured timeout.
const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

/// Backend API client.
#[derive(Debug, Clone)]
pub struct ApiClient {
    /// HTTP client
    http: reqwest::Client,
    /// Base URL, including the `/api` prefix
    base_url: Url,
    /// Bearer token of the signed-in user
    token: Option<String>,
}

impl ApiClient {
    /// Create a client from configuration.
    pub fn new(settings: &ApiSettings) -> Result<Self, ApiError> {
        Self::with_base_url(&settings.base_url, settings.timeout())
    }

    /// Create a client for a base URL and timeout.
    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ApiError::InvalidRequest(format!("bad base URL {base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidRequest(format!(
                "bad base URL {base_url}: not a hierarchical URL"
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;

        Ok(Self {
            http,
            base_url,
            token: None,
        })
    }

    /// Base URL requests are resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Set or clear the bearer token.
    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    /// Current bearer token.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Build an endpoint URL from path segments. Segments are percent-encoded.
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        let url = self.endpoint(segments);
        tracing::debug!("{} {}", method, url);

        let builder = self.http.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send a request and decode a JSON response.
    async fn send<R: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<R, ApiError> {
        let response = builder.send().await.map_err(network_error)?;
        let status = response.status();
        let body = response.text().await.map_err(network_error)?;

        if !status.is_success() {
            return Err(error_from_response(status, &body));
        }

        serde_json::from_str(&body).map_err(ApiError::from)
    }

    /// Send a request whose response body is irrelevant.
    async fn send_empty(&self, builder: RequestBuilder) -> Result<(), ApiError> {
        let response = builder.send().await.map_err(network_error)?;
        let status = response.status();

        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(error_from_response(status, &body))
        }
    }

    async fn get<R: DeserializeOwned>(&self, segments: &[&str]) -> Result<R, ApiError> {
        self.send(self.request(Method::GET, segments)).await
    }

    async fn post<B: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<R, ApiError> {
        self.send(self.request(Method::POST, segments).json(body)).await
    }

    async fn put<B: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<R, ApiError> {
        self.send(self.request(Method::PUT, segments).json(body)).await
    }

    // Exercises

    /// List catalog exercises matching a filter.
    pub async fn list_exercises(&self, filter: &ExerciseFilter) -> Result<Vec<Exercise>, ApiError> {
        let builder = self.request(Method::GET, &["exercises"]).query(filter);
        self.send(builder).await
    }

    /// Fetch one exercise.
    pub async fn get_exercise(&self, id: &str) -> Result<Exercise, ApiError> {
        self.get(&["exercises", id]).await
    }

    /// Fetch the category, muscle-group and difficulty listing.
    pub async fn get_categories(&self) -> Result<CategoryCatalog, ApiError> {
        self.get(&["exercises", "categories", "list"]).await
    }

    // Training plans

    /// List the user's plans.
    pub async fn list_plans(&self) -> Result<Vec<TrainingPlan>, ApiError> {
        self.get(&["plans"]).await
    }

    /// Fetch one plan.
    pub async fn get_plan(&self, id: &str) -> Result<TrainingPlan, ApiError> {
        self.get(&["plans", id]).await
    }

    /// Create a plan.
    pub async fn create_plan(&self, plan: &NewTrainingPlan) -> Result<TrainingPlan, ApiError> {
        plan.validate()?;
        let created: TrainingPlan = self.post(&["plans"], plan).await?;
        tracing::info!("Created plan {}", created.id);
        Ok(created)
    }

    /// Replace a plan.
    pub async fn update_plan(
        &self,
        id: &str,
        plan: &NewTrainingPlan,
    ) -> Result<TrainingPlan, ApiError> {
        plan.validate()?;
        self.put(&["plans", id], plan).await
    }

    /// Delete a plan.
    pub async fn delete_plan(&self, id: &str) -> Result<(), ApiError> {
        self.send_empty(self.request(Method::DELETE, &["plans", id]))
            .await?;
        tracing::info!("Deleted plan {}", id);
        Ok(())
    }

    /// Ask the backend to generate a plan for the user's profile.
    pub async fn generate_plan(
        &self,
        request: &GeneratePlanRequest,
    ) -> Result<TrainingPlan, ApiError> {
        self.post(&["plans", "generate"], request).await
    }

    // Workout logs

    /// List logged workouts, newest first.
    pub async fn list_workouts(
        &self,
        limit: Option<u32>,
        skip: Option<u32>,
    ) -> Result<Vec<WorkoutLog>, ApiError> {
        let mut builder = self.request(Method::GET, &["workouts"]);
        if let Some(limit) = limit {
            builder = builder.query(&[("limit", limit)]);
        }
        if let Some(skip) = skip {
            builder = builder.query(&[("skip", skip)]);
        }
        self.send(builder).await
    }

    /// Submit a finished workout.
    pub async fn log_workout(&self, log: &NewWorkoutLog) -> Result<WorkoutLog, ApiError> {
        self.post(&["workouts"], log).await
    }

    /// Fetch aggregated statistics.
    pub async fn get_workout_stats(&self) -> Result<WorkoutStats, ApiError> {
        self.get(&["workouts", "stats"]).await
    }

    /// Fetch the history of one exercise across all logs.
    pub async fn get_exercise_progress(
        &self,
        exercise_id: &str,
    ) -> Result<Vec<ExerciseProgressEntry>, ApiError> {
        self.get(&["progress", "exercise", exercise_id]).await
    }

    // Authentication

    /// Sign in with email and password.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        self.post(&["auth", "login"], &LoginRequest { email, password })
            .await
    }

    /// Create an account.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<AuthResponse, ApiError> {
        self.post(
            &["auth", "register"],
            &RegisterRequest {
                email,
                password,
                name,
            },
        )
        .await
    }

    /// Fetch the user the current token belongs to.
    pub async fn me(&self) -> Result<User, ApiError> {
        self.get(&["auth", "me"]).await
    }

    /// Replace the user's profile. Returns the stored profile including BMI.
    pub async fn update_profile(&self, profile: &UserProfile) -> Result<UserProfile, ApiError> {
        let update: ProfileUpdate = self.put(&["auth", "profile"], profile).await?;
        Ok(update.profile)
    }

    /// Replace the user's anamnesis.
    pub async fn update_anamnesis(&self, anamnesis: &Anamnesis) -> Result<Anamnesis, ApiError> {
        let update: AnamnesisUpdate = self.put(&["auth", "anamnesis"], anamnesis).await?;
        Ok(update.anamnesis)
    }

    /// Check API health.
    pub async fn health_check(&self) -> Result<HealthStatus, ApiError> {
        let builder = self.request(Method::GET, &["health"]).timeout(HEALTH_TIMEOUT);
        self.send(builder).await
    }
}

fn network_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::Network(format!("request timed out: {err}"))
    } else {
        ApiError::Network(err.to_string())
    }
}

/// Map a non-success response to an error, extracting the backend's `detail`.
pub(crate) fn error_from_response(status: StatusCode, body: &str) -> ApiError {
    let detail = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| match value.get("detail") {
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
            None => None,
        })
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string()
        });

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Unauthorized { detail },
        StatusCode::NOT_FOUND => ApiError::NotFound { detail },
        _ => ApiError::Server {
            status: status.as_u16(),
            detail,
        },
    }
}
