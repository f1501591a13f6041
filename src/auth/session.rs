//! Authenticated session with a typed lifecycle.
//!
//! `AuthSession` is owned by the application and passed to whatever needs
//! the signed-in user or the configured client. It starts in `Loading`,
//! becomes `Anonymous` or `Authenticated` after `restore()`, and returns to
//! `Anonymous` on `logout()`.

use thiserror::Error;

use super::store::{KeyValueStore, StoreError};
use crate::api::{Anamnesis, ApiClient, ApiError, AuthResponse, User, UserProfile};

/// Storage key of the bearer token.
pub const TOKEN_KEY: &str = "token";

/// Storage key of the cached user JSON.
pub const USER_KEY: &str = "user";

/// Lifecycle state of the session.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AuthState {
    /// Stored credentials not yet checked
    #[default]
    Loading,
    /// No signed-in user
    Anonymous,
    /// Signed in
    Authenticated { user: User },
}

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Login failed: {0}")]
    LoginFailed(String),

    #[error("Registration failed: {0}")]
    RegistrationFailed(String),

    #[error("Profile update failed: {0}")]
    UpdateFailed(String),

    #[error("Not signed in")]
    NotAuthenticated,

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Reduce an API error to the message shown to the user.
fn failure_message(err: &ApiError, fallback: &str) -> String {
    err.detail()
        .map(str::to_string)
        .unwrap_or_else(|| match err {
            ApiError::Network(_) => format!("{fallback} (network unavailable)"),
            _ => fallback.to_string(),
        })
}

/// Session owning the API client and the credential store.
pub struct AuthSession<S: KeyValueStore> {
    client: ApiClient,
    store: S,
    state: AuthState,
}

impl<S: KeyValueStore> AuthSession<S> {
    /// Create a session in the `Loading` state.
    pub fn new(client: ApiClient, store: S) -> Self {
        Self {
            client,
            store,
            state: AuthState::Loading,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> &AuthState {
        &self.state
    }

    /// Signed-in user, if any.
    pub fn user(&self) -> Option<&User> {
        match &self.state {
            AuthState::Authenticated { user } => Some(user),
            _ => None,
        }
    }

    /// Whether a user is signed in.
    pub fn is_authenticated(&self) -> bool {
        matches!(self.state, AuthState::Authenticated { .. })
    }

    /// API client carrying the session's bearer token.
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Credential store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Rehydrate from the store and revalidate the token with the backend.
    ///
    /// Any revalidation failure clears the stored credentials. Store read
    /// failures leave the session anonymous without touching the store.
    pub async fn restore(&mut self) -> &AuthState {
        let stored = self
            .store
            .get(TOKEN_KEY)
            .and_then(|token| Ok((token, self.store.get(USER_KEY)?)));

        let token = match stored {
            Ok((Some(token), Some(_user))) => token,
            Ok(_) => {
                tracing::debug!("No stored session");
                self.state = AuthState::Anonymous;
                return &self.state;
            }
            Err(e) => {
                tracing::warn!("Could not read stored session: {}", e);
                self.state = AuthState::Anonymous;
                return &self.state;
            }
        };

        self.client.set_token(Some(token));

        match self.client.me().await {
            Ok(user) => {
                if let Err(e) = self.persist_user(&user) {
                    tracing::warn!("Could not cache user: {}", e);
                }
                tracing::info!("Restored session for {}", user.email);
                self.state = AuthState::Authenticated { user };
            }
            Err(e) => {
                tracing::info!("Stored session rejected: {}", e);
                self.clear_credentials();
                self.state = AuthState::Anonymous;
            }
        }

        &self.state
    }

    /// Sign in with email and password.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<&User, AuthError> {
        let response = self
            .client
            .login(email, password)
            .await
            .map_err(|e| AuthError::LoginFailed(failure_message(&e, "Anmeldung fehlgeschlagen")))?;

        self.establish(response)
    }

    /// Create an account and sign in.
    pub async fn register(
        &mut self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<&User, AuthError> {
        let response = self
            .client
            .register(email, password, name)
            .await
            .map_err(|e| {
                AuthError::RegistrationFailed(failure_message(&e, "Registrierung fehlgeschlagen"))
            })?;

        self.establish(response)
    }

    /// Sign out and forget stored credentials.
    pub fn logout(&mut self) -> Result<(), AuthError> {
        self.store.delete(TOKEN_KEY)?;
        self.store.delete(USER_KEY)?;
        self.client.set_token(None);
        self.state = AuthState::Anonymous;
        tracing::info!("Signed out");
        Ok(())
    }

    /// Replace the user's profile and update the cached user.
    pub async fn update_profile(&mut self, profile: &UserProfile) -> Result<&User, AuthError> {
        self.require_auth()?;
        let stored = self.client.update_profile(profile).await.map_err(|e| {
            AuthError::UpdateFailed(failure_message(&e, "Profil-Update fehlgeschlagen"))
        })?;

        self.modify_user(|user| user.profile = Some(stored))
    }

    /// Replace the user's anamnesis and update the cached user.
    pub async fn update_anamnesis(&mut self, anamnesis: &Anamnesis) -> Result<&User, AuthError> {
        self.require_auth()?;
        let stored = self.client.update_anamnesis(anamnesis).await.map_err(|e| {
            AuthError::UpdateFailed(failure_message(&e, "Anamnese-Update fehlgeschlagen"))
        })?;

        self.modify_user(|user| user.anamnesis = Some(stored))
    }

    /// Re-fetch the signed-in user.
    pub async fn refresh_user(&mut self) -> Result<&User, AuthError> {
        self.require_auth()?;
        let user = self.client.me().await?;
        self.persist_user(&user)?;
        self.state = AuthState::Authenticated { user };
        self.user().ok_or(AuthError::NotAuthenticated)
    }

    fn establish(&mut self, response: AuthResponse) -> Result<&User, AuthError> {
        let AuthResponse { token, user } = response;

        self.store.set(TOKEN_KEY, &token)?;
        self.persist_user(&user)?;
        self.client.set_token(Some(token));

        tracing::info!("Signed in as {}", user.email);
        self.state = AuthState::Authenticated { user };
        self.user().ok_or(AuthError::NotAuthenticated)
    }

    fn modify_user(&mut self, apply: impl FnOnce(&mut User)) -> Result<&User, AuthError> {
        let AuthState::Authenticated { user } = &mut self.state else {
            return Err(AuthError::NotAuthenticated);
        };
        apply(user);

        let json = serde_json::to_string(user).map_err(ApiError::from)?;
        self.store.set(USER_KEY, &json)?;
        self.user().ok_or(AuthError::NotAuthenticated)
    }

    fn require_auth(&self) -> Result<(), AuthError> {
        if self.is_authenticated() {
            Ok(())
        } else {
            Err(AuthError::NotAuthenticated)
        }
    }

    fn persist_user(&self, user: &User) -> Result<(), AuthError> {
        let json = serde_json::to_string(user).map_err(ApiError::from)?;
        self.store.set(USER_KEY, &json)?;
        Ok(())
    }

    fn clear_credentials(&mut self) {
        for key in [TOKEN_KEY, USER_KEY] {
            if let Err(e) = self.store.delete(key) {
                tracing::warn!("Could not delete {}: {}", key, e);
            }
        }
        self.client.set_token(None);
    }
}
