//! Integration tests for session persistence with the file store.

use std::time::Duration;

use fitex::api::ApiClient;
use fitex::auth::{AuthSession, AuthState, FileStore, KeyValueStore, TOKEN_KEY, USER_KEY};
use tempfile::TempDir;

fn offline_client() -> ApiClient {
    ApiClient::with_base_url("http://127.0.0.1:9/api", Duration::from_secs(2)).unwrap()
}

#[tokio::test]
async fn test_rejected_session_is_removed_from_disk() {
    let dir = TempDir::new().unwrap();
    let store = FileStore::in_dir(dir.path());
    store.set(TOKEN_KEY, "expired-token").unwrap();
    store
        .set(USER_KEY, r#"{"id":"u1","email":"max@example.de","name":"Max"}"#)
        .unwrap();

    let mut session = AuthSession::new(offline_client(), FileStore::in_dir(dir.path()));
    session.restore().await;
    assert_eq!(session.state(), &AuthState::Anonymous);

    let reopened = FileStore::in_dir(dir.path());
    assert_eq!(reopened.get(TOKEN_KEY).unwrap(), None);
    assert_eq!(reopened.get(USER_KEY).unwrap(), None);
}

#[tokio::test]
async fn test_logout_then_restore_stays_anonymous() {
    let dir = TempDir::new().unwrap();
    let mut session = AuthSession::new(offline_client(), FileStore::in_dir(dir.path()));
    session.store().set(TOKEN_KEY, "token").unwrap();
    session.store().set(USER_KEY, "{}").unwrap();

    session.logout().unwrap();

    let mut restored = AuthSession::new(offline_client(), FileStore::in_dir(dir.path()));
    restored.restore().await;
    assert!(!restored.is_authenticated());
    assert!(restored.client().token().is_none());
}
