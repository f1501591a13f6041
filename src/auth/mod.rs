//! Authentication and session persistence.

pub mod session;
pub mod store;

pub use session::{AuthError, AuthSession, AuthState, TOKEN_KEY, USER_KEY};
pub use store::{FileStore, KeyValueStore, KeyringStore, MemoryStore, StoreError};
