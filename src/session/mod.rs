//! Client-side session storage. The store is an injected key/value capability
//! so the signup flow and loan calls can run against a durable file in the CLI
//! and an in-memory fake in tests. Writes are last-writer-wins.
//!
//! Two well-known keys are used: the pending signup (non-secret profile fields
//! only) and the bearer token of the active session.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use secrecy::{ExposeSecret, SecretString};
use std::{fmt, path::PathBuf};
use thiserror::Error;

/// Key holding the serialized pending signup.
pub const PENDING_SIGNUP_KEY: &str = "signupData";
/// Key holding the opaque bearer token.
pub const SESSION_TOKEN_KEY: &str = "token";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("session store I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("session store contains invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("session store lock poisoned")]
    Poisoned,
}

/// Durable key/value storage surviving restarts.
pub trait SessionStore: Send + Sync {
    /// # Errors
    /// Returns an error if the backing storage cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// # Errors
    /// Returns an error if the backing storage cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Removing a missing key is not an error.
    /// # Errors
    /// Returns an error if the backing storage cannot be written.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

impl<S: SessionStore + ?Sized> SessionStore for std::sync::Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

/// Authenticated identity after OTP verification.
#[derive(Clone)]
pub struct Session {
    token: SecretString,
}

impl Session {
    #[must_use]
    pub fn new(token: SecretString) -> Self {
        Self { token }
    }

    #[must_use]
    pub fn token(&self) -> &SecretString {
        &self.token
    }

    /// Reads the active session; blank tokens count as no session.
    /// # Errors
    /// Returns an error if the store cannot be read.
    pub fn load(store: &impl SessionStore) -> Result<Option<Self>, StoreError> {
        Ok(store
            .get(SESSION_TOKEN_KEY)?
            .filter(|token| !token.trim().is_empty())
            .map(|token| Self::new(SecretString::from(token))))
    }

    /// Stores the token, replacing any previous session.
    /// # Errors
    /// Returns an error if the store cannot be written.
    pub fn save(&self, store: &impl SessionStore) -> Result<(), StoreError> {
        store.set(SESSION_TOKEN_KEY, self.token.expose_secret())
    }

    /// # Errors
    /// Returns an error if the store cannot be written.
    pub fn clear(store: &impl SessionStore) -> Result<(), StoreError> {
        store.remove(SESSION_TOKEN_KEY)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session").field("token", &"***").finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn session_round_trip_through_store() {
        let store = MemoryStore::new();
        assert!(Session::load(&store).unwrap().is_none());

        Session::new(SecretString::from("abc".to_string()))
            .save(&store)
            .unwrap();
        let loaded = Session::load(&store).unwrap().unwrap();
        assert_eq!(loaded.token().expose_secret(), "abc");

        Session::clear(&store).unwrap();
        assert!(Session::load(&store).unwrap().is_none());
    }

    #[test]
    fn blank_token_is_no_session() {
        let store = MemoryStore::new();
        store.set(SESSION_TOKEN_KEY, "   ").unwrap();
        assert!(Session::load(&store).unwrap().is_none());
    }

    #[test]
    fn session_debug_is_redacted() {
        let session = Session::new(SecretString::from("abc".to_string()));
        assert_eq!(format!("{session:?}"), r#"Session { token: "***" }"#);
    }
}
