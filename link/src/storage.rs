//! Durable key/value storage abstraction.
//!
//! The token store and the auth state never touch a concrete storage medium.
//! They receive a [`Persistence`] handle wrapping whatever [`KeyValueStore`]
//! the host provides (a TOML file for the CLI, [`MemoryStore`] in tests), or
//! nothing at all when the process has no persistence context.

use crate::error::{LinkError, Result};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Key holding the bearer access token.
pub const ACCESS_TOKEN_KEY: &str = "access_token";
/// Key holding the refresh token.
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
/// Key holding the JSON-serialized [`User`](crate::models::User).
pub const USER_KEY: &str = "user";

/// Trait for durable string storage backends.
///
/// Methods take `&self` so one backend can be shared between the token store
/// and the auth state; implementations use interior mutability.
///
/// # Security Note
///
/// Implementations hold bearer tokens. Files should use restrictive
/// permissions (0600 on Unix) and values must never be logged.
///
/// # Example Implementation
///
/// ```rust,ignore
/// use medisite_link::storage::KeyValueStore;
///
/// struct KeychainStore;
///
/// impl KeyValueStore for KeychainStore {
///     fn get(&self, key: &str) -> Result<Option<String>> {
///         // Read from the OS keychain
///         Ok(None)
///     }
///
///     fn set(&self, key: &str, value: &str) -> Result<()> {
///         Ok(())
///     }
///
///     fn remove(&self, key: &str) -> Result<()> {
///         Ok(())
///     }
/// }
/// ```
pub trait KeyValueStore: Send + Sync {
    /// Read a value. `Ok(None)` when the key was never written.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a value. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

/// In-memory store for tests and ephemeral sessions.
///
/// ```rust
/// use medisite_link::storage::{KeyValueStore, MemoryStore};
///
/// let store = MemoryStore::new();
/// store.set("access_token", "abc").unwrap();
/// assert_eq!(store.get("access_token").unwrap(), Some("abc".to_string()));
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate the store, mainly for restoring a session in tests.
    pub fn with_values<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: RwLock::new(
                values
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    fn poisoned() -> LinkError {
        LinkError::StorageError("memory store lock poisoned".into())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let values = self.values.read().map_err(|_| Self::poisoned())?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.values.write().map_err(|_| Self::poisoned())?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut values = self.values.write().map_err(|_| Self::poisoned())?;
        values.remove(key);
        Ok(())
    }
}

/// Fail-safe handle over an optional storage backend.
///
/// All operations swallow backend errors (logging them at `warn`) and
/// degrade to "absent", so a broken or missing store can only ever produce
/// an anonymous session.
#[derive(Clone, Default)]
pub struct Persistence {
    backend: Option<Arc<dyn KeyValueStore>>,
}

impl Persistence {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self {
            backend: Some(backend),
        }
    }

    /// No persistence context: reads return `None`, writes are dropped.
    pub fn detached() -> Self {
        Self { backend: None }
    }

    /// Convenience constructor backed by a fresh [`MemoryStore`].
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    pub fn is_available(&self) -> bool {
        self.backend.is_some()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        let backend = self.backend.as_ref()?;
        match backend.get(key) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("[STORAGE] Read of '{}' failed, treating as absent: {}", key, e);
                None
            }
        }
    }

    pub fn set(&self, key: &str, value: &str) {
        let Some(backend) = self.backend.as_ref() else {
            log::debug!("[STORAGE] No persistence context, dropping write of '{}'", key);
            return;
        };
        if let Err(e) = backend.set(key, value) {
            log::warn!("[STORAGE] Write of '{}' failed: {}", key, e);
        }
    }

    pub fn remove(&self, key: &str) {
        let Some(backend) = self.backend.as_ref() else {
            return;
        };
        if let Err(e) = backend.remove(key) {
            log::warn!("[STORAGE] Removal of '{}' failed: {}", key, e);
        }
    }
}

impl std::fmt::Debug for Persistence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Persistence")
            .field("available", &self.is_available())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Backend that fails every call.
    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(LinkError::StorageError("disk unplugged".into()))
        }

        fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(LinkError::StorageError("disk unplugged".into()))
        }

        fn remove(&self, _key: &str) -> Result<()> {
            Err(LinkError::StorageError("disk unplugged".into()))
        }
    }

    #[test]
    fn test_memory_store_basic_operations() {
        let store = MemoryStore::new();
        assert_eq!(store.get("user").unwrap(), None);

        store.set("user", "{}").unwrap();
        assert_eq!(store.get("user").unwrap(), Some("{}".to_string()));

        store.set("user", "{\"id\":1}").unwrap();
        assert_eq!(store.get("user").unwrap(), Some("{\"id\":1}".to_string()));

        store.remove("user").unwrap();
        assert_eq!(store.get("user").unwrap(), None);

        // Removing twice is fine
        store.remove("user").unwrap();
    }

    #[test]
    fn test_detached_persistence_degrades_to_absent() {
        let persistence = Persistence::detached();
        assert!(!persistence.is_available());

        persistence.set(ACCESS_TOKEN_KEY, "token");
        assert_eq!(persistence.get(ACCESS_TOKEN_KEY), None);
        persistence.remove(ACCESS_TOKEN_KEY);
    }

    #[test]
    fn test_broken_backend_never_panics() {
        let persistence = Persistence::new(Arc::new(BrokenStore));
        assert!(persistence.is_available());

        persistence.set(USER_KEY, "{}");
        assert_eq!(persistence.get(USER_KEY), None);
        persistence.remove(USER_KEY);
    }

    #[test]
    fn test_shared_backend_is_visible_through_clones() {
        let persistence = Persistence::in_memory();
        let other = persistence.clone();

        persistence.set(REFRESH_TOKEN_KEY, "r1");
        assert_eq!(other.get(REFRESH_TOKEN_KEY), Some("r1".to_string()));
    }
}
