//! Access/refresh token persistence.
//!
//! A thin wrapper over [`Persistence`]. No expiry checks happen here: a stale
//! token is only discovered when the server answers 401.

use crate::storage::{Persistence, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
use serde::{Deserialize, Serialize};

/// Bearer credentials issued at login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl TokenPair {
    pub fn new(access_token: impl Into<String>, refresh_token: Option<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token,
        }
    }
}

/// Reads and writes the token pair in durable storage.
///
/// Cloning is cheap; clones share the same backend.
#[derive(Debug, Clone, Default)]
pub struct TokenStore {
    persistence: Persistence,
}

impl TokenStore {
    pub fn new(persistence: Persistence) -> Self {
        Self { persistence }
    }

    pub fn get_access_token(&self) -> Option<String> {
        self.persistence.get(ACCESS_TOKEN_KEY)
    }

    pub fn get_refresh_token(&self) -> Option<String> {
        self.persistence.get(REFRESH_TOKEN_KEY)
    }

    pub fn set_access_token(&self, token: &str) {
        log::debug!("[TOKENS] Storing access token");
        self.persistence.set(ACCESS_TOKEN_KEY, token);
    }

    pub fn set_refresh_token(&self, token: &str) {
        log::debug!("[TOKENS] Storing refresh token");
        self.persistence.set(REFRESH_TOKEN_KEY, token);
    }

    /// Store the access token and, when given, the refresh token.
    ///
    /// A `None` refresh token leaves any previously stored one in place.
    pub fn set_tokens(&self, access: &str, refresh: Option<&str>) {
        self.set_access_token(access);
        if let Some(refresh) = refresh {
            self.set_refresh_token(refresh);
        }
    }

    pub fn set_pair(&self, pair: &TokenPair) {
        self.set_tokens(&pair.access_token, pair.refresh_token.as_deref());
    }

    pub fn clear_tokens(&self) {
        log::debug!("[TOKENS] Clearing stored tokens");
        self.persistence.remove(ACCESS_TOKEN_KEY);
        self.persistence.remove(REFRESH_TOKEN_KEY);
    }

    pub fn has_token(&self) -> bool {
        self.get_access_token().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get_tokens() {
        let store = TokenStore::new(Persistence::in_memory());
        assert!(!store.has_token());
        assert_eq!(store.get_access_token(), None);
        assert_eq!(store.get_refresh_token(), None);

        store.set_tokens("access-1", Some("refresh-1"));
        assert!(store.has_token());
        assert_eq!(store.get_access_token().as_deref(), Some("access-1"));
        assert_eq!(store.get_refresh_token().as_deref(), Some("refresh-1"));
    }

    #[test]
    fn test_set_tokens_without_refresh_keeps_previous_refresh() {
        let store = TokenStore::new(Persistence::in_memory());
        store.set_tokens("access-1", Some("refresh-1"));
        store.set_tokens("access-2", None);

        assert_eq!(store.get_access_token().as_deref(), Some("access-2"));
        assert_eq!(store.get_refresh_token().as_deref(), Some("refresh-1"));
    }

    #[test]
    fn test_clear_tokens_removes_both() {
        let store = TokenStore::new(Persistence::in_memory());
        store.set_pair(&TokenPair::new("a", Some("r".into())));
        store.clear_tokens();

        assert!(!store.has_token());
        assert_eq!(store.get_refresh_token(), None);
    }

    #[test]
    fn test_refresh_token_alone_is_not_a_session() {
        let store = TokenStore::new(Persistence::in_memory());
        store.set_refresh_token("r");
        assert!(!store.has_token());
    }

    #[test]
    fn test_detached_store_fails_safe() {
        let store = TokenStore::new(Persistence::detached());
        store.set_tokens("a", Some("r"));
        assert!(!store.has_token());
        assert_eq!(store.get_refresh_token(), None);
        store.clear_tokens();
    }
}
