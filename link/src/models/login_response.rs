use serde::{Deserialize, Serialize};

use super::user::User;
use crate::token_store::TokenPair;

/// `data` of a successful `POST /login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Authenticated user information
    pub user: User,
    /// Bearer token for subsequent API calls
    pub access_token: String,
    /// Longer-lived token; stored but never exchanged by this client
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Token type reported by the server, normally "Bearer"
    #[serde(default)]
    pub token_type: Option<String>,
}

impl LoginResponse {
    pub fn token_pair(&self) -> TokenPair {
        TokenPair::new(self.access_token.clone(), self.refresh_token.clone())
    }
}
