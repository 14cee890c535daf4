//! Error types for medisite-link.
//!
//! Every failure the data layer can surface to a caller is a [`LinkError`].
//! The type is `Clone` because a single de-duplicated fetch may have to hand
//! the same failure to several waiting subscribers.

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, LinkError>;

/// Errors produced by the API client, cache and session layers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LinkError {
    /// Connection refused, DNS failure, reset stream, ...
    #[error("Network error: {0}")]
    NetworkError(String),

    /// The transport gave up waiting for the server.
    #[error("Request timed out: {0}")]
    TimeoutError(String),

    /// The server answered with a non-2xx status, or with `success: false`.
    #[error("Server error ({status_code}): {message}")]
    ServerError { status_code: u16, message: String },

    /// A 2xx response whose body is not a valid envelope.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// A request payload or cached value could not be (de)serialized.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Invalid client configuration (missing base URL, bad TLS setup, ...).
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// The persistence backend failed. Only surfaced by backends themselves;
    /// the token store and auth state swallow it.
    #[error("Storage error: {0}")]
    StorageError(String),

    /// Login rejected or an operation requiring a session was attempted
    /// without one.
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// The in-flight request was dropped before it produced a result.
    #[error("Operation cancelled")]
    Cancelled,
}

impl LinkError {
    /// HTTP status code carried by the error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::ServerError { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }

    /// True for 401 responses, the only signal that a stored token went stale.
    pub fn is_unauthorized(&self) -> bool {
        self.status_code() == Some(401)
    }
}

impl From<reqwest::Error> for LinkError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LinkError::TimeoutError(err.to_string())
        } else if err.is_decode() {
            LinkError::MalformedResponse(err.to_string())
        } else if err.is_builder() {
            LinkError::ConfigurationError(err.to_string())
        } else {
            LinkError::NetworkError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for LinkError {
    fn from(err: serde_json::Error) -> Self {
        LinkError::SerializationError(err.to_string())
    }
}
