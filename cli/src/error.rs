//! Error types for medisite-cli
//!
//! Provides user-facing messages for the failures an admin runs into at the
//! terminal: bad flags, missing sessions, and whatever the CMS answered.

use medisite_link::LinkError;
use std::fmt;

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CLIError>;

/// Errors that can occur in the CLI
#[derive(Debug)]
pub enum CLIError {
    /// Error from the medisite-link library
    LinkError(LinkError),

    /// Configuration file error
    ConfigurationError(String),

    /// File I/O error
    FileError(String),

    /// No session, or the server rejected the stored token
    Unauthorized(String),

    /// Signed in without the privilege the command needs
    Forbidden(String),

    /// Invalid command arguments
    ParseError(String),

    /// User cancelled operation
    Cancelled,
}

impl CLIError {
    fn format_link_error(err: &LinkError) -> String {
        match err {
            LinkError::NetworkError(msg) => {
                format!("Cannot reach server: {}", Self::clean_nested_message(msg))
            }
            LinkError::TimeoutError(msg) => format!("Request timed out: {}", msg),
            LinkError::ServerError {
                status_code,
                message,
            } => format!("Server error ({}): {}", status_code, message),
            LinkError::MalformedResponse(msg) => {
                format!("Unexpected response from server: {}", msg)
            }
            LinkError::AuthenticationError(msg) => format!("Login failed: {}", msg),
            LinkError::SerializationError(msg)
            | LinkError::ConfigurationError(msg)
            | LinkError::StorageError(msg) => msg.clone(),
            LinkError::Cancelled => "Operation cancelled".to_string(),
        }
    }

    fn clean_nested_message(message: &str) -> String {
        let mut cleaned = message.trim();
        let prefixes = [
            "Connection failed:",
            "connection failed:",
            "Network error:",
            "network error:",
        ];

        loop {
            let mut stripped = false;
            for prefix in &prefixes {
                if let Some(rest) = cleaned.strip_prefix(prefix) {
                    cleaned = rest.trim_start();
                    stripped = true;
                    break;
                }
            }

            if !stripped {
                break;
            }
        }

        cleaned.to_string()
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CLIError::Unauthorized(_) | CLIError::Forbidden(_) => 3,
            CLIError::ParseError(_) => 2,
            CLIError::Cancelled => 130,
            _ => 1,
        }
    }
}

impl fmt::Display for CLIError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CLIError::LinkError(e) => write!(f, "{}", Self::format_link_error(e)),
            CLIError::ConfigurationError(msg) => write!(f, "Configuration error: {}", msg),
            CLIError::FileError(msg) => write!(f, "File error: {}", msg),
            CLIError::Unauthorized(msg) => write!(f, "Not signed in: {}", msg),
            CLIError::Forbidden(msg) => write!(f, "Permission denied: {}", msg),
            CLIError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            CLIError::Cancelled => write!(f, "Operation cancelled"),
        }
    }
}

impl std::error::Error for CLIError {}

impl From<LinkError> for CLIError {
    fn from(err: LinkError) -> Self {
        if err.is_unauthorized() {
            return CLIError::Unauthorized(
                "the server rejected the stored session, run `medisite login`".to_string(),
            );
        }
        CLIError::LinkError(err)
    }
}

impl From<std::io::Error> for CLIError {
    fn from(err: std::io::Error) -> Self {
        CLIError::FileError(err.to_string())
    }
}

impl From<toml::de::Error> for CLIError {
    fn from(err: toml::de::Error) -> Self {
        CLIError::ConfigurationError(format!("TOML parse error: {}", err))
    }
}
