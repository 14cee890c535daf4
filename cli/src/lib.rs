//! Library entry point for medisite-cli components.
//!
//! Exposes the session, formatter, config and storage modules so integration
//! tests can drive commands without going through the binary entry point.

pub mod commands;
pub mod config;
pub mod error;
pub mod formatter;
pub mod resources;
pub mod session;
pub mod store;

pub use commands::Command;
pub use config::CLIConfiguration;
pub use error::{CLIError, Result};
pub use formatter::{OutputFormat, OutputFormatter};
pub use session::{CLISession, SessionOptions};
pub use store::FileStore;

/// CLI version
pub const CLI_VERSION: &str = env!("CARGO_PKG_VERSION");
