use clap::Parser;
use medisite_cli::config::DEFAULT_CONFIG_PATH;
use medisite_cli::{Command, OutputFormat};
use std::path::PathBuf;

// Macro to create the version string at compile time
macro_rules! version_string {
    () => {
        concat!(
            env!("CARGO_PKG_VERSION"),
            "\nCommit: ",
            env!("GIT_COMMIT_HASH"),
            " (",
            env!("GIT_BRANCH"),
            ")"
        )
    };
}

/// Medisite CLI - Admin terminal client for the hospital CMS
#[derive(Parser, Debug)]
#[command(name = "medisite")]
#[command(author = "Medisite Team")]
#[command(version = version_string!())]
#[command(about = "Manage Medisite CMS content from the terminal", long_about = None)]
pub struct Cli {
    /// API base address (e.g., http://localhost:8000/api)
    #[arg(short = 'u', long = "url", env = "MEDISITE_URL", global = true)]
    pub url: Option<String>,

    /// HTTP request timeout in seconds (default: from config, 30)
    #[arg(long = "timeout", value_name = "SECONDS", global = true)]
    pub timeout: Option<u64>,

    /// Configuration file path
    #[arg(long = "config", default_value = DEFAULT_CONFIG_PATH, global = true)]
    pub config: PathBuf,

    /// Session file path (default: from config)
    #[arg(long = "session-file", env = "MEDISITE_SESSION_FILE", global = true)]
    pub session_file: Option<PathBuf>,

    /// Output format (default: from config, table)
    #[arg(long = "format", global = true)]
    pub format: Option<OutputFormat>,

    /// Enable JSON output (shorthand for --format=json)
    #[arg(long = "json", conflicts_with = "format", global = true)]
    pub json: bool,

    /// Disable colored output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Enable verbose logging
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}
