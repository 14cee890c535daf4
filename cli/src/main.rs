//! Medisite CLI - Admin terminal client for the hospital CMS
//!
//! # Usage
//!
//! ```bash
//! # Sign in (prompts for the password)
//! medisite login --email admin@hospital.test
//!
//! # Browse content
//! medisite list blogs --status active --search heart
//! medisite show doctors 12 --json
//!
//! # Manage content
//! medisite create blogs --field title="Open day" --field content="..." --file image=cover.jpg
//! medisite update installment-rules 3 --field months:=12
//! medisite delete galleries 9
//! ```

use clap::Parser;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use medisite_cli::{
    CLIConfiguration, CLIError, CLISession, Command, FileStore, OutputFormat, OutputFormatter,
    Result, SessionOptions,
};
use medisite_link::{LinkTimeouts, Persistence};

mod args;

use args::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();

    let stderr_formatter = OutputFormatter::new(OutputFormat::Table, !cli.no_color);
    match run(cli).await {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
        }
        Err(e) => {
            eprintln!("{}", stderr_formatter.error(&e.to_string()));
            std::process::exit(e.exit_code());
        }
    }
}

async fn run(cli: Cli) -> Result<String> {
    let config = CLIConfiguration::load(&cli.config)?;
    let options = resolve_options(&cli, &config)?;

    let session_path = cli
        .session_file
        .clone()
        .unwrap_or_else(|| config.session_path());
    let store = FileStore::open(session_path).map_err(CLIError::LinkError)?;
    log::debug!("[CLI] Session file {}", store.path().display());

    let session = CLISession::new(options, Persistence::new(Arc::new(store)))?;

    let command = match cli.command {
        Command::Login { email, password } => {
            let email = match email {
                Some(email) => email,
                None => prompt("Email: ")?,
            };
            let password = match password {
                Some(password) => password,
                None => rpassword::prompt_password("Password: ")
                    .map_err(|e| CLIError::FileError(format!("Failed to read password: {}", e)))?,
            };
            Command::Login {
                email: Some(email),
                password: Some(password),
            }
        }
        other => other,
    };

    session.execute(command).await
}

/// Flags override the config file.
fn resolve_options(cli: &Cli, config: &CLIConfiguration) -> Result<SessionOptions> {
    let ui = config.resolved_ui();
    let format = if cli.json {
        OutputFormat::Json
    } else if let Some(format) = cli.format {
        format
    } else {
        ui.format.parse()?
    };

    let timeouts = match cli.timeout {
        Some(secs) => LinkTimeouts::builder()
            .request_timeout(Duration::from_secs(secs))
            .build(),
        None => config.timeouts(),
    };

    Ok(SessionOptions {
        server_url: cli.url.clone().unwrap_or_else(|| config.server_url()),
        timeouts,
        cache: config.cache_config(),
        format,
        color: ui.color && !cli.no_color,
    })
}

fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut input = String::new();
    let read = io::stdin().read_line(&mut input)?;
    if read == 0 {
        return Err(CLIError::Cancelled);
    }
    Ok(input.trim().to_string())
}
