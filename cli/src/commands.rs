//! Subcommands and their argument parsing.
//!
//! Record fields are passed as repeated `--field key=value` flags (always a
//! string) or `--field key:=json` (a raw JSON value such as `months:=12` or
//! `featured:=true`). Files are attached with `--file key=path`, which turns
//! the request into a multipart upload.

use clap::Subcommand;
use medisite_link::models::Status;
use medisite_link::{FileUpload, FormPayload, FormValue, ListParams};
use serde_json::Value as JsonValue;
use std::path::Path;

use crate::error::{CLIError, Result};

#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum Command {
    /// Sign in and store the session (prompts for missing credentials)
    Login {
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        password: Option<String>,
    },

    /// Sign out and forget the stored session
    Logout,

    /// Show the signed-in account as the server currently sees it
    Whoami,

    /// List one page of a resource
    List {
        /// blogs, directors, galleries, installment-rules, contact-messages,
        /// page-banners, doctors, news, careers
        resource: String,
        #[arg(long, default_value_t = 1)]
        page: u64,
        #[arg(long = "per-page", default_value_t = 10)]
        per_page: u64,
        #[arg(long)]
        status: Option<Status>,
        #[arg(long)]
        search: Option<String>,
    },

    /// Show one record
    Show { resource: String, id: i64 },

    /// Create a record (admin)
    Create {
        resource: String,
        #[arg(long = "field", value_name = "KEY=VALUE")]
        fields: Vec<String>,
        #[arg(long = "file", value_name = "KEY=PATH")]
        files: Vec<String>,
    },

    /// Update the given fields of a record (admin)
    Update {
        resource: String,
        id: i64,
        #[arg(long = "field", value_name = "KEY=VALUE")]
        fields: Vec<String>,
        #[arg(long = "file", value_name = "KEY=PATH")]
        files: Vec<String>,
    },

    /// Delete a record (admin)
    Delete { resource: String, id: i64 },

    /// Show the banner of a public page ("about", "doctors", ...)
    Banner { page: String },

    /// Show the gallery page banner
    GalleryBanner,

    /// Send a message through the public contact form
    Contact {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        message: String,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        subject: Option<String>,
    },
}

pub fn list_params(
    page: u64,
    per_page: u64,
    status: Option<Status>,
    search: Option<String>,
) -> Result<ListParams> {
    if page == 0 || per_page == 0 {
        return Err(CLIError::ParseError(
            "--page and --per-page start at 1".to_string(),
        ));
    }
    let mut params = ListParams::page(page).with_per_page(per_page);
    if let Some(status) = status {
        params = params.with_status(status);
    }
    if let Some(search) = search.filter(|s| !s.trim().is_empty()) {
        params = params.with_search(search);
    }
    Ok(params)
}

/// Parse one `--field` argument.
pub fn parse_field(raw: &str) -> Result<(String, FormValue)> {
    if let Some((key, json)) = raw.split_once(":=") {
        if !key.contains('=') {
            let key = check_key(key, raw)?;
            let value: JsonValue = serde_json::from_str(json).map_err(|e| {
                CLIError::ParseError(format!("Invalid JSON in '{}': {}", raw, e))
            })?;
            return Ok((key, FormValue::Data(value)));
        }
    }

    let (key, value) = raw.split_once('=').ok_or_else(|| {
        CLIError::ParseError(format!("Expected KEY=VALUE or KEY:=JSON, got '{}'", raw))
    })?;
    let key = check_key(key, raw)?;
    Ok((key, FormValue::Data(JsonValue::String(value.to_string()))))
}

/// Parse one `--file` argument and read the file.
pub fn parse_file(raw: &str) -> Result<(String, FileUpload)> {
    let (key, path) = raw
        .split_once('=')
        .ok_or_else(|| CLIError::ParseError(format!("Expected KEY=PATH, got '{}'", raw)))?;
    let key = check_key(key, raw)?;
    let upload = FileUpload::from_path(Path::new(path.trim()))
        .map_err(|e| CLIError::FileError(e.to_string()))?;
    Ok((key, upload))
}

/// Build the mutation payload from `--field` and `--file` arguments. Later
/// arguments win over earlier ones with the same key.
pub fn build_payload(fields: &[String], files: &[String]) -> Result<FormPayload> {
    let mut payload = FormPayload::new();
    for raw in fields {
        let (key, value) = parse_field(raw)?;
        payload = payload.field(key, value);
    }
    for raw in files {
        let (key, upload) = parse_file(raw)?;
        payload = payload.file(key, upload);
    }
    Ok(payload)
}

fn check_key(key: &str, raw: &str) -> Result<String> {
    let key = key.trim();
    if key.is_empty() {
        return Err(CLIError::ParseError(format!("Missing field name in '{}'", raw)));
    }
    Ok(key.to_string())
}
