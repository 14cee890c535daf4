//! CLI session state management
//!
//! A [`CLISession`] owns the data layer for one invocation: the API client
//! with its query cache, the auth state restored from the session file, and
//! the guard that gates admin commands.

use medisite_link::endpoints::{banners, CONTACT_MESSAGES};
use medisite_link::models::ContactMessageInput;
use medisite_link::{
    Api, ApiClient, AuthState, CacheConfig, GuardDecision, LinkTimeouts, Persistence,
    RouteGuard,
};
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::commands::{build_payload, list_params, Command};
use crate::error::{CLIError, Result};
use crate::formatter::{OutputFormat, OutputFormatter};
use crate::resources::{self, ResourceEntry};

/// Privilege required by every write command.
const ADMIN_ROLE: &str = "admin";

/// Settings resolved from flags and the config file.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub server_url: String,
    pub timeouts: LinkTimeouts,
    pub cache: CacheConfig,
    pub format: OutputFormat,
    pub color: bool,
}

pub struct CLISession {
    api: Api,
    auth: AuthState,
    guard: RouteGuard,
    formatter: OutputFormatter,
    server_url: String,
}

impl CLISession {
    /// Restore the stored session from `persistence` and build the client.
    pub fn new(options: SessionOptions, persistence: Persistence) -> Result<Self> {
        let auth = AuthState::restore(persistence);
        let client = ApiClient::builder()
            .base_url(options.server_url.as_str())
            .timeouts(options.timeouts)
            .token_store(auth.token_store().clone())
            .user_agent(format!("medisite-cli/{}", crate::CLI_VERSION))
            .build()?;
        log::debug!(
            "[SESSION] {} ({})",
            options.server_url,
            if auth.is_authenticated() {
                "signed in"
            } else {
                "anonymous"
            }
        );

        Ok(Self {
            api: Api::with_config(client, options.cache),
            auth,
            guard: RouteGuard::default(),
            formatter: OutputFormatter::new(options.format, options.color),
            server_url: options.server_url,
        })
    }

    pub fn api(&self) -> &Api {
        &self.api
    }

    pub fn auth(&self) -> &AuthState {
        &self.auth
    }

    pub fn formatter(&self) -> &OutputFormatter {
        &self.formatter
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    /// Run one command and return its rendered output.
    ///
    /// A 401 from the server means the stored token is no longer valid; the
    /// local session is dropped so the next run starts anonymous.
    pub async fn execute(&self, command: Command) -> Result<String> {
        let result = self.dispatch(command).await;
        if let Err(CLIError::Unauthorized(_)) = &result {
            if self.auth.is_authenticated() {
                log::warn!("[SESSION] Server rejected the stored session, signing out");
                self.auth.logout();
                self.api.reset();
            }
        }
        result
    }

    async fn dispatch(&self, command: Command) -> Result<String> {
        match command {
            Command::Login { email, password } => {
                let email = email.ok_or_else(|| missing("--email"))?;
                let password = password.ok_or_else(|| missing("--password"))?;
                self.login(&email, &password).await
            }
            Command::Logout => self.logout().await,
            Command::Whoami => self.whoami().await,
            Command::List {
                resource,
                page,
                per_page,
                status,
                search,
            } => {
                let entry = resources::find(&resource)?;
                let params = list_params(page, per_page, status, search)?;
                if entry.admin_reads() {
                    self.require_admin(&entry)?;
                }
                let page = entry.resource().fetch_list(&self.api, &params).await?;
                self.formatter.format_page(&page, entry.columns)
            }
            Command::Show { resource, id } => {
                let entry = resources::find(&resource)?;
                if entry.admin_reads() {
                    self.require_admin(&entry)?;
                }
                let record = entry.resource().fetch(&self.api, id).await?;
                self.formatter.format_record(&record)
            }
            Command::Create {
                resource,
                fields,
                files,
            } => {
                let entry = resources::find(&resource)?;
                if !entry.allows_create() {
                    return Err(read_only(&entry, "create"));
                }
                self.require_admin(&entry)?;
                let payload = build_payload(&fields, &files)?;
                if payload.is_empty() {
                    return Err(CLIError::ParseError(
                        "Nothing to create, pass at least one --field".to_string(),
                    ));
                }
                let record = entry.resource().create_record(&self.api, payload).await?;
                self.formatter.format_record(&record)
            }
            Command::Update {
                resource,
                id,
                fields,
                files,
            } => {
                let entry = resources::find(&resource)?;
                if !entry.allows_update() {
                    return Err(read_only(&entry, "update"));
                }
                self.require_admin(&entry)?;
                let payload = build_payload(&fields, &files)?;
                if payload.is_empty() {
                    return Err(CLIError::ParseError(
                        "Nothing to update, pass --field or --file".to_string(),
                    ));
                }
                let record = entry
                    .resource()
                    .update_record(&self.api, id, payload)
                    .await?;
                self.formatter.format_record(&record)
            }
            Command::Delete { resource, id } => {
                let entry = resources::find(&resource)?;
                if !entry.allows_delete() {
                    return Err(read_only(&entry, "delete"));
                }
                self.require_admin(&entry)?;
                entry.resource().delete_record(&self.api, id).await?;
                Ok(self
                    .formatter
                    .success(&format!("Deleted {} #{}", entry.name, id)))
            }
            Command::Banner { page } => {
                let banner = banners::fetch_by_page(&self.api, &page).await?;
                let banner = to_json(banner.as_ref())?;
                self.formatter
                    .format_optional(banner.as_ref(), &format!("No banner for page '{}'", page))
            }
            Command::GalleryBanner => {
                let banner = banners::fetch_gallery_banner(&self.api).await?;
                let banner = to_json(banner.as_ref())?;
                self.formatter
                    .format_optional(banner.as_ref(), "No gallery banner")
            }
            Command::Contact {
                name,
                email,
                message,
                phone,
                subject,
            } => {
                let input = ContactMessageInput {
                    name,
                    email,
                    phone,
                    subject,
                    message,
                };
                let sent = CONTACT_MESSAGES.create_record(&self.api, input).await?;
                Ok(self
                    .formatter
                    .success(&format!("Message #{} sent", sent.id)))
            }
        }
    }

    async fn login(&self, email: &str, password: &str) -> Result<String> {
        let user = self.auth.login(&self.api, email, password).await?;
        Ok(self.formatter.success(&format!(
            "Signed in as {} ({})",
            user.name,
            user.privilege().unwrap_or("no role")
        )))
    }

    async fn logout(&self) -> Result<String> {
        if !self.auth.is_authenticated() {
            self.auth.logout();
            return Ok(self.formatter.success("Not signed in"));
        }
        self.auth.logout_remote(&self.api).await;
        Ok(self.formatter.success("Signed out"))
    }

    async fn whoami(&self) -> Result<String> {
        match self.auth.refresh_profile(&self.api).await? {
            Some(user) => self.formatter.format_user(&user),
            None => Err(CLIError::Unauthorized(
                "run `medisite login` first".to_string(),
            )),
        }
    }

    /// Gate an admin command through the route guard.
    fn require_admin(&self, entry: &ResourceEntry) -> Result<()> {
        let target = format!("/admin/{}", entry.name);
        match self
            .guard
            .check_role(&self.auth.session(), &target, ADMIN_ROLE)
        {
            GuardDecision::Render => Ok(()),
            GuardDecision::Redirect { return_to, .. } => {
                log::debug!("[SESSION] {} needs a session", return_to);
                Err(CLIError::Unauthorized(format!(
                    "{} requires signing in, run `medisite login`",
                    entry.name
                )))
            }
            GuardDecision::Forbidden => Err(CLIError::Forbidden(format!(
                "managing {} requires the {} role",
                entry.name, ADMIN_ROLE
            ))),
        }
    }
}

fn missing(flag: &str) -> CLIError {
    CLIError::ParseError(format!("{} is required", flag))
}

fn read_only(entry: &ResourceEntry, action: &str) -> CLIError {
    CLIError::ParseError(format!("{} does not support {}", entry.name, action))
}

fn to_json<T: Serialize>(value: Option<&T>) -> Result<Option<JsonValue>> {
    value
        .map(serde_json::to_value)
        .transpose()
        .map_err(|e| CLIError::ParseError(format!("Cannot render record: {}", e)))
}
