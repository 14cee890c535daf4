//! HTTP executor with builder pattern.
//!
//! [`ApiClient`] is the single place where requests hit the network. It
//! resolves paths against the base URL, attaches the stored access token as a
//! bearer credential, encodes JSON or multipart bodies, and turns every
//! response into either an [`ApiResponse`] envelope or a typed [`LinkError`].
//! Nothing is retried.

use crate::{
    error::{LinkError, Result},
    models::ApiResponse,
    request::{ApiRequest, RequestBody},
    timeouts::LinkTimeouts,
    token_store::TokenStore,
};
use std::time::Instant;

/// Low-level client for the hospital CMS REST API.
///
/// Use [`ApiClient::builder`] to construct instances. Most callers go through
/// [`Api`](crate::Api), which adds caching on top.
///
/// # Examples
///
/// ```rust,no_run
/// use medisite_link::{ApiClient, ApiRequest};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ApiClient::builder()
///     .base_url("http://localhost:8000/api")
///     .build()?;
///
/// let response = client.execute(&ApiRequest::get("doctors")).await?;
/// println!("{}", response.message);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    http_client: reqwest::Client,
    tokens: TokenStore,
    timeouts: LinkTimeouts,
}

impl ApiClient {
    /// Create a new builder for configuring the client
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::new()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeouts(&self) -> &LinkTimeouts {
        &self.timeouts
    }

    pub fn token_store(&self) -> &TokenStore {
        &self.tokens
    }

    /// Resolve a relative API path against the base URL.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Send one request and decode the response envelope.
    ///
    /// # Errors
    /// - [`LinkError::NetworkError`] / [`LinkError::TimeoutError`] when the
    ///   transport fails
    /// - [`LinkError::ServerError`] for non-2xx statuses and for envelopes
    ///   reporting `success: false`
    /// - [`LinkError::MalformedResponse`] when a 2xx body is not an envelope
    pub async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse> {
        let url = self.url_for(&request.path);
        let mut builder = self
            .http_client
            .request(request.method.to_reqwest(), &url)
            .header(reqwest::header::ACCEPT, "application/json");

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        if let Some(token) = self.tokens.get_access_token() {
            builder = builder.bearer_auth(token);
        }

        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(body) => builder.json(body),
            RequestBody::Multipart(form) => builder.multipart(form.to_multipart()?),
        };

        let start = Instant::now();
        log::debug!("[API] {} {}", request.method, url);

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                log::warn!(
                    "[API] Transport error: {} {} failed after {:?}: {}",
                    request.method,
                    url,
                    start.elapsed(),
                    e
                );
                return Err(e.into());
            }
        };

        let status = response.status();
        let text = response.text().await?;
        log::debug!(
            "[API] {} {} -> status={} duration_ms={}",
            request.method,
            request.path,
            status,
            start.elapsed().as_millis()
        );

        if !status.is_success() {
            let message = extract_error_message(&text)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error").to_string());
            log::warn!(
                "[API] Server error: status={} message=\"{}\"",
                status.as_u16(),
                message
            );
            return Err(LinkError::ServerError {
                status_code: status.as_u16(),
                message,
            });
        }

        let envelope: ApiResponse = serde_json::from_str(&text).map_err(|e| {
            log::warn!("[API] Malformed envelope from {}: {}", request.path, e);
            LinkError::MalformedResponse(format!("{} {}: {}", request.method, request.path, e))
        })?;

        if !envelope.success {
            return Err(LinkError::ServerError {
                status_code: status.as_u16(),
                message: envelope.message,
            });
        }

        Ok(envelope)
    }
}

/// Pull a human-readable message out of an error body.
///
/// Laravel-style bodies carry `message`; validation failures add an `errors`
/// map whose first entry is more useful than the generic message.
fn extract_error_message(body: &str) -> Option<String> {
    let json: serde_json::Value = serde_json::from_str(body).ok()?;
    let first_field_error = json
        .get("errors")
        .and_then(|e| e.as_object())
        .and_then(|errors| errors.values().next())
        .and_then(|v| match v {
            serde_json::Value::Array(items) => items.first().and_then(|i| i.as_str()),
            serde_json::Value::String(s) => Some(s.as_str()),
            _ => None,
        })
        .map(str::to_string);

    first_field_error.or_else(|| {
        json.get("message")
            .and_then(|m| m.as_str())
            .filter(|m| !m.is_empty())
            .map(str::to_string)
    })
}

/// Builder for configuring [`ApiClient`] instances.
pub struct ApiClientBuilder {
    base_url: Option<String>,
    tokens: TokenStore,
    timeouts: LinkTimeouts,
    user_agent: String,
}

impl ApiClientBuilder {
    fn new() -> Self {
        Self {
            base_url: None,
            tokens: TokenStore::default(),
            timeouts: LinkTimeouts::default(),
            user_agent: format!("medisite-link/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Set the base URL of the REST API (e.g. `https://hospital.example/api`)
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Token store consulted before every request. Defaults to a detached
    /// store, i.e. anonymous requests.
    pub fn token_store(mut self, tokens: TokenStore) -> Self {
        self.tokens = tokens;
        self
    }

    pub fn timeouts(mut self, timeouts: LinkTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Build the client
    pub fn build(self) -> Result<ApiClient> {
        let base_url = self
            .base_url
            .ok_or_else(|| LinkError::ConfigurationError("base_url is required".into()))?;
        let base_url = base_url.trim_end_matches('/').to_string();

        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(LinkError::ConfigurationError(format!(
                "base_url must start with http:// or https://, got '{}'",
                base_url
            )));
        }

        let http_client = reqwest::Client::builder()
            .timeout(self.timeouts.request_timeout)
            .connect_timeout(self.timeouts.connection_timeout)
            .user_agent(self.user_agent)
            .pool_max_idle_per_host(10)
            .build()
            .map_err(|e| LinkError::ConfigurationError(e.to_string()))?;

        log::debug!("[CLIENT] Configured for {}", base_url);

        Ok(ApiClient {
            base_url,
            http_client,
            tokens: self.tokens,
            timeouts: self.timeouts,
        })
    }
}
