//! Timeout and cache-retention configuration for the Medisite client.
//!
//! The client performs no retries, so these values are the only bound on how
//! long a page can wait for content.

use std::time::Duration;

/// Timeout configuration for HTTP operations.
///
/// # Examples
///
/// ```rust
/// use medisite_link::LinkTimeouts;
/// use std::time::Duration;
///
/// // Use defaults (recommended for most cases)
/// let timeouts = LinkTimeouts::default();
///
/// // Custom timeouts for a slow hospital intranet
/// let timeouts = LinkTimeouts::builder()
///     .connection_timeout(Duration::from_secs(20))
///     .request_timeout(Duration::from_secs(90))
///     .build();
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkTimeouts {
    /// Timeout for establishing connections (TCP + TLS handshake).
    /// Default: 10 seconds
    pub connection_timeout: Duration,

    /// Total time allowed for one request, including the body upload.
    /// Image uploads count against this, so keep it generous.
    /// Default: 30 seconds
    pub request_timeout: Duration,
}

impl Default for LinkTimeouts {
    fn default() -> Self {
        Self {
            connection_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl LinkTimeouts {
    /// Create a new builder for custom timeout configuration.
    pub fn builder() -> LinkTimeoutsBuilder {
        LinkTimeoutsBuilder::new()
    }

    /// Short timeouts for a backend on localhost.
    pub fn fast() -> Self {
        Self {
            connection_timeout: Duration::from_secs(2),
            request_timeout: Duration::from_secs(5),
        }
    }

    /// Long timeouts for remote deployments and large image uploads.
    pub fn relaxed() -> Self {
        Self {
            connection_timeout: Duration::from_secs(30),
            request_timeout: Duration::from_secs(120),
        }
    }
}

/// Builder for creating custom [`LinkTimeouts`] configurations.
#[derive(Debug, Clone)]
pub struct LinkTimeoutsBuilder {
    timeouts: LinkTimeouts,
}

impl LinkTimeoutsBuilder {
    fn new() -> Self {
        Self {
            timeouts: LinkTimeouts::default(),
        }
    }

    /// Set the connection timeout (TCP + TLS handshake).
    pub fn connection_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.connection_timeout = timeout;
        self
    }

    /// Set the connection timeout in seconds.
    pub fn connection_timeout_secs(self, secs: u64) -> Self {
        self.connection_timeout(Duration::from_secs(secs))
    }

    /// Set the per-request timeout.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.request_timeout = timeout;
        self
    }

    /// Set the per-request timeout in seconds.
    pub fn request_timeout_secs(self, secs: u64) -> Self {
        self.request_timeout(Duration::from_secs(secs))
    }

    pub fn build(self) -> LinkTimeouts {
        self.timeouts
    }
}

/// Retention policy for the query cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// How long an entry outlives its last subscriber, so back-navigation
    /// can render without a refetch.
    /// Default: 60 seconds
    pub keep_unused_data_for: Duration,

    /// Maximum age of a cached response before a read triggers a refetch.
    /// `None` keeps entries fresh until a mutation invalidates them.
    /// Default: None
    pub refetch_after: Option<Duration>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            keep_unused_data_for: Duration::from_secs(60),
            refetch_after: None,
        }
    }
}

impl CacheConfig {
    pub fn with_keep_unused_data_for(mut self, duration: Duration) -> Self {
        self.keep_unused_data_for = duration;
        self
    }

    pub fn with_refetch_after(mut self, max_age: Duration) -> Self {
        self.refetch_after = Some(max_age);
        self
    }
}
