//! # medisite-link: Medisite CMS Client Library
//!
//! The client-side data layer of the Medisite hospital website and admin
//! panel. It talks to the CMS REST API and keeps what it reads in a
//! tag-invalidated cache.
//!
//! ## Features
//!
//! - **Session**: persisted user and bearer tokens behind a pluggable
//!   key/value store
//! - **HTTP executor**: JSON or multipart bodies, uniform response envelope,
//!   typed errors, no retries
//! - **Query cache**: per-argument entries, in-flight de-duplication, tag
//!   invalidation after mutations, keep-unused window
//! - **Endpoint modules**: one descriptor set per CMS resource
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use medisite_link::{endpoints, Api, ApiClient, AuthState, ListParams, Persistence};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let auth = AuthState::restore(Persistence::in_memory());
//!     let client = ApiClient::builder()
//!         .base_url("http://localhost:8000/api")
//!         .token_store(auth.token_store().clone())
//!         .build()?;
//!     let api = Api::new(client);
//!
//!     auth.login(&api, "admin@hospital.test", "secret").await?;
//!
//!     let page = endpoints::BLOGS.fetch_list(&api, &ListParams::page(1)).await?;
//!     for blog in page.items {
//!         println!("{} {}", blog.id, blog.title);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Mounted queries
//!
//! ```rust,no_run
//! use medisite_link::{endpoints, Api, ListParams};
//! use medisite_link::models::Doctor;
//!
//! # async fn example(api: Api) -> medisite_link::Result<()> {
//! let mut doctors = api.subscribe(&endpoints::DOCTORS.list(), &ListParams::default())?;
//! doctors.loaded().await?;
//! let first_page = doctors.page::<Doctor>()?;
//!
//! // Refetched whenever a mutation invalidates a `Doctor` tag
//! let next = doctors.changed().await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod cache;
pub mod client;
pub mod endpoint;
pub mod endpoints;
pub mod error;
pub mod models;
pub mod request;
pub mod storage;
pub mod timeouts;
pub mod token_store;

// Re-export main types for convenience
pub use api::{Api, QuerySubscription};
pub use auth::{AuthState, GuardDecision, RouteGuard, Session};
pub use cache::tags::{QueryKey, Tag, TagGraph, TagId};
pub use cache::QueryState;
pub use client::{ApiClient, ApiClientBuilder};
pub use endpoint::{MutationEndpoint, QueryEndpoint};
pub use error::{LinkError, Result};
pub use models::{ApiResponse, ListParams, Paginated, Pagination, Status, User};
pub use request::{
    ApiRequest, FileUpload, FormPayload, FormValue, IntoFormPayload, Method, RequestBody,
};
pub use storage::{KeyValueStore, MemoryStore, Persistence};
pub use timeouts::{CacheConfig, LinkTimeouts};
pub use token_store::{TokenPair, TokenStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
