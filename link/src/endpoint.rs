//! Declarative endpoint descriptors.
//!
//! A resource module never talks to the network or the cache directly. It
//! describes each operation as a [`QueryEndpoint`] or [`MutationEndpoint`]:
//! how to build the request from the arguments, which tags the result
//! provides (queries) or which tags the write invalidates (mutations), and an
//! optional response transform. [`Api`](crate::Api) is the one executor that
//! consumes them.

use crate::cache::tags::Tag;
use crate::error::Result;
use crate::models::ApiResponse;
use crate::request::ApiRequest;
use serde_json::Value as JsonValue;
use std::sync::Arc;

type QueryRequestFn<A> = Arc<dyn Fn(&A) -> ApiRequest + Send + Sync>;
type ProvidesFn<A> = Arc<dyn Fn(&A, &ApiResponse) -> Vec<Tag> + Send + Sync>;
type TransformFn = Arc<dyn Fn(ApiResponse) -> ApiResponse + Send + Sync>;
type MutationRequestFn<A> = Arc<dyn Fn(&A) -> Result<ApiRequest> + Send + Sync>;
type InvalidatesFn<A> = Arc<dyn Fn(&A, &ApiResponse) -> Vec<Tag> + Send + Sync>;

/// Read operation whose results are cached under `(name, args)`.
pub struct QueryEndpoint<A> {
    name: String,
    request: QueryRequestFn<A>,
    provides: ProvidesFn<A>,
    transform: Option<TransformFn>,
}

impl<A> Clone for QueryEndpoint<A> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            request: self.request.clone(),
            provides: self.provides.clone(),
            transform: self.transform.clone(),
        }
    }
}

impl<A: 'static> QueryEndpoint<A> {
    /// A query providing no tags until [`provides`](Self::provides) is set.
    pub fn new(
        name: impl Into<String>,
        request: impl Fn(&A) -> ApiRequest + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            request: Arc::new(request),
            provides: Arc::new(|_, _| Vec::new()),
            transform: None,
        }
    }

    pub fn provides(
        mut self,
        provides: impl Fn(&A, &ApiResponse) -> Vec<Tag> + Send + Sync + 'static,
    ) -> Self {
        self.provides = Arc::new(provides);
        self
    }

    /// Rewrite the response before it is cached and handed to consumers.
    pub fn transform_response(
        mut self,
        transform: impl Fn(ApiResponse) -> ApiResponse + Send + Sync + 'static,
    ) -> Self {
        self.transform = Some(Arc::new(transform));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn build_request(&self, args: &A) -> ApiRequest {
        (self.request)(args)
    }

    /// Bind the descriptor to concrete arguments so the cache can re-run it
    /// later without knowing `A`.
    pub(crate) fn recipe(&self, args: &A) -> QueryRecipe
    where
        A: Clone + Send + Sync,
    {
        let bound_args = args.clone();
        let provides = self.provides.clone();
        QueryRecipe {
            request: self.build_request(args),
            provides: Box::new(move |response| provides(&bound_args, response)),
            transform: self.transform.clone(),
        }
    }
}

/// Write operation; invalidates tags once it succeeds.
pub struct MutationEndpoint<A> {
    name: String,
    request: MutationRequestFn<A>,
    invalidates: InvalidatesFn<A>,
}

impl<A> Clone for MutationEndpoint<A> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            request: self.request.clone(),
            invalidates: self.invalidates.clone(),
        }
    }
}

impl<A: 'static> MutationEndpoint<A> {
    pub fn new(
        name: impl Into<String>,
        request: impl Fn(&A) -> Result<ApiRequest> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            request: Arc::new(request),
            invalidates: Arc::new(|_, _| Vec::new()),
        }
    }

    pub fn invalidates(
        mut self,
        invalidates: impl Fn(&A, &ApiResponse) -> Vec<Tag> + Send + Sync + 'static,
    ) -> Self {
        self.invalidates = Arc::new(invalidates);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn build_request(&self, args: &A) -> Result<ApiRequest> {
        (self.request)(args)
    }

    pub fn invalidated_tags(&self, args: &A, response: &ApiResponse) -> Vec<Tag> {
        (self.invalidates)(args, response)
    }
}

/// A query bound to its arguments, as stored in a cache entry.
pub(crate) struct QueryRecipe {
    pub(crate) request: ApiRequest,
    provides: Box<dyn Fn(&ApiResponse) -> Vec<Tag> + Send + Sync>,
    transform: Option<TransformFn>,
}

impl QueryRecipe {
    pub(crate) fn finish(&self, response: ApiResponse) -> ApiResponse {
        match &self.transform {
            Some(transform) => transform(response),
            None => response,
        }
    }

    pub(crate) fn provided_tags(&self, response: &ApiResponse) -> Vec<Tag> {
        (self.provides)(response)
    }
}

/// `id` of every record in a list payload, or of the single record payload.
pub fn record_ids(data: &JsonValue) -> Vec<i64> {
    match data {
        JsonValue::Array(items) => items
            .iter()
            .filter_map(|item| item.get("id").and_then(JsonValue::as_i64))
            .collect(),
        JsonValue::Object(_) => data
            .get("id")
            .and_then(JsonValue::as_i64)
            .into_iter()
            .collect(),
        _ => Vec::new(),
    }
}

/// Provides for list queries: one tag per returned record plus `LIST`.
pub fn list_tags(kind: &str, response: &ApiResponse) -> Vec<Tag> {
    let mut tags: Vec<Tag> = record_ids(&response.data)
        .into_iter()
        .map(|id| Tag::id(kind, id))
        .collect();
    tags.push(Tag::list(kind));
    tags
}
