use crate::api::Api;
use crate::cache::tags::Tag;
use crate::endpoint::{list_tags, MutationEndpoint, QueryEndpoint};
use crate::error::Result;
use crate::models::{ListParams, Paginated};
use crate::request::{ApiRequest, IntoFormPayload};
use serde::de::DeserializeOwned;
use std::marker::PhantomData;

/// Input type of resources the client can only read.
///
/// Uninhabited and without an [`IntoFormPayload`] impl, so the write
/// descriptors simply do not exist for such resources.
#[derive(Debug, Clone, Copy)]
pub enum ReadOnly {}

/// Descriptor factory for a standard REST collection at `path`, tagged as
/// `kind`.
///
/// `T` is the record type, `I` the create/update input.
pub struct Resource<T, I = ReadOnly> {
    kind: &'static str,
    path: &'static str,
    _marker: PhantomData<fn() -> (T, I)>,
}

impl<T, I> Clone for Resource<T, I> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, I> Copy for Resource<T, I> {}

impl<T, I> std::fmt::Debug for Resource<T, I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resource")
            .field("kind", &self.kind)
            .field("path", &self.path)
            .finish()
    }
}

impl<T, I> Resource<T, I> {
    pub const fn new(kind: &'static str, path: &'static str) -> Self {
        Self {
            kind,
            path,
            _marker: PhantomData,
        }
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn path(&self) -> &'static str {
        self.path
    }

    /// `GET {path}?page=&per_page=[&status=][&search=]`, providing one tag per
    /// returned record plus the collection tag.
    pub fn list(&self) -> QueryEndpoint<ListParams> {
        let (kind, path) = (self.kind, self.path);
        QueryEndpoint::new(format!("{}.list", kind), move |params: &ListParams| {
            params.apply(ApiRequest::get(path))
        })
        .provides(move |_, response| list_tags(kind, response))
    }

    /// `GET {path}/{id}`.
    pub fn get(&self) -> QueryEndpoint<i64> {
        let (kind, path) = (self.kind, self.path);
        QueryEndpoint::new(format!("{}.get", kind), move |id: &i64| {
            ApiRequest::get(item_path(path, *id))
        })
        .provides(move |id, _| vec![Tag::id(kind, *id)])
    }
}

impl<T: DeserializeOwned, I> Resource<T, I> {
    pub async fn fetch_list(&self, api: &Api, params: &ListParams) -> Result<Paginated<T>> {
        api.query_page(&self.list(), params).await
    }

    pub async fn fetch(&self, api: &Api, id: i64) -> Result<T> {
        api.query_as(&self.get(), &id).await
    }
}

impl<T, I> Resource<T, I>
where
    T: DeserializeOwned,
    I: IntoFormPayload + 'static,
{
    /// `POST {path}`; invalidates the collection tag.
    pub fn create(&self) -> MutationEndpoint<I> {
        let (kind, path) = (self.kind, self.path);
        MutationEndpoint::new(format!("{}.create", kind), move |input: &I| {
            Ok(ApiRequest::post(path).with_form(input.into_form_payload()))
        })
        .invalidates(move |_, _| vec![Tag::list(kind)])
    }

    /// Update record `id`; invalidates its tag and the collection tag.
    ///
    /// JSON payloads go out as `PUT {path}/{id}`. Payloads carrying a file
    /// are sent as multipart `POST {path}/{id}` with `_method=PUT`, since
    /// the backend only parses multipart bodies on POST.
    pub fn update(&self) -> MutationEndpoint<(i64, I)> {
        let (kind, path) = (self.kind, self.path);
        MutationEndpoint::new(format!("{}.update", kind), move |(id, input): &(i64, I)| {
            Ok(update_request(item_path(path, *id), input))
        })
        .invalidates(move |(id, _): &(i64, I), _| vec![Tag::id(kind, *id), Tag::list(kind)])
    }

    /// `DELETE {path}/{id}`; invalidates its tag and the collection tag.
    pub fn delete(&self) -> MutationEndpoint<i64> {
        let (kind, path) = (self.kind, self.path);
        MutationEndpoint::new(format!("{}.delete", kind), move |id: &i64| {
            Ok(ApiRequest::delete(item_path(path, *id)))
        })
        .invalidates(move |id, _| vec![Tag::id(kind, *id), Tag::list(kind)])
    }

    pub async fn create_record(&self, api: &Api, input: I) -> Result<T> {
        api.mutate_as(&self.create(), &input).await
    }

    pub async fn update_record(&self, api: &Api, id: i64, input: I) -> Result<T> {
        api.mutate_as(&self.update(), &(id, input)).await
    }

    pub async fn delete_record(&self, api: &Api, id: i64) -> Result<()> {
        api.mutate(&self.delete(), &id).await.map(|_| ())
    }
}

fn item_path(path: &str, id: i64) -> String {
    format!("{}/{}", path, id)
}

/// Build an update request for `path`, spoofing PUT over POST for multipart.
pub(crate) fn update_request(path: String, input: &impl IntoFormPayload) -> ApiRequest {
    let payload = input.into_form_payload();
    if payload.has_files() {
        ApiRequest::post(path).with_form(payload.text("_method", "PUT"))
    } else {
        ApiRequest::put(path).with_form(payload)
    }
}
