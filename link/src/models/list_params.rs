use serde::{Deserialize, Serialize};

use super::status::Status;
use crate::request::ApiRequest;

/// Arguments of every list query. Part of the cache key, so page 1 and
/// page 2 of the same resource are cached separately.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListParams {
    pub page: u64,
    pub per_page: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 10,
            status: None,
            search: None,
        }
    }
}

impl ListParams {
    pub fn page(page: u64) -> Self {
        Self {
            page,
            ..Self::default()
        }
    }

    pub fn with_per_page(mut self, per_page: u64) -> Self {
        self.per_page = per_page;
        self
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub(crate) fn apply(&self, request: ApiRequest) -> ApiRequest {
        request
            .with_query("page", self.page)
            .with_query("per_page", self.per_page)
            .with_optional_query("status", self.status.map(|s| s.as_str()))
            .with_optional_query("search", self.search.as_deref())
    }
}
