use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::pagination::{Paginated, Pagination};
use crate::error::{LinkError, Result};

/// Uniform wrapper returned by every endpoint:
/// `{ success, message, data, pagination? }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// Whether the server considers the call successful
    pub success: bool,

    /// Human-readable status message
    #[serde(default)]
    pub message: String,

    /// Payload: a record, a list of records, or null
    pub data: T,

    /// Present on list endpoints only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

/// Envelope with an untyped payload, as stored in the query cache.
pub type ApiResponse = Envelope<JsonValue>;

impl Envelope<JsonValue> {
    /// Decode the payload into a concrete record type.
    pub fn decode_data<T: DeserializeOwned>(&self) -> Result<T> {
        T::deserialize(&self.data).map_err(|e| {
            LinkError::MalformedResponse(format!("Unexpected payload shape: {}", e))
        })
    }

    /// Decode a list payload together with its pagination metadata.
    ///
    /// A list endpoint that omits `pagination` is treated as a single page
    /// holding every item.
    pub fn decode_page<T: DeserializeOwned>(&self) -> Result<Paginated<T>> {
        let items: Vec<T> = self.decode_data()?;
        let pagination = self.pagination.clone().unwrap_or_else(|| {
            let count = items.len() as u64;
            Pagination::compute(count, count.max(1), 1)
        });
        Ok(Paginated { items, pagination })
    }

    /// Collapse a one-element list payload into the element itself.
    ///
    /// `[x]` becomes `x`, `[]` becomes `null`, anything else is unchanged.
    /// Longer lists keep their first element: the endpoint is singular by
    /// contract.
    pub fn into_single(mut self) -> Self {
        if let JsonValue::Array(items) = &mut self.data {
            self.data = if items.is_empty() {
                JsonValue::Null
            } else {
                items.swap_remove(0)
            };
        }
        self
    }
}
