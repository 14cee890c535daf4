//! Request shapes handed to the API client.
//!
//! A request is `{method, path, query, body}`. Mutation payloads are built as
//! a [`FormPayload`]: an ordered list of named fields that becomes a JSON
//! object when every field is plain data, and multipart form data as soon as
//! one field carries a file. Optional fields that are unset are never added,
//! so they are absent from the wire rather than sent empty.

use crate::error::{LinkError, Result};
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};
use std::path::Path;

/// HTTP method of an [`ApiRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }

    pub(crate) fn to_reqwest(self) -> reqwest::Method {
        match self {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A binary file attached to a mutation (blog cover, director photo, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl FileUpload {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Read a file from disk, guessing the image MIME type from its extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            LinkError::ConfigurationError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();
        let mime_type = mime_for_extension(path).to_string();
        Ok(Self {
            file_name,
            mime_type,
            bytes,
        })
    }
}

fn mime_for_extension(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        Some("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}

/// Value of one form field.
#[derive(Debug, Clone, PartialEq)]
pub enum FormValue {
    /// Scalar data: strings, numbers, booleans.
    Data(JsonValue),
    File(FileUpload),
}

/// Ordered set of mutation fields.
///
/// ```rust
/// use medisite_link::request::{FormPayload, RequestBody};
///
/// let subtitle: Option<String> = None;
/// let payload = FormPayload::new()
///     .text("title", "Open day")
///     .optional_text("subtitle", subtitle.as_deref());
///
/// assert!(payload.contains_key("title"));
/// assert!(!payload.contains_key("subtitle"));
/// assert!(matches!(payload.into_body(), RequestBody::Json(_)));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormPayload {
    fields: Vec<(String, FormValue)>,
}

impl FormPayload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a field.
    pub fn field(mut self, name: impl Into<String>, value: FormValue) -> Self {
        let name = name.into();
        if let Some(slot) = self.fields.iter_mut().find(|(k, _)| *k == name) {
            slot.1 = value;
        } else {
            self.fields.push((name, value));
        }
        self
    }

    pub fn text(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.field(name, FormValue::Data(JsonValue::String(value.into())))
    }

    pub fn value(self, name: impl Into<String>, value: impl Serialize) -> Self {
        match serde_json::to_value(value) {
            Ok(value) => self.field(name, FormValue::Data(value)),
            Err(e) => {
                log::warn!("[FORM] Dropping unserializable field: {}", e);
                self
            }
        }
    }

    pub fn file(self, name: impl Into<String>, file: FileUpload) -> Self {
        self.field(name, FormValue::File(file))
    }

    pub fn optional_text(self, name: impl Into<String>, value: Option<&str>) -> Self {
        match value {
            Some(value) => self.text(name, value),
            None => self,
        }
    }

    pub fn optional_value<T: Serialize>(self, name: impl Into<String>, value: Option<T>) -> Self {
        match value {
            Some(value) => self.value(name, value),
            None => self,
        }
    }

    pub fn optional_file(self, name: impl Into<String>, file: Option<&FileUpload>) -> Self {
        match file {
            Some(file) => self.file(name, file.clone()),
            None => self,
        }
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.fields.iter().any(|(k, _)| k == name)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&FormValue> {
        self.fields.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    pub fn has_files(&self) -> bool {
        self.fields
            .iter()
            .any(|(_, v)| matches!(v, FormValue::File(_)))
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Multipart when any field is a file, JSON object otherwise.
    pub fn into_body(self) -> RequestBody {
        if self.has_files() {
            RequestBody::Multipart(self)
        } else {
            let mut object = Map::new();
            for (name, value) in self.fields {
                if let FormValue::Data(value) = value {
                    object.insert(name, value);
                }
            }
            RequestBody::Json(JsonValue::Object(object))
        }
    }

    pub(crate) fn to_multipart(&self) -> Result<reqwest::multipart::Form> {
        let mut form = reqwest::multipart::Form::new();
        for (name, value) in &self.fields {
            form = match value {
                FormValue::Data(JsonValue::String(s)) => form.text(name.clone(), s.clone()),
                // Multipart has no booleans; the backend expects 1/0
                FormValue::Data(JsonValue::Bool(b)) => {
                    form.text(name.clone(), if *b { "1" } else { "0" })
                }
                FormValue::Data(other) => form.text(name.clone(), other.to_string()),
                FormValue::File(file) => {
                    let part = reqwest::multipart::Part::bytes(file.bytes.clone())
                        .file_name(file.file_name.clone())
                        .mime_str(&file.mime_type)
                        .map_err(|e| {
                            LinkError::SerializationError(format!(
                                "Invalid MIME type '{}' for field '{}': {}",
                                file.mime_type, name, e
                            ))
                        })?;
                    form.part(name.clone(), part)
                }
            };
        }
        Ok(form)
    }
}

/// Conversion of a typed input struct into mutation fields.
pub trait IntoFormPayload {
    fn into_form_payload(&self) -> FormPayload;
}

impl IntoFormPayload for FormPayload {
    fn into_form_payload(&self) -> FormPayload {
        self.clone()
    }
}

/// Body of an [`ApiRequest`].
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(JsonValue),
    Multipart(FormPayload),
}

/// A request ready for the API client. Paths are relative to the base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::Empty,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    pub fn with_optional_query(self, key: impl Into<String>, value: Option<impl ToString>) -> Self {
        match value {
            Some(value) => self.with_query(key, value),
            None => self,
        }
    }

    pub fn with_json(mut self, body: impl Serialize) -> Result<Self> {
        self.body = RequestBody::Json(serde_json::to_value(body)?);
        Ok(self)
    }

    pub fn with_form(mut self, payload: FormPayload) -> Self {
        self.body = payload.into_body();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cover() -> FileUpload {
        FileUpload::new("cover.png", "image/png", vec![0x89, 0x50, 0x4e, 0x47])
    }

    #[test]
    fn test_optional_fields_are_omitted() {
        let payload = FormPayload::new()
            .text("title", "Cardiology wing opens")
            .optional_text("excerpt", None)
            .optional_value::<i64>("sort_order", None)
            .optional_file("image", None);

        let keys: Vec<&str> = payload.keys().collect();
        assert_eq!(keys, vec!["title"]);
    }

    #[test]
    fn test_json_body_without_files() {
        let body = FormPayload::new()
            .text("title", "Checkup plan")
            .value("months", 6)
            .value("is_featured", true)
            .into_body();

        assert_eq!(
            body,
            RequestBody::Json(json!({"title": "Checkup plan", "months": 6, "is_featured": true}))
        );
    }

    #[test]
    fn test_file_switches_to_multipart() {
        let payload = FormPayload::new()
            .text("title", "Board meeting")
            .file("image", cover());
        assert!(payload.has_files());

        match payload.into_body() {
            RequestBody::Multipart(form) => {
                assert!(form.contains_key("image"));
                assert!(form.contains_key("title"));
                assert!(form.to_multipart().is_ok());
            }
            other => panic!("expected multipart body, got {:?}", other),
        }
    }

    #[test]
    fn test_field_replaces_existing_key() {
        let payload = FormPayload::new().text("status", "active").text("status", "inactive");
        assert_eq!(payload.keys().count(), 1);
        assert_eq!(
            payload.get("status"),
            Some(&FormValue::Data(json!("inactive")))
        );
    }

    #[test]
    fn test_invalid_mime_type_is_reported() {
        let payload = FormPayload::new().file("image", FileUpload::new("x", "not a mime", vec![]));
        assert!(matches!(
            payload.to_multipart(),
            Err(LinkError::SerializationError(_))
        ));
    }

    #[test]
    fn test_query_builders() {
        let request = ApiRequest::get("blogs")
            .with_query("page", 2)
            .with_optional_query("search", None::<String>)
            .with_optional_query("status", Some("active"));

        assert_eq!(request.method, Method::Get);
        assert_eq!(
            request.query,
            vec![
                ("page".to_string(), "2".to_string()),
                ("status".to_string(), "active".to_string())
            ]
        );
        assert_eq!(request.body, RequestBody::Empty);
    }

    #[test]
    fn test_mime_guessing() {
        assert_eq!(mime_for_extension(Path::new("a/b/photo.JPG")), "image/jpeg");
        assert_eq!(mime_for_extension(Path::new("banner.webp")), "image/webp");
        assert_eq!(mime_for_extension(Path::new("noext")), "application/octet-stream");
    }
}
