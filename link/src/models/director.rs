use serde::{Deserialize, Serialize};

use super::status::Status;
use crate::request::{FileUpload, FormPayload, IntoFormPayload};

/// Member of the board of directors (about page).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Director {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub designation: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    /// Position on the board listing, ascending
    #[serde(default)]
    pub sort_order: Option<i64>,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DirectorInput {
    pub name: Option<String>,
    pub designation: Option<String>,
    pub bio: Option<String>,
    pub sort_order: Option<i64>,
    pub status: Option<Status>,
    pub image: Option<FileUpload>,
}

impl DirectorInput {
    pub fn new(name: impl Into<String>, designation: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            designation: Some(designation.into()),
            ..Self::default()
        }
    }
}

impl IntoFormPayload for DirectorInput {
    fn into_form_payload(&self) -> FormPayload {
        FormPayload::new()
            .optional_text("name", self.name.as_deref())
            .optional_text("designation", self.designation.as_deref())
            .optional_text("bio", self.bio.as_deref())
            .optional_value("sort_order", self.sort_order)
            .optional_text("status", self.status.map(|s| s.as_str()))
            .optional_file("image", self.image.as_ref())
    }
}
