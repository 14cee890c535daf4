use serde::{Deserialize, Serialize};

use super::status::Status;
use crate::request::{FileUpload, FormPayload, IntoFormPayload};

/// Photo in the public gallery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryItem {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    pub image: String,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GalleryItemInput {
    pub title: Option<String>,
    pub category: Option<String>,
    pub status: Option<Status>,
    pub image: Option<FileUpload>,
}

impl GalleryItemInput {
    pub fn new(image: FileUpload) -> Self {
        Self {
            image: Some(image),
            ..Self::default()
        }
    }
}

impl IntoFormPayload for GalleryItemInput {
    fn into_form_payload(&self) -> FormPayload {
        FormPayload::new()
            .optional_text("title", self.title.as_deref())
            .optional_text("category", self.category.as_deref())
            .optional_text("status", self.status.map(|s| s.as_str()))
            .optional_file("image", self.image.as_ref())
    }
}
