use serde::{Deserialize, Serialize};

use super::status::Status;
use crate::request::{FileUpload, FormPayload, IntoFormPayload};

/// Blog post shown on the public blog pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blog {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub content: String,
    /// Public URL of the cover image
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Create/update fields for a blog post. Unset fields are not transmitted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlogInput {
    pub title: Option<String>,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub author: Option<String>,
    pub published_at: Option<String>,
    pub status: Option<Status>,
    pub image: Option<FileUpload>,
}

impl BlogInput {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            content: Some(content.into()),
            ..Self::default()
        }
    }

    pub fn with_image(mut self, image: FileUpload) -> Self {
        self.image = Some(image);
        self
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }
}

impl IntoFormPayload for BlogInput {
    fn into_form_payload(&self) -> FormPayload {
        FormPayload::new()
            .optional_text("title", self.title.as_deref())
            .optional_text("excerpt", self.excerpt.as_deref())
            .optional_text("content", self.content.as_deref())
            .optional_text("author", self.author.as_deref())
            .optional_text("published_at", self.published_at.as_deref())
            .optional_text("status", self.status.map(|s| s.as_str()))
            .optional_file("image", self.image.as_ref())
    }
}
