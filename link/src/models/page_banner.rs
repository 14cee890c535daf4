use serde::{Deserialize, Serialize};

use super::status::Status;
use crate::request::{FileUpload, FormPayload, IntoFormPayload};

/// Hero banner shown at the top of a public page ("about", "careers", ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageBanner {
    pub id: i64,
    /// Page key the banner belongs to
    pub page: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// The banner of the gallery page. The backend serves it from a list
/// endpoint; the client exposes it as a single record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryPageBanner {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Fields for both banner kinds. `page` is ignored by the gallery banner.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BannerInput {
    pub page: Option<String>,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub status: Option<Status>,
    pub image: Option<FileUpload>,
}

impl BannerInput {
    pub fn for_page(page: impl Into<String>) -> Self {
        Self {
            page: Some(page.into()),
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_image(mut self, image: FileUpload) -> Self {
        self.image = Some(image);
        self
    }
}

impl IntoFormPayload for BannerInput {
    fn into_form_payload(&self) -> FormPayload {
        FormPayload::new()
            .optional_text("page", self.page.as_deref())
            .optional_text("title", self.title.as_deref())
            .optional_text("subtitle", self.subtitle.as_deref())
            .optional_text("status", self.status.map(|s| s.as_str()))
            .optional_file("image", self.image.as_ref())
    }
}
