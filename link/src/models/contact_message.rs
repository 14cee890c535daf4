use serde::{Deserialize, Serialize};

use super::status::Status;
use crate::request::{FormPayload, IntoFormPayload};

/// Message submitted through the public contact form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactMessage {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    pub message: String,
    /// Inactive once staff have handled it
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactMessageInput {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: Option<String>,
    pub message: String,
}

impl IntoFormPayload for ContactMessageInput {
    fn into_form_payload(&self) -> FormPayload {
        FormPayload::new()
            .text("name", self.name.as_str())
            .text("email", self.email.as_str())
            .optional_text("phone", self.phone.as_deref())
            .optional_text("subject", self.subject.as_deref())
            .text("message", self.message.as_str())
    }
}
