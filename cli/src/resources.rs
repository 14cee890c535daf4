//! Resource catalog addressable from the command line.
//!
//! Maps the names an admin types (`blogs`, `installment-rules`, ...) onto the
//! link's endpoint descriptors. Records are handled as raw JSON so every
//! resource renders through the same formatter.

use medisite_link::endpoints::{
    Resource, BLOGS, CAREERS, CONTACT_MESSAGES, DIRECTORS, DOCTORS, GALLERIES,
    INSTALLMENT_RULES, NEWS, PAGE_BANNERS,
};
use medisite_link::FormPayload;
use serde_json::Value as JsonValue;

use crate::error::{CLIError, Result};

/// Which operations the backend accepts for a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Public reads, no writes.
    ReadOnly,
    /// Public reads, admin create/update/delete.
    Writable,
    /// Public create (the contact form), admin reads and delete.
    Inbox,
}

#[derive(Debug, Clone, Copy)]
pub struct ResourceEntry {
    pub name: &'static str,
    pub access: Access,
    /// Columns shown by the table formatter, in order
    pub columns: &'static [&'static str],
    resource: Resource<JsonValue, FormPayload>,
}

impl ResourceEntry {
    fn new<T, I>(
        name: &'static str,
        source: Resource<T, I>,
        access: Access,
        columns: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            access,
            columns,
            resource: Resource::new(source.kind(), source.path()),
        }
    }

    pub fn resource(&self) -> Resource<JsonValue, FormPayload> {
        self.resource
    }

    pub fn kind(&self) -> &'static str {
        self.resource.kind()
    }

    /// Reading needs an admin session.
    pub fn admin_reads(&self) -> bool {
        self.access == Access::Inbox
    }

    pub fn allows_create(&self) -> bool {
        self.access != Access::ReadOnly
    }

    pub fn allows_update(&self) -> bool {
        self.access == Access::Writable
    }

    pub fn allows_delete(&self) -> bool {
        self.access != Access::ReadOnly
    }
}

pub fn catalog() -> Vec<ResourceEntry> {
    vec![
        ResourceEntry::new(
            "blogs",
            BLOGS,
            Access::Writable,
            &["id", "title", "author", "status", "published_at"],
        ),
        ResourceEntry::new(
            "directors",
            DIRECTORS,
            Access::Writable,
            &["id", "name", "designation", "sort_order", "status"],
        ),
        ResourceEntry::new(
            "galleries",
            GALLERIES,
            Access::Writable,
            &["id", "title", "category", "image", "status"],
        ),
        ResourceEntry::new(
            "installment-rules",
            INSTALLMENT_RULES,
            Access::Writable,
            &["id", "title", "min_amount", "max_amount", "months", "interest_rate", "status"],
        ),
        ResourceEntry::new(
            "contact-messages",
            CONTACT_MESSAGES,
            Access::Inbox,
            &["id", "name", "email", "subject", "status", "created_at"],
        ),
        ResourceEntry::new(
            "page-banners",
            PAGE_BANNERS,
            Access::Writable,
            &["id", "page", "title", "image", "status"],
        ),
        ResourceEntry::new(
            "doctors",
            DOCTORS,
            Access::ReadOnly,
            &["id", "name", "designation", "department", "status"],
        ),
        ResourceEntry::new(
            "news",
            NEWS,
            Access::ReadOnly,
            &["id", "title", "published_at", "status"],
        ),
        ResourceEntry::new(
            "careers",
            CAREERS,
            Access::ReadOnly,
            &["id", "title", "department", "location", "deadline", "status"],
        ),
    ]
}

/// Look up a resource by its command-line name. Underscores are accepted in
/// place of dashes.
pub fn find(name: &str) -> Result<ResourceEntry> {
    let wanted = name.trim().to_ascii_lowercase().replace('_', "-");
    let all = catalog();
    all.iter()
        .find(|entry| entry.name == wanted)
        .copied()
        .ok_or_else(|| {
            let names: Vec<&str> = all.iter().map(|entry| entry.name).collect();
            CLIError::ParseError(format!(
                "Unknown resource '{}'. Available: {}",
                name,
                names.join(", ")
            ))
        })
}
