use serde::{Deserialize, Serialize};

/// Role attached to a staff account. Only the slug matters client-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

/// Authenticated staff member as returned by `/login` and `/profile`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_verified_at: Option<String>,

    #[serde(default)]
    pub is_suspended: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suspended_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suspension_reason: Option<String>,

    /// Ordered; the first role decides the privilege level
    #[serde(default)]
    pub roles: Vec<Role>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl User {
    /// Slug of the first role, or `None` for an account without roles.
    pub fn privilege(&self) -> Option<&str> {
        self.roles.first().map(|r| r.slug.as_str())
    }

    pub fn has_privilege(&self, slug: &str) -> bool {
        self.privilege() == Some(slug)
    }

    pub fn is_admin(&self) -> bool {
        self.has_privilege("admin")
    }

    /// Merge the present fields of `update` into this user.
    pub fn apply(&mut self, update: UserUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(email) = update.email {
            self.email = email;
        }
        if let Some(verified) = update.email_verified_at {
            self.email_verified_at = verified;
        }
        if let Some(is_suspended) = update.is_suspended {
            self.is_suspended = is_suspended;
        }
        if let Some(suspended_at) = update.suspended_at {
            self.suspended_at = suspended_at;
        }
        if let Some(reason) = update.suspension_reason {
            self.suspension_reason = reason;
        }
        if let Some(roles) = update.roles {
            self.roles = roles;
        }
        if let Some(updated_at) = update.updated_at {
            self.updated_at = Some(updated_at);
        }
    }
}

/// Partial user fields for [`AuthState::update_user`](crate::AuthState::update_user).
///
/// Nullable fields are doubly optional: `Some(None)` clears the value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_verified_at: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_suspended: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suspended_at: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suspension_reason: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<Role>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl UserUpdate {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Every field of a freshly fetched profile.
    pub fn from_user(user: &User) -> Self {
        Self {
            name: Some(user.name.clone()),
            email: Some(user.email.clone()),
            email_verified_at: Some(user.email_verified_at.clone()),
            is_suspended: Some(user.is_suspended),
            suspended_at: Some(user.suspended_at.clone()),
            suspension_reason: Some(user.suspension_reason.clone()),
            roles: Some(user.roles.clone()),
            updated_at: user.updated_at.clone(),
        }
    }
}
