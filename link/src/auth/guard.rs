use super::state::Session;

/// Outcome of checking a session against a protected location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Show the protected content unchanged.
    Render,
    /// Send the visitor to `to`; `return_to` is where to go after signing in.
    Redirect { to: String, return_to: String },
    /// Signed in, but without the required privilege.
    Forbidden,
}

impl GuardDecision {
    pub fn is_render(&self) -> bool {
        matches!(self, GuardDecision::Render)
    }
}

/// Pure gate in front of admin views. Never touches the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteGuard {
    login_path: String,
}

impl Default for RouteGuard {
    fn default() -> Self {
        Self::new("/login")
    }
}

impl RouteGuard {
    pub fn new(login_path: impl Into<String>) -> Self {
        Self {
            login_path: login_path.into(),
        }
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    pub fn check(&self, session: &Session, target: &str) -> GuardDecision {
        if session.is_authenticated() {
            GuardDecision::Render
        } else {
            GuardDecision::Redirect {
                to: self.login_path.clone(),
                return_to: target.to_string(),
            }
        }
    }

    /// Like [`check`](Self::check), additionally requiring the user's first
    /// role to be `slug`.
    pub fn check_role(&self, session: &Session, target: &str, slug: &str) -> GuardDecision {
        match self.check(session, target) {
            GuardDecision::Render => {
                let allowed = session
                    .user
                    .as_ref()
                    .map_or(false, |user| user.has_privilege(slug));
                if allowed {
                    GuardDecision::Render
                } else {
                    GuardDecision::Forbidden
                }
            }
            other => other,
        }
    }
}
