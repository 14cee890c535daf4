use crate::api::Api;
use crate::endpoints;
use crate::error::{LinkError, Result};
use crate::models::{LoginRequest, LoginResponse, User, UserUpdate};
use crate::storage::{Persistence, USER_KEY};
use crate::token_store::{TokenPair, TokenStore};
use tokio::sync::watch;

/// Snapshot of who is signed in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub user: Option<User>,
    pub token: Option<String>,
}

impl Session {
    /// True iff both a user and an access token are present.
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some() && self.token.is_some()
    }

    pub fn anonymous() -> Self {
        Self::default()
    }
}

/// Process-wide authentication state.
///
/// The persisted user record and the token store are only ever written
/// through [`set_credentials`](Self::set_credentials),
/// [`logout`](Self::logout) and [`update_user`](Self::update_user).
#[derive(Debug)]
pub struct AuthState {
    persistence: Persistence,
    tokens: TokenStore,
    session: watch::Sender<Session>,
}

impl AuthState {
    /// Rebuild the session from durable storage.
    ///
    /// A persisted user that fails to parse is removed and the session starts
    /// anonymous. A missing persistence context yields an anonymous session
    /// whose credentials are then kept in memory for the process lifetime,
    /// so the token store still hands the client a bearer token.
    pub fn restore(persistence: Persistence) -> Self {
        let persistence = if persistence.is_available() {
            persistence
        } else {
            log::debug!("[AUTH] No persistence context, keeping the session in memory");
            Persistence::in_memory()
        };
        let tokens = TokenStore::new(persistence.clone());
        let user = match persistence.get(USER_KEY) {
            Some(raw) => match serde_json::from_str::<User>(&raw) {
                Ok(user) => Some(user),
                Err(e) => {
                    log::warn!("[AUTH] Discarding corrupted persisted user: {}", e);
                    persistence.remove(USER_KEY);
                    None
                }
            },
            None => None,
        };
        let session = Session {
            user,
            token: tokens.get_access_token(),
        };
        log::debug!(
            "[AUTH] Restored session authenticated={}",
            session.is_authenticated()
        );
        let (session, _) = watch::channel(session);

        Self {
            persistence,
            tokens,
            session,
        }
    }

    /// Token store sharing this state's persistence. Hand it to the
    /// [`ApiClient`](crate::ApiClient) so requests carry the session token.
    pub fn token_store(&self) -> &TokenStore {
        &self.tokens
    }

    pub fn session(&self) -> Session {
        self.session.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.borrow().is_authenticated()
    }

    /// Observe session changes.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.session.subscribe()
    }

    /// Persist the user and tokens and become authenticated.
    pub fn set_credentials(&self, user: User, tokens: TokenPair) {
        match serde_json::to_string(&user) {
            Ok(json) => self.persistence.set(USER_KEY, &json),
            Err(e) => log::warn!("[AUTH] Could not serialize user for persistence: {}", e),
        }
        self.tokens.set_pair(&tokens);
        log::info!("[AUTH] Signed in as {}", user.email);

        self.session.send_replace(Session {
            user: Some(user),
            token: Some(tokens.access_token),
        });
    }

    /// Forget the user and tokens, in memory and in storage.
    pub fn logout(&self) {
        self.persistence.remove(USER_KEY);
        self.tokens.clear_tokens();
        log::info!("[AUTH] Signed out");
        self.session.send_replace(Session::anonymous());
    }

    /// Merge `update` into the signed-in user and persist the result.
    ///
    /// Returns `false` and changes nothing while anonymous.
    pub fn update_user(&self, update: UserUpdate) -> bool {
        let mut updated = None;
        self.session.send_if_modified(|session| {
            if !session.is_authenticated() {
                return false;
            }
            let Some(user) = session.user.as_mut() else {
                return false;
            };
            user.apply(update);
            updated = Some(user.clone());
            true
        });

        let Some(user) = updated else {
            log::debug!("[AUTH] Ignoring user update while signed out");
            return false;
        };
        match serde_json::to_string(&user) {
            Ok(json) => self.persistence.set(USER_KEY, &json),
            Err(e) => log::warn!("[AUTH] Could not serialize user for persistence: {}", e),
        }
        true
    }

    /// Sign in with email and password.
    ///
    /// Previously cached queries belong to the old identity and are dropped.
    pub async fn login(&self, api: &Api, email: &str, password: &str) -> Result<User> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response: LoginResponse = api
            .mutate_as(&endpoints::auth::login(), &request)
            .await
            .map_err(|e| match e {
                LinkError::ServerError {
                    status_code: 401 | 422,
                    message,
                } => LinkError::AuthenticationError(message),
                other => other,
            })?;

        let tokens = response.token_pair();
        self.set_credentials(response.user.clone(), tokens);
        api.reset();
        Ok(response.user)
    }

    /// Tell the server to revoke the token, then sign out locally.
    ///
    /// The local sign-out happens even when the server call fails.
    pub async fn logout_remote(&self, api: &Api) {
        if self.tokens.has_token() {
            if let Err(e) = api.mutate(&endpoints::auth::logout(), &()).await {
                log::warn!("[AUTH] Server-side logout failed: {}", e);
            }
        }
        self.logout();
        api.reset();
    }

    /// Fetch `/profile` and merge it into the signed-in user.
    ///
    /// Returns the updated user, or `None` when signed out.
    pub async fn refresh_profile(&self, api: &Api) -> Result<Option<User>> {
        if !self.is_authenticated() {
            return Ok(None);
        }
        let profile: User = api.query_as(&endpoints::auth::profile(), &()).await?;
        if self.update_user(UserUpdate::from_user(&profile)) {
            Ok(self.session().user)
        } else {
            Ok(None)
        }
    }
}
