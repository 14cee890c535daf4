//! `/login`, `/logout` and `/profile`.
//!
//! These bypass the resource tags: signing in or out resets the whole cache
//! (see [`AuthState`](crate::AuthState)), so nothing needs invalidating.

use crate::cache::tags::Tag;
use crate::endpoint::{MutationEndpoint, QueryEndpoint};
use crate::models::LoginRequest;
use crate::request::ApiRequest;

pub const PROFILE_KIND: &str = "Profile";

pub fn login() -> MutationEndpoint<LoginRequest> {
    MutationEndpoint::new("Auth.login", |request: &LoginRequest| {
        ApiRequest::post("login").with_json(request)
    })
}

pub fn logout() -> MutationEndpoint<()> {
    MutationEndpoint::new("Auth.logout", |_: &()| Ok(ApiRequest::post("logout")))
        .invalidates(|_, _| vec![Tag::any(PROFILE_KIND)])
}

pub fn profile() -> QueryEndpoint<()> {
    QueryEndpoint::new("Auth.profile", |_: &()| ApiRequest::get("profile"))
        .provides(|_, _| vec![Tag::list(PROFILE_KIND)])
}
