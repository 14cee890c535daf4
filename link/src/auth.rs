//! Session state and route protection.
//!
//! [`AuthState`] owns the signed-in user and drives the token store;
//! [`RouteGuard`] decides, without side effects, whether a session may see a
//! protected location.

mod guard;
mod state;

pub use guard::{GuardDecision, RouteGuard};
pub use state::{AuthState, Session};
