//! API handlers for the guard decision service.
//!
//! The browser shell keeps its `GuardState` and sends it with every call; the
//! handlers resolve the session against the auth provider, run the guard and
//! return the next state alongside the decision.

pub mod guard;
pub mod health;

use axum::http::{HeaderMap, header::AUTHORIZATION};
use secrecy::SecretString;

/// Extract a bearer access token. Missing or malformed headers mean "no
/// session" rather than an error.
pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<SecretString> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    if token.is_empty() {
        None
    } else {
        Some(SecretString::from(token.to_string()))
    }
}
