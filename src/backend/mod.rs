//! Hosted auth provider collaborator.
//!
//! The guard only needs three things from the provider: who the bearer of an
//! access token is, how strongly that bearer authenticated, and a way to end
//! the session. [`AuthBackend`] is the seam; [`http::HttpAuthBackend`] talks to
//! a GoTrue-style REST API and tests plug in fakes.

pub mod http;
pub mod token;

pub use self::http::HttpAuthBackend;

use crate::guard::session::AssuranceLevel;
use secrecy::SecretString;
use std::{future::Future, pin::Pin};
use thiserror::Error;

/// Maximum number of error body characters kept in [`BackendError::Status`].
pub(crate) const MAX_ERROR_CHARS: usize = 200;

pub type BackendFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, BackendError>> + Send + 'a>>;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("invalid auth url: {0}")]
    Url(String),
    #[error("unable to reach the auth provider: {0}")]
    Network(String),
    #[error("auth provider request timed out")]
    Timeout,
    #[error("auth provider returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("malformed auth provider response: {0}")]
    Response(String),
    #[error("malformed access token: {0}")]
    Token(&'static str),
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Response(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

/// Request/response view of the hosted auth provider.
pub trait AuthBackend: Send + Sync {
    /// Resolve the identity behind an access token.
    /// `Ok(None)` means the provider does not recognize the token.
    fn current_user<'a>(&'a self, access_token: &'a SecretString)
    -> BackendFuture<'a, Option<String>>;

    /// Assurance level the token was issued with.
    fn assurance_level<'a>(&'a self, access_token: &'a SecretString)
    -> BackendFuture<'a, AssuranceLevel>;

    /// End the session behind the token.
    fn sign_out<'a>(&'a self, access_token: &'a SecretString) -> BackendFuture<'a, ()>;

    /// Reachability probe used by `/health`.
    fn ping(&self) -> BackendFuture<'_, ()>;
}

/// Truncate a response body so provider errors never flood logs.
pub(crate) fn truncate_message(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() > MAX_ERROR_CHARS {
        let mut message: String = trimmed.chars().take(MAX_ERROR_CHARS).collect();
        message.push('…');
        message
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_message_keeps_short_bodies() {
        assert_eq!(truncate_message("  invalid JWT \n"), "invalid JWT");
    }

    #[test]
    fn truncate_message_caps_long_bodies() {
        let body = "x".repeat(MAX_ERROR_CHARS + 50);
        let message = truncate_message(&body);
        assert_eq!(message.chars().count(), MAX_ERROR_CHARS + 1);
        assert!(message.ends_with('…'));
    }

    #[test]
    fn backend_error_display() {
        let err = BackendError::Status {
            status: 500,
            message: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "auth provider returned 500: boom");
        assert_eq!(
            BackendError::Token("missing aal claim").to_string(),
            "malformed access token: missing aal claim"
        );
    }
}
