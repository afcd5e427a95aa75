//! # Praxis Guard
//!
//! Session-elevation guard for the practice-management web app.
//!
//! The guard decides, for every route the browser wants to show, whether it
//! may render, must wait, or has to redirect. A session only unlocks private
//! routes once its multi-factor step is confirmed; a first-factor-only
//! session goes back to `/login` to finish. It also catches the browser back
//! button when it would carry a signed-in user from a private page onto a
//! public one, and asks before ending the session.
//!
//! ## Layout
//!
//! - [`guard`]: the decision logic. Pure and synchronous; operations return
//!   effects instead of performing them.
//! - [`backend`]: the auth provider seam ([`backend::AuthBackend`]) and its
//!   HTTP client.
//! - [`api`]: a stateless HTTP service exposing the guard to the browser
//!   shell, which keeps the per-tab `GuardState` and posts it with each call.
//! - [`cli`]: argument parsing, telemetry and the `server` action.
//!
//! ## Fail-closed resolution
//!
//! A provider error while reading the identity yields an anonymous session,
//! and an error while reading the assurance level yields `SingleFactor`.
//! Either way the user is sent to `/login` instead of being let through.

pub mod api;
pub mod backend;
pub mod cli;
pub mod guard;

pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_hash_is_hex_or_unknown() {
        if GIT_COMMIT_HASH == "unknown" {
            return;
        }
        assert!(GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(GIT_COMMIT_HASH.len() >= 7);
    }

    #[test]
    fn user_agent_names_the_package() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.ends_with(env!("CARGO_PKG_VERSION")));
    }
}
