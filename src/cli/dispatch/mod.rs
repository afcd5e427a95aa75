use crate::cli::{
    actions::{Action, server::Args},
    commands::{
        ARG_PORT,
        backend::{ARG_ANON_KEY, ARG_AUTH_URL, ARG_BACKEND_TIMEOUT, ARG_FRONTEND_BASE_URL},
    },
};
use anyhow::{Context, Result};
use secrecy::SecretString;

/// # Errors
/// Returns an error if a required argument is missing.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8080);

    let auth_url = matches
        .get_one::<String>(ARG_AUTH_URL)
        .cloned()
        .context("missing required argument: --auth-url")?;

    let anon_key = matches
        .get_one::<String>(ARG_ANON_KEY)
        .cloned()
        .map(SecretString::from)
        .context("missing required argument: --anon-key")?;

    let backend_timeout_seconds = matches
        .get_one::<u64>(ARG_BACKEND_TIMEOUT)
        .copied()
        .unwrap_or(10);

    let frontend_base_url = matches
        .get_one::<String>(ARG_FRONTEND_BASE_URL)
        .cloned()
        .unwrap_or_else(|| "http://localhost:3000".to_string());

    Ok(Action::Server(Args {
        port,
        auth_url,
        anon_key,
        backend_timeout_seconds,
        frontend_base_url,
    }))
}
