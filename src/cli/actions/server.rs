use crate::{api, backend::HttpAuthBackend};
use anyhow::{Context, Result};
use secrecy::SecretString;
use std::{fmt::Write as _, sync::Arc, time::Duration};
use tracing::info;
use url::Url;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub auth_url: String,
    pub anon_key: SecretString,
    pub backend_timeout_seconds: u64,
    pub frontend_base_url: String,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the auth client cannot be built or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    log_startup_args(&args);

    let backend = HttpAuthBackend::new(
        &args.auth_url,
        args.anon_key,
        Duration::from_secs(args.backend_timeout_seconds),
    )
    .context("Failed to build auth provider client")?;

    api::new(args.port, Arc::new(backend), &args.frontend_base_url).await
}

fn log_startup_args(args: &Args) {
    let entries = [
        ("listen", format!("tcp:{}", args.port)),
        ("auth_url", redact_url(&args.auth_url)),
        ("anon_key", "REDACTED".to_string()),
        (
            "backend_timeout",
            format!("{}s", args.backend_timeout_seconds),
        ),
        ("frontend_base_url", args.frontend_base_url.clone()),
    ];
    info!("{}", startup_message(&entries));
}

// Userinfo in the URL would leak credentials into the logs.
fn redact_url(url: &str) -> String {
    match Url::parse(url) {
        Ok(mut parsed) => {
            if parsed.password().is_some() {
                let _ = parsed.set_password(Some("REDACTED"));
            }
            parsed.to_string()
        }
        Err(_) => "invalid-url".to_string(),
    }
}

fn startup_message(entries: &[(&str, String)]) -> String {
    let max_key_len = entries.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    let mut message = format!(
        "{} {} - {}\n\nStartup configuration:",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        short_commit(crate::GIT_COMMIT_HASH)
    );
    for (key, value) in entries {
        let padding = " ".repeat(max_key_len.saturating_sub(key.len()));
        let _ = write!(message, "\n  {key}:{padding} {value}");
    }
    message
}

fn short_commit(hash: &str) -> &str {
    let trimmed = hash.trim();
    trimmed.get(..7).unwrap_or(trimmed)
}
