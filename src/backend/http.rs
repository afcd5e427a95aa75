//! `reqwest` client for a GoTrue-style hosted auth API.
//!
//! Every request carries the project's anon key in `apikey`; user-scoped
//! requests add the caller's access token as a bearer credential. The access
//! token is never logged.

use super::{AuthBackend, BackendError, BackendFuture, token, truncate_message};
use crate::guard::session::AssuranceLevel;
use reqwest::{Client, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;
use tracing::{Instrument, debug, info_span};
use url::Url;

#[derive(Deserialize)]
struct UserResponse {
    id: String,
}

#[derive(Clone, Debug)]
pub struct HttpAuthBackend {
    client: Client,
    auth_url: String,
    anon_key: SecretString,
}

impl HttpAuthBackend {
    /// Build a client for `auth_url` (e.g. `https://project.example.co/auth/v1`).
    ///
    /// # Errors
    /// Returns an error if the URL is not http(s) or the HTTP client cannot be built.
    pub fn new(
        auth_url: &str,
        anon_key: SecretString,
        timeout: Duration,
    ) -> Result<Self, BackendError> {
        let parsed = Url::parse(auth_url).map_err(|err| BackendError::Url(err.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(BackendError::Url(format!(
                "unsupported scheme: {}",
                parsed.scheme()
            )));
        }

        let client = Client::builder()
            .user_agent(crate::APP_USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            auth_url: auth_url.trim().trim_end_matches('/').to_string(),
            anon_key,
        })
    }

    #[must_use]
    pub fn auth_url(&self) -> &str {
        &self.auth_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.auth_url, path.trim_start_matches('/'))
    }

    async fn fetch_user(&self, access_token: &SecretString) -> Result<Option<String>, BackendError> {
        let response = self
            .client
            .get(self.endpoint("/user"))
            .header("apikey", self.anon_key.expose_secret())
            .bearer_auth(access_token.expose_secret())
            .send()
            .instrument(info_span!("auth.user", http.method = "GET"))
            .await?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                debug!(status = %response.status(), "access token rejected");
                Ok(None)
            }
            status if status.is_success() => {
                let user: UserResponse = response.json().await?;
                Ok(Some(user.id))
            }
            _ => Err(status_error(response).await),
        }
    }

    async fn logout(&self, access_token: &SecretString) -> Result<(), BackendError> {
        let response = self
            .client
            .post(self.endpoint("/logout"))
            .header("apikey", self.anon_key.expose_secret())
            .bearer_auth(access_token.expose_secret())
            .send()
            .instrument(info_span!("auth.logout", http.method = "POST"))
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(status_error(response).await)
        }
    }

    async fn health(&self) -> Result<(), BackendError> {
        let response = self
            .client
            .get(self.endpoint("/health"))
            .header("apikey", self.anon_key.expose_secret())
            .send()
            .instrument(info_span!("auth.health", http.method = "GET"))
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(status_error(response).await)
        }
    }
}

async fn status_error(response: Response) -> BackendError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    BackendError::Status {
        status,
        message: truncate_message(&body),
    }
}

impl AuthBackend for HttpAuthBackend {
    fn current_user<'a>(
        &'a self,
        access_token: &'a SecretString,
    ) -> BackendFuture<'a, Option<String>> {
        Box::pin(self.fetch_user(access_token))
    }

    fn assurance_level<'a>(
        &'a self,
        access_token: &'a SecretString,
    ) -> BackendFuture<'a, AssuranceLevel> {
        Box::pin(async move { token::assurance_from_access_token(access_token.expose_secret()) })
    }

    fn sign_out<'a>(&'a self, access_token: &'a SecretString) -> BackendFuture<'a, ()> {
        Box::pin(self.logout(access_token))
    }

    fn ping(&self) -> BackendFuture<'_, ()> {
        Box::pin(self.health())
    }
}
