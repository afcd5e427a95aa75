//! Effects the guard asks for, and an executor that carries them out.
//!
//! Decision code only ever returns `Vec<Effect>`; anything that touches the
//! browser goes through [`Navigator`] and anything that touches the provider
//! goes through [`AuthBackend`].

use crate::{
    backend::AuthBackend,
    guard::admission::RedirectState,
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};
use utoipa::ToSchema;

/// Copy of the back-navigation confirmation dialog.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LogoutDialog {
    pub title: String,
    pub body: String,
    pub confirm_label: String,
    pub cancel_label: String,
}

impl Default for LogoutDialog {
    fn default() -> Self {
        Self {
            title: "Log out?".to_string(),
            body: "Going back will end your session. Do you want to log out?".to_string(),
            confirm_label: "Log out".to_string(),
            cancel_label: "Stay signed in".to_string(),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Effect {
    Navigate {
        to: String,
        #[serde(default)]
        replace: bool,
        #[serde(default)]
        state: Option<RedirectState>,
    },
    /// Move through browser history without pushing a new entry.
    HistoryGo { delta: i32 },
    ShowLogoutDialog { dialog: LogoutDialog },
    DismissLogoutDialog,
    /// End the session with the auth provider.
    SignOut,
}

impl Effect {
    #[must_use]
    pub fn navigate(to: impl Into<String>) -> Self {
        Self::Navigate {
            to: to.into(),
            replace: false,
            state: None,
        }
    }

    /// Whether the browser shell has to perform this effect.
    #[must_use]
    pub const fn is_client_side(&self) -> bool {
        !matches!(self, Self::SignOut)
    }
}

/// Browser navigation and dialog surface.
pub trait Navigator: Send + Sync {
    fn navigate(&self, to: &str, replace: bool, state: Option<&RedirectState>);
    fn go(&self, delta: i32);
    fn show_logout_dialog(&self, dialog: &LogoutDialog);
    fn dismiss_logout_dialog(&self);
}

/// End the session with the provider. Failures are logged and swallowed: by
/// the time this runs the user has already been navigated away.
#[instrument(skip_all)]
pub async fn sign_out(backend: &dyn AuthBackend, access_token: Option<&SecretString>) {
    let Some(access_token) = access_token else {
        debug!("no access token, skipping provider sign-out");
        return;
    };
    match backend.sign_out(access_token).await {
        Ok(()) => info!("signed out"),
        Err(err) => error!("Failed to sign out: {err}"),
    }
}

/// Runs effects in order against a navigator and a backend.
pub struct EffectExecutor<'a> {
    navigator: &'a dyn Navigator,
    backend: &'a dyn AuthBackend,
}

impl<'a> EffectExecutor<'a> {
    #[must_use]
    pub fn new(navigator: &'a dyn Navigator, backend: &'a dyn AuthBackend) -> Self {
        Self { navigator, backend }
    }

    /// Apply every effect in order. Navigation effects are issued before any
    /// later sign-out is awaited, so the sign-out outcome never holds them up.
    pub async fn run(&self, effects: &[Effect], access_token: Option<&SecretString>) {
        for effect in effects {
            match effect {
                Effect::Navigate { to, replace, state } => {
                    self.navigator.navigate(to, *replace, state.as_ref());
                }
                Effect::HistoryGo { delta } => self.navigator.go(*delta),
                Effect::ShowLogoutDialog { dialog } => self.navigator.show_logout_dialog(dialog),
                Effect::DismissLogoutDialog => self.navigator.dismiss_logout_dialog(),
                Effect::SignOut => sign_out(self.backend, access_token).await,
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::guard::session::{AssuranceLevel, tests::FakeBackend};
    use std::sync::Mutex;

    /// Records every call, in order.
    #[derive(Default)]
    pub(crate) struct RecordingNavigator {
        pub calls: Mutex<Vec<String>>,
    }

    impl RecordingNavigator {
        pub(crate) fn calls(&self) -> Vec<String> {
            self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
        }

        fn push(&self, call: String) {
            if let Ok(mut calls) = self.calls.lock() {
                calls.push(call);
            }
        }
    }

    impl Navigator for RecordingNavigator {
        fn navigate(&self, to: &str, replace: bool, _state: Option<&RedirectState>) {
            self.push(format!("navigate {to} replace={replace}"));
        }

        fn go(&self, delta: i32) {
            self.push(format!("go {delta}"));
        }

        fn show_logout_dialog(&self, dialog: &LogoutDialog) {
            self.push(format!("show {}", dialog.title));
        }

        fn dismiss_logout_dialog(&self) {
            self.push("dismiss".to_string());
        }
    }

    #[test]
    fn dialog_copy_is_fixed() {
        let dialog = LogoutDialog::default();
        assert_eq!(dialog.title, "Log out?");
        assert_eq!(dialog.confirm_label, "Log out");
        assert_eq!(dialog.cancel_label, "Stay signed in");
    }

    #[test]
    fn effects_serialize_with_type_tag() -> Result<(), serde_json::Error> {
        let json = serde_json::to_value(Effect::HistoryGo { delta: 1 })?;
        assert_eq!(json["type"], "history_go");
        assert_eq!(json["delta"], 1);
        Ok(())
    }

    #[test]
    fn only_sign_out_is_server_side() {
        assert!(!Effect::SignOut.is_client_side());
        assert!(Effect::navigate("/").is_client_side());
        assert!(Effect::DismissLogoutDialog.is_client_side());
    }

    #[tokio::test]
    async fn executor_runs_effects_in_order() {
        let navigator = RecordingNavigator::default();
        let backend = FakeBackend::signed_in(AssuranceLevel::MultiFactorConfirmed);
        let executor = EffectExecutor::new(&navigator, &backend);
        executor
            .run(
                &[
                    Effect::HistoryGo { delta: 1 },
                    Effect::ShowLogoutDialog {
                        dialog: LogoutDialog::default(),
                    },
                ],
                None,
            )
            .await;
        assert_eq!(navigator.calls(), vec!["go 1", "show Log out?"]);
    }

    #[tokio::test]
    async fn navigation_happens_even_when_sign_out_fails() {
        let navigator = RecordingNavigator::default();
        let mut backend = FakeBackend::signed_in(AssuranceLevel::MultiFactorConfirmed);
        backend.sign_out_fails = true;
        let token = SecretString::from("access-token");

        EffectExecutor::new(&navigator, &backend)
            .run(&[Effect::navigate("/"), Effect::SignOut], Some(&token))
            .await;

        assert_eq!(navigator.calls(), vec!["navigate / replace=false"]);
        assert_eq!(backend.sign_out_count(), 1);
    }

    #[tokio::test]
    async fn sign_out_without_token_skips_provider() {
        let backend = FakeBackend::signed_in(AssuranceLevel::MultiFactorConfirmed);
        sign_out(&backend, None).await;
        assert_eq!(backend.sign_out_count(), 0);
    }
}
