//! Back-navigation interceptor.
//!
//! Catches the browser back/forward gesture that would carry a signed-in user
//! from a private page onto a public one, undoes it with a forward step and
//! asks whether they meant to log out. The forward step itself shows up as
//! one more history navigation, which is absorbed.

use crate::guard::{flags::PersistedGuardFlags, intent::NavigationType, paths};
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct InterceptorState {
    pub previous_path: Option<String>,
    /// Set after a counter-navigation; swallows the history event it causes.
    #[serde(default)]
    pub absorb_next: bool,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NavigationEvent {
    pub path: String,
    #[serde(default)]
    pub kind: NavigationType,
}

impl NavigationEvent {
    #[must_use]
    pub fn new(path: impl Into<String>, kind: NavigationType) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum InterceptOutcome {
    /// Our own corrective navigation came back; nothing to do.
    Absorbed,
    /// Ordinary navigation.
    Recorded,
    /// Counter-navigate forward and show the logout prompt.
    Intercepted,
}

impl InterceptorState {
    /// Classify one navigation event and update state and flags accordingly.
    pub fn on_navigation(
        &mut self,
        flags: &mut PersistedGuardFlags,
        event: &NavigationEvent,
    ) -> InterceptOutcome {
        let is_browser_history_nav = event.kind.is_browser_history();

        if std::mem::take(&mut self.absorb_next) && is_browser_history_nav {
            debug!(path = %event.path, "absorbing corrective navigation");
            self.record(&event.path);
            return InterceptOutcome::Absorbed;
        }

        let Some(previous_path) = self.previous_path.as_deref() else {
            self.record(&event.path);
            return InterceptOutcome::Recorded;
        };

        let session_was_active = flags.session_active;
        let landed_on_public = paths::is_public(&event.path);
        let came_from_private = !paths::is_public(previous_path);
        let dialog_already_shown = flags.logout_dialog_shown;

        if is_browser_history_nav
            && session_was_active
            && landed_on_public
            && came_from_private
            && !dialog_already_shown
        {
            debug!(
                from = previous_path,
                to = %event.path,
                "intercepting history navigation out of the private area"
            );
            flags.mark_dialog_shown();
            self.absorb_next = true;
            return InterceptOutcome::Intercepted;
        }

        if !is_browser_history_nav {
            flags.clear_dialog();
        }
        self.record(&event.path);
        InterceptOutcome::Recorded
    }

    fn record(&mut self, path: &str) {
        self.previous_path = Some(paths::normalize(path).to_string());
    }
}
