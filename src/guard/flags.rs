use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Markers that survive a reload of the tab but not a sign-out.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PersistedGuardFlags {
    /// A user was authenticated at some point in this tab.
    pub session_active: bool,
    /// The back-navigation prompt is up for the current gesture.
    pub logout_dialog_shown: bool,
}

impl PersistedGuardFlags {
    pub fn mark_session_active(&mut self) {
        self.session_active = true;
    }

    pub fn mark_dialog_shown(&mut self) {
        self.logout_dialog_shown = true;
    }

    /// Re-arm the prompt without touching `session_active`.
    pub fn clear_dialog(&mut self) {
        self.logout_dialog_shown = false;
    }

    /// Confirmed logout: forget everything.
    pub fn purge(&mut self) {
        *self = Self::default();
    }
}
