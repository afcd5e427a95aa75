//! Authentication and session-elevation guard.
//!
//! Everything a browser tab needs to remember lives in one [`GuardState`]
//! value owned by the application root; [`GuardContext`] wraps it together
//! with the [`SessionObserver`] and exposes the guard's operations. All
//! methods are synchronous and return effects instead of performing them, so
//! the whole guard can be driven without a browser.

pub mod admission;
pub mod effects;
pub mod flags;
pub mod intent;
pub mod interceptor;
pub mod paths;
pub mod session;

use self::{
    admission::{AdmissionState, Decision},
    effects::{Effect, LogoutDialog},
    flags::PersistedGuardFlags,
    intent::{LoginGrace, NavigationIntent},
    interceptor::{InterceptOutcome, InterceptorState, NavigationEvent},
    session::{ResolutionTicket, Session, SessionObserver},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use utoipa::ToSchema;

/// Per-tab guard state. Survives reloads when the shell persists it; wiped by
/// a confirmed logout.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GuardState {
    #[serde(default)]
    pub flags: PersistedGuardFlags,
    /// Armed by a completed login, consumed by the first settled admission.
    #[serde(default)]
    pub grace: LoginGrace,
    #[serde(default)]
    pub interceptor: InterceptorState,
    #[serde(default)]
    pub admission: AdmissionState,
}

#[derive(Debug, Default)]
pub struct GuardContext {
    state: GuardState,
    observer: SessionObserver,
}

impl GuardContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume from state persisted by the shell.
    #[must_use]
    pub fn from_state(state: GuardState) -> Self {
        Self {
            state,
            observer: SessionObserver::new(),
        }
    }

    #[must_use]
    pub const fn state(&self) -> &GuardState {
        &self.state
    }

    #[must_use]
    pub fn into_state(self) -> GuardState {
        self.state
    }

    #[must_use]
    pub const fn session(&self) -> &Session {
        self.observer.session()
    }

    /// The login flow finished: remember that a session exists in this tab
    /// and let the next admission through while the level settles.
    pub fn record_login(&mut self) {
        self.state.flags.mark_session_active();
        self.state.grace = LoginGrace::armed();
        info!("login recorded, grace armed");
    }

    /// A login was just recorded and no admission has leaned on it yet, so
    /// the next resolution may stop at the identity and let the grace render
    /// while the level is fetched on the following call.
    #[must_use]
    pub fn awaits_grace_render(&self) -> bool {
        self.state.grace.is_armed()
            && !matches!(self.state.admission, AdmissionState::JustLoggedInGrace)
    }

    pub fn begin_resolution(&mut self) -> ResolutionTicket {
        self.observer.begin()
    }

    /// Apply a resolved session. An authenticated identity marks the tab's
    /// session as active.
    pub fn apply_resolution(&mut self, ticket: ResolutionTicket, session: Session) -> bool {
        let authenticated = session.is_authenticated();
        let applied = self.observer.apply(ticket, session);
        if applied && authenticated {
            self.state.flags.mark_session_active();
        }
        applied
    }

    /// Decide whether the intent's route may render. Any grace held by the
    /// context is moved into the intent; whatever the evaluation did not
    /// consume is kept for the next one.
    pub fn admit(&mut self, mut intent: NavigationIntent) -> Decision {
        intent.just_completed_login.merge(self.state.grace.transfer());

        let next = admission::evaluate(&self.state.admission, &mut intent, self.observer.session());
        if next != self.state.admission {
            debug!(
                path = %intent.target_path,
                from = ?self.state.admission,
                to = ?next,
                "admission state changed"
            );
        }

        self.state.grace = intent.just_completed_login.transfer();
        self.state.admission = next;
        self.state.admission.decision()
    }

    /// Feed one navigation event to the back-navigation interceptor.
    pub fn navigate(&mut self, event: &NavigationEvent) -> (InterceptOutcome, Vec<Effect>) {
        let GuardState {
            flags, interceptor, ..
        } = &mut self.state;
        let outcome = interceptor.on_navigation(flags, event);
        let effects = match outcome {
            InterceptOutcome::Intercepted => vec![
                Effect::HistoryGo { delta: 1 },
                Effect::ShowLogoutDialog {
                    dialog: LogoutDialog::default(),
                },
            ],
            InterceptOutcome::Absorbed | InterceptOutcome::Recorded => Vec::new(),
        };
        (outcome, effects)
    }

    /// The user confirmed the logout prompt. Navigation to the landing page
    /// comes first; the sign-out follows without anything waiting on it.
    pub fn confirm_logout(&mut self) -> Vec<Effect> {
        self.state.flags.purge();
        self.state.grace = LoginGrace::default();
        self.state.interceptor = InterceptorState::default();
        self.state.admission = AdmissionState::default();
        info!("logout confirmed");
        vec![
            Effect::DismissLogoutDialog,
            Effect::navigate(paths::LANDING),
            Effect::SignOut,
        ]
    }

    /// The user chose to stay. Only the dialog marker is cleared so the next
    /// qualifying back gesture prompts again.
    pub fn cancel_logout(&mut self) -> Vec<Effect> {
        self.state.flags.clear_dialog();
        debug!("logout cancelled");
        vec![Effect::DismissLogoutDialog]
    }
}
