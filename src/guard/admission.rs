//! Route admission filter.
//!
//! [`AdmissionState::next`] is the pure transition `(state, event) -> state`;
//! [`AdmissionState::decision`] maps the resulting state to what the shell
//! should do. Rules for private routes, in priority order:
//!
//! 1. identity still resolving: `Loading`
//! 2. grace armed and level still resolving: `JustLoggedInGrace`
//! 3. no identity: `DeniedNoUser`
//! 4. identity without a confirmed second factor: `DeniedNeedsSecondFactor`
//! 5. otherwise: `Admitted`
//!
//! The grace is consumed as soon as the level settles, whatever it settles
//! to, so it can never admit twice.

use crate::guard::{
    intent::{LoginGrace, NavigationIntent},
    paths,
    session::{AssuranceLevel, Session},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use utoipa::ToSchema;

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AdmissionState {
    #[default]
    Loading,
    JustLoggedInGrace,
    DeniedNoUser {
        from: String,
    },
    DeniedNeedsSecondFactor {
        from: String,
    },
    Admitted,
    /// Public route rendered as-is.
    PublicPassThrough,
    /// Confirmed session landed on `/`.
    LandingRedirect,
}

/// Auxiliary state carried on a login redirect so the login flow can send the
/// user back afterwards.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RedirectState {
    pub from: String,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Decision {
    /// Neutral loading view, no redirect yet.
    Wait,
    Render,
    Redirect {
        to: String,
        state: Option<RedirectState>,
    },
}

/// Inputs to one admission evaluation.
#[derive(Debug)]
pub struct AdmissionEvent<'a> {
    pub target_path: &'a str,
    pub session: &'a Session,
    pub grace: &'a mut LoginGrace,
}

impl AdmissionState {
    /// Compute the next state. The grace is consumed here once the assurance
    /// level is known, on public and private routes alike.
    ///
    /// The result depends on `event` alone. The previous state is read only
    /// to log a grace that is revoked after it already admitted a render.
    #[must_use]
    pub fn next(&self, event: AdmissionEvent<'_>) -> Self {
        let AdmissionEvent {
            target_path,
            session,
            grace,
        } = event;

        if paths::is_public(target_path) {
            if level_settled(session) && grace.take() {
                debug!(path = target_path, "grace consumed on a public route");
            }
            return public_route(target_path, session);
        }

        if session.is_loading && !session.is_authenticated() {
            return Self::Loading;
        }

        let from = paths::normalize(target_path).to_string();

        let Some(user_id) = session.user_id.as_deref() else {
            if grace.take() {
                debug!("grace dropped: no identity behind the login");
            }
            return Self::DeniedNoUser { from };
        };

        match session.assurance_level {
            AssuranceLevel::Unknown if grace.is_armed() => Self::JustLoggedInGrace,
            AssuranceLevel::Unknown => Self::Loading,
            AssuranceLevel::MultiFactorConfirmed => {
                if grace.take() {
                    debug!(user_id, "grace consumed: assurance confirmed");
                }
                Self::Admitted
            }
            AssuranceLevel::SingleFactor => {
                if grace.take() || matches!(self, Self::JustLoggedInGrace) {
                    info!(user_id, "grace revoked: second factor not confirmed");
                }
                Self::DeniedNeedsSecondFactor { from }
            }
        }
    }

    #[must_use]
    pub fn decision(&self) -> Decision {
        match self {
            Self::Loading => Decision::Wait,
            Self::JustLoggedInGrace | Self::Admitted | Self::PublicPassThrough => Decision::Render,
            Self::DeniedNoUser { from } | Self::DeniedNeedsSecondFactor { from } => {
                Decision::Redirect {
                    to: paths::LOGIN.to_string(),
                    state: Some(RedirectState { from: from.clone() }),
                }
            }
            Self::LandingRedirect => Decision::Redirect {
                to: paths::DASHBOARD.to_string(),
                state: None,
            },
        }
    }

    #[must_use]
    pub const fn is_admitted(&self) -> bool {
        matches!(self, Self::Admitted | Self::JustLoggedInGrace)
    }
}

/// Nothing left in flight: either no identity at all, or an identity with a
/// concrete level.
fn level_settled(session: &Session) -> bool {
    !session.is_loading && session.assurance_level != AssuranceLevel::Unknown
}

fn public_route(target_path: &str, session: &Session) -> AdmissionState {
    if paths::is_landing(target_path) && !session.is_loading && session.is_fully_confirmed() {
        AdmissionState::LandingRedirect
    } else {
        AdmissionState::PublicPassThrough
    }
}

/// Evaluate an intent against the current session, consuming the intent's
/// grace when the level has settled. Returns the new state.
pub fn evaluate(
    previous: &AdmissionState,
    intent: &mut NavigationIntent,
    session: &Session,
) -> AdmissionState {
    previous.next(AdmissionEvent {
        target_path: &intent.target_path,
        session,
        grace: &mut intent.just_completed_login,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(intent: &mut NavigationIntent, session: &Session) -> (AdmissionState, Decision) {
        let state = evaluate(&AdmissionState::Loading, intent, session);
        let decision = state.decision();
        (state, decision)
    }

    fn login_redirect(from: &str) -> Decision {
        Decision::Redirect {
            to: "/login".to_string(),
            state: Some(RedirectState {
                from: from.to_string(),
            }),
        }
    }

    #[test]
    fn loading_while_identity_resolves() {
        let mut intent = NavigationIntent::to("/dashboard");
        let (state, decision) = run(&mut intent, &Session::loading());
        assert_eq!(state, AdmissionState::Loading);
        assert_eq!(decision, Decision::Wait);
    }

    #[test]
    fn single_factor_session_is_sent_to_login() {
        let session = Session::authenticated("user-1", AssuranceLevel::SingleFactor);
        let mut intent = NavigationIntent::to("/dashboard");
        let (state, decision) = run(&mut intent, &session);
        assert_eq!(
            state,
            AdmissionState::DeniedNeedsSecondFactor {
                from: "/dashboard".to_string()
            }
        );
        assert_eq!(decision, login_redirect("/dashboard"));
    }

    #[test]
    fn anonymous_login_page_passes_through() {
        let mut intent = NavigationIntent::to("/login");
        let (state, decision) = run(&mut intent, &Session::anonymous());
        assert_eq!(state, AdmissionState::PublicPassThrough);
        assert_eq!(decision, Decision::Render);
    }

    #[test]
    fn confirmed_session_on_landing_goes_to_dashboard() {
        let session = Session::authenticated("user-1", AssuranceLevel::MultiFactorConfirmed);
        let mut intent = NavigationIntent::to("/");
        let (_, decision) = run(&mut intent, &session);
        assert_eq!(
            decision,
            Decision::Redirect {
                to: "/dashboard".to_string(),
                state: None
            }
        );
    }

    #[test]
    fn single_factor_session_on_landing_stays() {
        let session = Session::authenticated("user-1", AssuranceLevel::SingleFactor);
        let mut intent = NavigationIntent::to("/");
        let (_, decision) = run(&mut intent, &session);
        assert_eq!(decision, Decision::Render);
    }

    #[test]
    fn confirmed_session_is_admitted() {
        let session = Session::authenticated("user-1", AssuranceLevel::MultiFactorConfirmed);
        let mut intent = NavigationIntent::to("/clients/42");
        let (state, decision) = run(&mut intent, &session);
        assert_eq!(state, AdmissionState::Admitted);
        assert_eq!(decision, Decision::Render);
    }

    #[test]
    fn repeated_denial_is_stable() {
        let session = Session::anonymous();
        let mut intent = NavigationIntent::to("/payments");
        let first = evaluate(&AdmissionState::Loading, &mut intent, &session);
        let second = evaluate(&first, &mut intent, &session);
        assert_eq!(first, second);
        assert_eq!(first.decision(), login_redirect("/payments"));
        assert_eq!(second.decision(), login_redirect("/payments"));
    }

    #[test]
    fn redirect_carries_normalized_origin() {
        let mut intent = NavigationIntent::to("/clients/7/?tab=notes");
        let (_, decision) = run(&mut intent, &Session::anonymous());
        assert_eq!(decision, login_redirect("/clients/7"));
    }

    #[test]
    fn grace_admits_while_level_resolves() {
        let session = Session::resolving("user-1");
        let mut intent = NavigationIntent::to("/dashboard").after_login();
        let (state, decision) = run(&mut intent, &session);
        assert_eq!(state, AdmissionState::JustLoggedInGrace);
        assert_eq!(decision, Decision::Render);
        // Still pending: nothing settled yet.
        assert!(intent.just_completed_login.is_armed());
    }

    #[test]
    fn grace_is_consumed_on_confirmation() {
        let session = Session::authenticated("user-1", AssuranceLevel::MultiFactorConfirmed);
        let mut intent = NavigationIntent::to("/dashboard").after_login();
        let (state, _) = run(&mut intent, &session);
        assert_eq!(state, AdmissionState::Admitted);
        assert!(!intent.just_completed_login.is_armed());
    }

    #[test]
    fn grace_is_revoked_when_level_settles_single_factor() {
        let resolving = Session::resolving("user-1");
        let mut intent = NavigationIntent::to("/dashboard").after_login();
        let graced = evaluate(&AdmissionState::Loading, &mut intent, &resolving);
        assert_eq!(graced, AdmissionState::JustLoggedInGrace);

        let settled = Session::authenticated("user-1", AssuranceLevel::SingleFactor);
        let denied = evaluate(&graced, &mut intent, &settled);
        assert_eq!(denied.decision(), login_redirect("/dashboard"));
        assert!(!intent.just_completed_login.is_armed());

        // Same navigation again: the grace does not come back.
        let again = evaluate(&denied, &mut intent, &resolving);
        assert_eq!(again, AdmissionState::Loading);
    }

    #[test]
    fn level_failure_never_admits_without_grace() {
        // A failed level lookup surfaces as SingleFactor.
        let session = Session::authenticated("user-1", AssuranceLevel::SingleFactor);
        for path in ["/dashboard", "/clients", "/admin/tenants", "/settings/billing"] {
            let mut intent = NavigationIntent::to(path);
            let (state, _) = run(&mut intent, &session);
            assert!(!state.is_admitted(), "{path} must not be admitted");
        }
    }

    #[test]
    fn grace_without_identity_is_dropped() {
        let mut intent = NavigationIntent::to("/dashboard").after_login();
        let (state, _) = run(&mut intent, &Session::anonymous());
        assert_eq!(
            state,
            AdmissionState::DeniedNoUser {
                from: "/dashboard".to_string()
            }
        );
        assert!(!intent.just_completed_login.is_armed());
    }

    #[test]
    fn public_route_consumes_grace_once_settled() {
        let session = Session::authenticated("user-1", AssuranceLevel::MultiFactorConfirmed);
        let mut intent = NavigationIntent::to("/").after_login();
        let (state, _) = run(&mut intent, &session);
        assert_eq!(state, AdmissionState::LandingRedirect);
        assert!(!intent.just_completed_login.is_armed());

        let mut intent = NavigationIntent::to("/privacy").after_login();
        let (state, _) = run(&mut intent, &Session::anonymous());
        assert_eq!(state, AdmissionState::PublicPassThrough);
        assert!(!intent.just_completed_login.is_armed());
    }

    #[test]
    fn public_route_keeps_grace_while_level_resolves() {
        let resolving = Session::resolving("user-1");
        let mut intent = NavigationIntent::to("/").after_login();
        let (state, _) = run(&mut intent, &resolving);
        assert_eq!(state, AdmissionState::PublicPassThrough);
        assert!(intent.just_completed_login.is_armed());
    }

    #[test]
    fn state_serializes_with_tag() -> Result<(), serde_json::Error> {
        let json = serde_json::to_value(AdmissionState::DeniedNoUser {
            from: "/dashboard".to_string(),
        })?;
        assert_eq!(json["state"], "denied_no_user");
        assert_eq!(json["from"], "/dashboard");
        Ok(())
    }
}
