//! Session observer: a best-effort, eventually-consistent view of who is
//! signed in and how strongly.
//!
//! Resolution is split in two so callers can run the network part wherever
//! they like: [`SessionObserver::begin`] hands out a ticket, [`fetch_session`]
//! talks to the provider, and [`SessionObserver::apply`] accepts the result
//! only if no newer resolution started in the meantime.

use crate::backend::AuthBackend;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};
use utoipa::ToSchema;

/// How strongly the current identity has been verified.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum AssuranceLevel {
    /// Only the first factor was completed.
    SingleFactor,
    /// The second factor was completed, or none is required.
    MultiFactorConfirmed,
    /// Resolution is still in flight.
    Unknown,
}

impl AssuranceLevel {
    /// Map the provider's `aal` claim.
    #[must_use]
    pub fn from_aal_claim(claim: &str) -> Option<Self> {
        match claim {
            "aal1" => Some(Self::SingleFactor),
            "aal2" => Some(Self::MultiFactorConfirmed),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_confirmed(self) -> bool {
        matches!(self, Self::MultiFactorConfirmed)
    }
}

/// Current authentication context.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Session {
    pub user_id: Option<String>,
    pub assurance_level: AssuranceLevel,
    pub is_loading: bool,
}

impl Session {
    /// Initial state before the first resolution completes.
    #[must_use]
    pub const fn loading() -> Self {
        Self {
            user_id: None,
            assurance_level: AssuranceLevel::Unknown,
            is_loading: true,
        }
    }

    /// No identity. The level is irrelevant here and reported as confirmed.
    #[must_use]
    pub const fn anonymous() -> Self {
        Self {
            user_id: None,
            assurance_level: AssuranceLevel::MultiFactorConfirmed,
            is_loading: false,
        }
    }

    #[must_use]
    pub fn authenticated(user_id: impl Into<String>, assurance_level: AssuranceLevel) -> Self {
        Self {
            user_id: Some(user_id.into()),
            assurance_level,
            is_loading: false,
        }
    }

    /// Identity known, level still in flight.
    #[must_use]
    pub fn resolving(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            assurance_level: AssuranceLevel::Unknown,
            is_loading: true,
        }
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.user_id.is_some()
    }

    /// Identity present and second factor settled.
    #[must_use]
    pub const fn is_fully_confirmed(&self) -> bool {
        self.is_authenticated() && self.assurance_level.is_confirmed()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::loading()
    }
}

/// Proof that a resolution was started; stale tickets are ignored by
/// [`SessionObserver::apply`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[must_use]
pub struct ResolutionTicket(u64);

#[derive(Debug, Default)]
pub struct SessionObserver {
    generation: u64,
    session: Session,
}

impl SessionObserver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Start a new resolution. The identity is kept so the UI does not blink,
    /// but the level drops back to `Unknown` until the fetch completes.
    pub fn begin(&mut self) -> ResolutionTicket {
        self.generation = self.generation.wrapping_add(1);
        self.session.is_loading = true;
        self.session.assurance_level = AssuranceLevel::Unknown;
        ResolutionTicket(self.generation)
    }

    /// Accept a resolved session unless a newer resolution has begun.
    /// Returns whether the result was applied.
    pub fn apply(&mut self, ticket: ResolutionTicket, session: Session) -> bool {
        if ticket.0 != self.generation {
            debug!(
                ticket = ticket.0,
                generation = self.generation,
                "discarding stale session resolution"
            );
            return false;
        }
        self.session = session;
        true
    }
}

/// Query the provider for the current identity and assurance level.
///
/// Never fails: an unreachable provider yields an anonymous session and a
/// failed level lookup yields `SingleFactor`, so admission leans towards an
/// extra login prompt rather than premature access.
#[instrument(skip_all, fields(has_token = access_token.is_some()))]
pub async fn fetch_session(
    backend: &dyn AuthBackend,
    access_token: Option<&SecretString>,
) -> Session {
    let Some(access_token) = access_token else {
        return Session::anonymous();
    };
    let Some(user_id) = current_user(backend, access_token).await else {
        return Session::anonymous();
    };

    let assurance_level = match backend.assurance_level(access_token).await {
        Ok(AssuranceLevel::Unknown) => {
            warn!("Auth provider reported an unresolved assurance level, failing closed");
            AssuranceLevel::SingleFactor
        }
        Ok(level) => level,
        Err(err) => {
            warn!("Failed to resolve assurance level, failing closed: {err}");
            AssuranceLevel::SingleFactor
        }
    };

    debug!(user_id = %user_id, ?assurance_level, "session resolved");
    Session::authenticated(user_id, assurance_level)
}

/// Resolve the identity only. The level stays `Unknown` and the session stays
/// loading, which is the window a fresh login's grace covers.
#[instrument(skip_all, fields(has_token = access_token.is_some()))]
pub async fn fetch_identity(
    backend: &dyn AuthBackend,
    access_token: Option<&SecretString>,
) -> Session {
    let Some(access_token) = access_token else {
        return Session::anonymous();
    };
    match current_user(backend, access_token).await {
        Some(user_id) => {
            debug!(user_id = %user_id, "identity resolved, level pending");
            Session::resolving(user_id)
        }
        None => Session::anonymous(),
    }
}

async fn current_user(backend: &dyn AuthBackend, access_token: &SecretString) -> Option<String> {
    match backend.current_user(access_token).await {
        Ok(user_id) => user_id,
        Err(err) => {
            warn!("Failed to resolve current user: {err}");
            None
        }
    }
}
