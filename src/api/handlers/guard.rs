//! Guard endpoints.
//!
//! Each call is self-contained: the shell posts its current `GuardState`, the
//! handler rebuilds a `GuardContext` from it, runs one guard operation and
//! returns the next state. Guard failures never become 5xx responses; the
//! guard always lands in a defined state.

use super::bearer_token;
use crate::{
    api::Backend,
    guard::{
        GuardContext, GuardState,
        admission::Decision,
        effects::{self, Effect},
        intent::NavigationIntent,
        interceptor::{InterceptOutcome, NavigationEvent},
        session::{self, Session},
    },
};
use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use tracing::{Instrument, debug, info_span};
use utoipa::ToSchema;

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct AdmissionIntent {
    pub target_path: String,
}

impl From<AdmissionIntent> for NavigationIntent {
    // The login grace is never taken from the request body; it only comes
    // from the state armed by `/v1/guard/login`.
    fn from(intent: AdmissionIntent) -> Self {
        Self::to(intent.target_path)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct AdmissionRequest {
    pub intent: AdmissionIntent,
    #[serde(default)]
    pub state: GuardState,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct AdmissionResponse {
    pub decision: Decision,
    pub session: Session,
    pub state: GuardState,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct NavigationRequest {
    pub event: NavigationEvent,
    #[serde(default)]
    pub state: GuardState,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct NavigationResponse {
    pub outcome: InterceptOutcome,
    pub effects: Vec<Effect>,
    pub state: GuardState,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct StateRequest {
    #[serde(default)]
    pub state: GuardState,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct EffectsResponse {
    pub effects: Vec<Effect>,
    pub state: GuardState,
}

#[utoipa::path(
    post,
    path = "/v1/guard/admission",
    request_body = AdmissionRequest,
    responses(
        (status = 200, description = "Admission decision for the requested route", body = AdmissionResponse),
        (status = 400, description = "Malformed request body")
    ),
    security(("bearer" = [])),
    tag = "guard"
)]
pub async fn admission(
    headers: HeaderMap,
    backend: Extension<Backend>,
    Json(request): Json<AdmissionRequest>,
) -> impl IntoResponse {
    let access_token = bearer_token(&headers);
    let mut context = GuardContext::from_state(request.state);

    // Right after a login the first admission renders on the grace with only
    // the identity resolved; the level is fetched on the next call.
    let identity_only = context.awaits_grace_render();
    let ticket = context.begin_resolution();
    let resolved = if identity_only {
        session::fetch_identity(backend.0.as_ref(), access_token.as_ref())
            .instrument(info_span!("guard.resolve_identity"))
            .await
    } else {
        session::fetch_session(backend.0.as_ref(), access_token.as_ref())
            .instrument(info_span!("guard.resolve_session"))
            .await
    };
    context.apply_resolution(ticket, resolved);

    let decision = context.admit(request.intent.into());
    debug!(?decision, "admission decided");

    let session = context.session().clone();
    (
        StatusCode::OK,
        Json(AdmissionResponse {
            decision,
            session,
            state: context.into_state(),
        }),
    )
}

#[utoipa::path(
    post,
    path = "/v1/guard/navigation",
    request_body = NavigationRequest,
    responses(
        (status = 200, description = "Interceptor outcome and effects for the shell", body = NavigationResponse),
        (status = 400, description = "Malformed request body")
    ),
    tag = "guard"
)]
pub async fn navigation(Json(request): Json<NavigationRequest>) -> impl IntoResponse {
    let mut context = GuardContext::from_state(request.state);
    let (outcome, effects) = context.navigate(&request.event);
    debug!(?outcome, path = %request.event.path, "navigation classified");

    Json(NavigationResponse {
        outcome,
        effects,
        state: context.into_state(),
    })
}

#[utoipa::path(
    post,
    path = "/v1/guard/login",
    request_body = StateRequest,
    responses(
        (status = 200, description = "Login recorded, grace armed", body = StateRequest)
    ),
    tag = "guard"
)]
pub async fn login(Json(request): Json<StateRequest>) -> impl IntoResponse {
    let mut context = GuardContext::from_state(request.state);
    context.record_login();

    Json(StateRequest {
        state: context.into_state(),
    })
}

#[utoipa::path(
    post,
    path = "/v1/guard/logout/confirm",
    request_body = StateRequest,
    responses(
        (status = 200, description = "Navigate to the landing page; sign-out runs in the background", body = EffectsResponse)
    ),
    security(("bearer" = [])),
    tag = "guard"
)]
pub async fn logout_confirm(
    headers: HeaderMap,
    backend: Extension<Backend>,
    Json(request): Json<StateRequest>,
) -> impl IntoResponse {
    let mut context = GuardContext::from_state(request.state);
    let planned = context.confirm_logout();

    let (client_effects, server_effects): (Vec<Effect>, Vec<Effect>) =
        planned.into_iter().partition(Effect::is_client_side);

    // The shell gets its navigation right away; the provider sign-out is not
    // awaited so its outcome cannot delay or block the response.
    if server_effects.contains(&Effect::SignOut) {
        let access_token = bearer_token(&headers);
        let backend = backend.0.clone();
        tokio::spawn(
            async move {
                effects::sign_out(backend.as_ref(), access_token.as_ref()).await;
            }
            .instrument(info_span!("guard.sign_out")),
        );
    }

    Json(EffectsResponse {
        effects: client_effects,
        state: context.into_state(),
    })
}

#[utoipa::path(
    post,
    path = "/v1/guard/logout/cancel",
    request_body = StateRequest,
    responses(
        (status = 200, description = "Prompt dismissed; session stays active", body = EffectsResponse)
    ),
    tag = "guard"
)]
pub async fn logout_cancel(Json(request): Json<StateRequest>) -> impl IntoResponse {
    let mut context = GuardContext::from_state(request.state);
    let effects = context.cancel_logout();

    Json(EffectsResponse {
        effects,
        state: context.into_state(),
    })
}
