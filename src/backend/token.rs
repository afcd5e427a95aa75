//! Access token claim inspection.
//!
//! The provider signs access tokens as JWTs carrying an `aal` claim. The
//! signature is not checked here: a token only reaches this code after the
//! provider accepted it on `GET /user`, so the claim is read as issued.

use super::BackendError;
use crate::guard::session::AssuranceLevel;
use base64ct::{Base64UrlUnpadded, Encoding};
use serde::Deserialize;

#[derive(Deserialize)]
struct AalClaims {
    aal: Option<String>,
}

/// Read the assurance level from the token's `aal` claim.
///
/// # Errors
/// Returns [`BackendError::Token`] when the token is not a three-segment JWT,
/// the payload is not base64url JSON, or the claim is missing or unknown.
pub fn assurance_from_access_token(token: &str) -> Result<AssuranceLevel, BackendError> {
    let mut segments = token.trim().split('.');
    let (Some(_header), Some(payload), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(BackendError::Token("expected three segments"));
    };

    let bytes = Base64UrlUnpadded::decode_vec(payload.trim_end_matches('='))
        .map_err(|_| BackendError::Token("payload is not base64url"))?;

    let claims: AalClaims =
        serde_json::from_slice(&bytes).map_err(|_| BackendError::Token("payload is not JSON"))?;

    claims
        .aal
        .as_deref()
        .and_then(AssuranceLevel::from_aal_claim)
        .ok_or(BackendError::Token("missing or unknown aal claim"))
}

#[cfg(test)]
pub(crate) fn test_token(payload: &str) -> String {
    format!(
        "{}.{}.signature",
        Base64UrlUnpadded::encode_string(br#"{"alg":"HS256","typ":"JWT"}"#),
        Base64UrlUnpadded::encode_string(payload.as_bytes())
    )
}
