//! Bearer-token handling for admin requests.
use crate::api::error::{ApiError, api_unauthorized};
use crate::app::AppState;
use axum::http::HeaderMap;
use cadence_authz::IdentityClaims;

/// Rebuild the caller's claims from the `Authorization: Bearer` header.
///
/// # Errors
/// - `unauthorized` when the header is missing or not a bearer token.
/// - `token_expired` / `token_malformed` from verification.
pub fn require_claims(state: &AppState, headers: &HeaderMap) -> Result<IdentityClaims, ApiError> {
    let bearer = extract_bearer(headers).ok_or_else(|| api_unauthorized("missing bearer token"))?;
    Ok(state.codec.verify(bearer)?)
}

pub fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(axum::http::header::AUTHORIZATION)?;
    let value = value.to_str().ok()?;
    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
