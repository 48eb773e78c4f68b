use axum::{extract::FromRequestParts, http::header::AUTHORIZATION, http::request::Parts};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

use super::{errors::ApiError, AppState};

/// Prefix carried by every issued token, ahead of the base64-encoded shared
/// secret.
const TOKEN_PREFIX: &str = "atmo-";

/// The single admin bearer token: `"atmo-" + base64(shared secret)`.
///
/// There is no expiry and no per-user identity; one shared credential gates
/// all admin writes, and verification is an exact string comparison.
pub fn admin_token(password: &str) -> String {
    format!("{TOKEN_PREFIX}{}", BASE64.encode(password))
}

/// Extractor guarding admin write handlers.
///
/// Rejects with 401 before the handler body runs, so an unauthorized request
/// never reaches the store.
pub struct RequireAdmin;

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let bearer = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or(ApiError::Unauthorized)?;

        if bearer == admin_token(&state.config.admin_password) {
            Ok(RequireAdmin)
        } else {
            Err(ApiError::Unauthorized)
        }
    }
}
