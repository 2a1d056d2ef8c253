use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use tracing::warn;

use crate::auth::cookies::{get_cookie, ACCESS_COOKIE_NAME};
use crate::error::AuthError;
use crate::state::AppState;

/// Resolves the `access_token` cookie to a user ID. This boundary only
/// needs "logged in or not", so a missing, invalid or expired token all
/// collapse to `Unauthenticated`.
pub struct AuthUser(pub i64);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token =
            get_cookie(&parts.headers, ACCESS_COOKIE_NAME).ok_or(AuthError::Unauthenticated)?;
        let uid = state.auth.resolve(&token).map_err(|e| {
            warn!(error = %e, "access token rejected");
            AuthError::Unauthenticated
        })?;
        Ok(AuthUser(uid))
    }
}
