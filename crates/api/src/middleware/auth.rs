//! Bearer token extractor.
//!
//! Handlers that take [`RequireAuth`] only run for requests carrying a valid
//! `Authorization: Bearer <token>` header.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};
use tracing::debug;

use shiftwatch_core::UserId;
use shiftwatch_core::wire::MessageBody;

use crate::error::set_sentry_user;
use crate::state::AppState;

/// Extractor that requires a valid bearer token.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAuth(user_id): RequireAuth) -> impl IntoResponse {
///     format!("Hello, user {user_id}!")
/// }
/// ```
pub struct RequireAuth(pub UserId);

/// Error returned when a protected route is called without a usable token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRejection {
    /// No token was presented.
    MissingToken,
    /// The token failed verification or has expired.
    InvalidToken,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let message = match self {
            Self::MissingToken => "No autorizado",
            Self::InvalidToken => "Token inválido",
        };
        (StatusCode::UNAUTHORIZED, Json(MessageBody::new(message))).into_response()
    }
}

/// Pull the token out of an `Authorization` header value.
fn bearer_token(header: &str) -> Option<&str> {
    let token = header.strip_prefix("Bearer ").unwrap_or(header).trim();
    (!token.is_empty()).then_some(token)
}

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(bearer_token)
            .ok_or(AuthRejection::MissingToken)?;

        let user_id = state.tokens().verify(token).map_err(|e| {
            debug!(error = %e, "Rejected bearer token");
            AuthRejection::InvalidToken
        })?;

        set_sentry_user(&user_id);
        Ok(Self(user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token("Bearer abc.def"), Some("abc.def"));
        assert_eq!(bearer_token("abc.def"), Some("abc.def"));
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token(""), None);
    }
}
