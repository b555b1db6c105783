use crate::api::ErrorResponse;
use crate::db::DbPool;
use crate::models::User;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use super::db::get_user_from_token;

/// Extractor that resolves the bearer token to an account.
///
/// Any handler taking `AuthUser` requires a valid session:
/// ```ignore
/// async fn add_favorite(AuthUser(user): AuthUser, Path(id): Path<Uuid>) -> ... {
///     // user.id identifies the caller
/// }
/// ```
pub struct AuthUser(pub User);

pub enum AuthError {
    MissingHeader,
    MalformedHeader,
    NotBearer,
    InvalidToken,
}

/// Pull the token out of an Authorization header value.
fn bearer_token(value: &str) -> Result<&str, AuthError> {
    value.strip_prefix("Bearer ").ok_or(AuthError::NotBearer)
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let message = match self {
            AuthError::MissingHeader => "Authorization header is required",
            AuthError::MalformedHeader => "Authorization header could not be read",
            AuthError::NotBearer => "Authorization must use a bearer token",
            AuthError::InvalidToken => "Invalid or expired session token",
        };

        (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                error: message.to_string(),
            }),
        )
            .into_response()
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    Arc<DbPool>: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let pool = Arc::<DbPool>::from_ref(state);

        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or(AuthError::MissingHeader)?;

        let auth_str = auth_header
            .to_str()
            .map_err(|_| AuthError::MalformedHeader)?;

        let token = bearer_token(auth_str)?;

        let user = get_user_from_token(&pool, token)
            .await
            .ok_or(AuthError::InvalidToken)?;

        Ok(AuthUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_a_bearer_header() {
        assert!(matches!(bearer_token("Bearer abc123"), Ok("abc123")));
    }

    #[test]
    fn rejects_other_schemes_and_bare_tokens() {
        assert!(bearer_token("Basic dXNlcjpwdw==").is_err());
        assert!(bearer_token("abc123").is_err());
        // Scheme prefix is matched case-sensitively
        assert!(bearer_token("bearer abc123").is_err());
    }

    #[test]
    fn every_rejection_is_a_401() {
        for err in [
            AuthError::MissingHeader,
            AuthError::MalformedHeader,
            AuthError::NotBearer,
            AuthError::InvalidToken,
        ] {
            assert_eq!(err.into_response().status(), StatusCode::UNAUTHORIZED);
        }
    }
}
