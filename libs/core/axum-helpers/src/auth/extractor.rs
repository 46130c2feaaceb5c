use super::jwt::JwtClaims;
use crate::errors::AppError;
use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

/// Id of the authenticated caller, taken from the claims that
/// [`jwt_auth_middleware`](super::jwt_auth_middleware) stored on the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser(pub Uuid);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let claims = parts
            .extensions
            .get::<JwtClaims>()
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;

        Uuid::parse_str(&claims.sub)
            .map(AuthUser)
            .map_err(|_| AppError::Unauthorized("Token subject is not a valid user id".to_string()))
    }
}
