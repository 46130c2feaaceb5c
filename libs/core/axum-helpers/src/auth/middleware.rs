use super::jwt::JwtAuth;
use crate::errors::{ErrorCode, error_response};
use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode, header},
    middleware::Next,
    response::Response,
};

const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Token from `Authorization: Bearer <token>`, falling back to the
/// `access_token` cookie.
fn extract_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .or_else(|| {
            headers
                .get(header::COOKIE)
                .and_then(|v| v.to_str().ok())
                .and_then(|cookies| {
                    cookies.split(';').find_map(|cookie| {
                        let (name, value) = cookie.trim().split_once('=')?;
                        (name == ACCESS_TOKEN_COOKIE).then(|| value.to_string())
                    })
                })
        })
        .filter(|token| !token.is_empty())
}

/// Reject requests without a valid token; otherwise store the
/// [`JwtClaims`](super::JwtClaims) in the request extensions.
pub async fn jwt_auth_middleware(
    State(auth): State<JwtAuth>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = extract_token(request.headers()) else {
        tracing::debug!("No JWT found in Authorization header or cookie");
        return error_response(StatusCode::UNAUTHORIZED, "No token provided", ErrorCode::Unauthorized);
    };

    let claims = match auth.verify_token(&token) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::debug!("JWT verification failed: {}", e);
            return error_response(StatusCode::UNAUTHORIZED, "Invalid token", ErrorCode::Unauthorized);
        }
    };

    request.extensions_mut().insert(claims);
    next.run(request).await
}
