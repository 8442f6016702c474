use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
};
use axum_extra::extract::cookie::CookieJar;

use crate::routes::auth::claims::Claims;
use crate::utils::jwt::SessionTokenProvider;

pub const AUTH_COOKIE: &str = "auth_token";

/// Authenticated caller, from an `Authorization: Bearer` header or the
/// `auth_token` cookie.
#[derive(Debug, PartialEq)]
pub struct AuthSession(pub Claims);

impl<S> FromRequestParts<S> for AuthSession
where
    S: SessionTokenProvider + Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .or_else(|| {
                CookieJar::from_headers(&parts.headers)
                    .get(AUTH_COOKIE)
                    .map(|cookie| cookie.value().to_string())
            })
            .ok_or(StatusCode::UNAUTHORIZED)?;

        let claims = state
            .session_tokens()
            .verify(&token)
            .map_err(|_| StatusCode::UNAUTHORIZED)?;

        Ok(AuthSession(claims))
    }
}

fn bearer_token(parts: &Parts) -> Option<String> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))?
        .trim();
    (!token.is_empty()).then(|| token.to_string())
}
