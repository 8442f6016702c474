use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::Engine;
use rand_core::{OsRng, RngCore};
use serde_json::json;
use tracing::{error, info, warn};

use crate::{
    responses::JsonResponse,
    routes::auth::{session::AuthSession, session::AUTH_COOKIE},
    services::github::{
        errors::GitHubAuthError,
        models::{GitHubCallback, GitHubLoginRequest, GitHubUser},
    },
    state::AppState,
};

const STATE_COOKIE: &str = "oauth_state";

/// Redirects to GitHub's OAuth authorization page with CSRF protection
pub async fn github_login(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let mut csrf_bytes = [0u8; 32];
    OsRng.fill_bytes(&mut csrf_bytes);
    let csrf_token = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(csrf_bytes);

    let state_cookie = Cookie::build((STATE_COOKIE, csrf_token.clone()))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(time::Duration::minutes(10))
        .build();

    let github_url = state.github_oauth.authorize_url(&csrf_token);

    (jar.add(state_cookie), Redirect::to(&github_url))
}

/// Handles the GitHub OAuth callback: checks state, stores the GitHub token
/// and hands the browser a session cookie.
pub async fn github_callback(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<GitHubCallback>,
) -> Response {
    let frontend = state.config.frontend_origin.clone();

    if let Some(denied) = params.error.as_deref() {
        warn!(error = %denied, "GitHub authorization was not granted");
        return JsonResponse::redirect_to_login_with_error(&frontend, denied).into_response();
    }

    let code = match params.code.as_deref().filter(|code| !code.is_empty()) {
        Some(code) => code,
        None => {
            return JsonResponse::redirect_to_login_with_error(
                &frontend,
                &GitHubAuthError::MissingCode.to_string(),
            )
            .into_response();
        }
    };

    let expected_state = match jar.get(STATE_COOKIE).map(|c| c.value().to_string()) {
        Some(state) => state,
        None => {
            return JsonResponse::redirect_to_login_with_error(
                &frontend,
                &GitHubAuthError::MissingStateCookie.to_string(),
            )
            .into_response();
        }
    };

    if params.state.as_deref() != Some(expected_state.as_str()) {
        return JsonResponse::redirect_to_login_with_error(
            &frontend,
            &GitHubAuthError::InvalidState.to_string(),
        )
        .into_response();
    }

    let (jwt, _user) = match complete_login(&state, code).await {
        Ok(login) => login,
        Err(e) => {
            return JsonResponse::redirect_to_login_with_error(&frontend, &e.to_string())
                .into_response();
        }
    };

    let clear_state_cookie = Cookie::build((STATE_COOKIE, ""))
        .path("/")
        .max_age(time::Duration::seconds(0))
        .build();

    let jar = jar
        .add(auth_cookie(jwt, state.sessions.ttl()))
        .add(clear_state_cookie);

    (
        jar,
        Redirect::to(&format!("{}/dashboard", frontend.trim_end_matches('/'))),
    )
        .into_response()
}

/// `POST /auth/github` for clients that run the OAuth redirect themselves and
/// only forward the code.
pub async fn github_code_login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<GitHubLoginRequest>,
) -> Response {
    let code = payload.code.trim();
    if code.is_empty() {
        let err = GitHubAuthError::MissingCode;
        return JsonResponse::error(StatusCode::BAD_REQUEST, &err.to_string(), Some(err.code()));
    }

    match complete_login(&state, code).await {
        Ok((jwt, user)) => (
            jar.add(auth_cookie(jwt.clone(), state.sessions.ttl())),
            JsonResponse::success_with_data(
                "login_success",
                json!({
                    "access_token": jwt,
                    "user": user_json(&user),
                }),
            ),
        )
            .into_response(),
        Err(err @ GitHubAuthError::JwtCreationFailed) => JsonResponse::error(
            StatusCode::INTERNAL_SERVER_ERROR,
            &err.to_string(),
            Some(err.code()),
        ),
        Err(err) => JsonResponse::error(StatusCode::UNAUTHORIZED, &err.to_string(), Some(err.code())),
    }
}

pub async fn handle_me(State(state): State<AppState>, AuthSession(claims): AuthSession) -> Response {
    let github_connected = state.tokens.has_valid(claims.owner_id()).await;
    let repository = state.repositories.get(claims.owner_id()).await;

    JsonResponse::success_with_data(
        "success",
        json!({
            "user": {
                "id": claims.sub,
                "login": claims.login,
                "email": claims.email,
            },
            "github_connected": github_connected,
            "repository": repository,
        }),
    )
    .into_response()
}

/// Forgets the stored GitHub token and expires the session cookie.
pub async fn handle_logout(
    State(state): State<AppState>,
    AuthSession(claims): AuthSession,
    jar: CookieJar,
) -> Response {
    state.tokens.remove(claims.owner_id()).await;
    info!(owner_id = %claims.owner_id(), "logged out");

    let expired_cookie = Cookie::build((AUTH_COOKIE, ""))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(0))
        .build();

    (jar.add(expired_cookie), JsonResponse::success("logout_success")).into_response()
}

/// Exchanges the code, registers the GitHub token for the user and issues a
/// session JWT.
async fn complete_login(
    state: &AppState,
    code: &str,
) -> Result<(String, GitHubUser), GitHubAuthError> {
    let token = state
        .github_oauth
        .exchange_code_for_token(code)
        .await
        .map_err(|e| {
            warn!("GitHub token exchange error: {e}");
            e
        })?;

    let user = state
        .github_oauth
        .fetch_user_info(&token)
        .await
        .map_err(|e| {
            warn!("GitHub user info error: {e}");
            e
        })?;

    let owner_id = user.owner_id();
    state
        .tokens
        .store(
            &owner_id,
            &token.access_token,
            chrono::Duration::days(state.config.github.token_ttl_days),
        )
        .await;

    let jwt = state
        .sessions
        .issue(&owner_id, &user.login, &user.email)
        .map_err(|e| {
            error!(%owner_id, "JWT creation failed: {e}");
            GitHubAuthError::JwtCreationFailed
        })?;

    info!(%owner_id, login = %user.login, "GitHub login completed");
    Ok((jwt, user))
}

fn auth_cookie(jwt: String, ttl: chrono::Duration) -> Cookie<'static> {
    Cookie::build((AUTH_COOKIE, jwt))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(time::Duration::seconds(ttl.num_seconds()))
        .build()
}

fn user_json(user: &GitHubUser) -> serde_json::Value {
    json!({
        "id": user.owner_id(),
        "github_id": user.id,
        "login": user.login,
        "name": user.name,
        "email": user.email,
        "avatar_url": user.avatar_url,
        "html_url": user.html_url,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        Router,
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::routes::build_router;
    use crate::services::github::mock_contents::InMemoryContents;
    use crate::services::github::mock_github_oauth::MockGitHubOAuth;
    use crate::state::{
        test_support::{session_token, test_state},
        AppState,
    };

    fn state_with(oauth: MockGitHubOAuth) -> AppState {
        test_state(
            Arc::new(oauth),
            Arc::new(InMemoryContents::new()),
            "http://127.0.0.1:9",
        )
    }

    fn app(state: AppState) -> Router {
        build_router(state)
    }

    async fn body_json(res: axum::response::Response) -> Value {
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn set_cookies(res: &axum::response::Response) -> Vec<String> {
        res.headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect()
    }

    #[tokio::test]
    async fn login_sets_state_cookie_and_redirects_to_github() {
        let res = app(state_with(MockGitHubOAuth::default()))
            .oneshot(
                Request::get("/auth/github/login")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        let location = res.headers()[header::LOCATION].to_str().unwrap().to_string();
        assert!(location.starts_with("https://github.com/login/oauth/authorize"));

        let cookies = set_cookies(&res);
        let state_cookie = cookies
            .iter()
            .find(|c| c.starts_with("oauth_state="))
            .expect("state cookie");
        let value = state_cookie
            .trim_start_matches("oauth_state=")
            .split(';')
            .next()
            .unwrap();
        assert!(location.contains(&format!("state={value}")));
        assert!(state_cookie.contains("HttpOnly"));
    }

    #[tokio::test]
    async fn callback_with_valid_state_stores_token_and_sets_session() {
        let state = state_with(MockGitHubOAuth::for_user(42, "alice", "gho_alice"));
        let tokens = state.tokens.clone();

        let res = app(state)
            .oneshot(
                Request::get("/auth/github/callback?code=abc&state=xyz")
                    .header(header::COOKIE, "oauth_state=xyz")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            res.headers()[header::LOCATION],
            "https://app.example/dashboard"
        );
        let cookies = set_cookies(&res);
        assert!(cookies.iter().any(|c| c.starts_with("auth_token=")));
        assert_eq!(tokens.get("42").await.as_deref(), Some("gho_alice"));
    }

    #[tokio::test]
    async fn callback_with_mismatched_state_redirects_with_error() {
        let state = state_with(MockGitHubOAuth::for_user(42, "alice", "gho_alice"));
        let tokens = state.tokens.clone();

        let res = app(state)
            .oneshot(
                Request::get("/auth/github/callback?code=abc&state=forged")
                    .header(header::COOKIE, "oauth_state=xyz")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let location = res.headers()[header::LOCATION].to_str().unwrap();
        assert!(location.starts_with("https://app.example/login?error="));
        assert!(location.contains("Invalid%20state"));
        assert!(!tokens.has_valid("42").await);
    }

    #[tokio::test]
    async fn callback_without_state_cookie_is_rejected() {
        let res = app(state_with(MockGitHubOAuth::default()))
            .oneshot(
                Request::get("/auth/github/callback?code=abc&state=xyz")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let location = res.headers()[header::LOCATION].to_str().unwrap();
        assert!(location.contains("oauth_state"));
    }

    #[tokio::test]
    async fn code_login_returns_session_and_user() {
        let state = state_with(MockGitHubOAuth::for_user(42, "alice", "gho_alice"));
        let tokens = state.tokens.clone();
        let sessions = state.sessions.clone();

        let res = app(state)
            .oneshot(
                Request::post("/auth/github")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"code":"abc"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        let session_cookie = set_cookies(&res)
            .into_iter()
            .find(|c| c.starts_with("auth_token="))
            .expect("session cookie");
        assert!(session_cookie.contains("Max-Age=604800"));

        let json = body_json(res).await;
        assert_eq!(json["message"], "login_success");
        let claims = sessions
            .verify(json["data"]["access_token"].as_str().unwrap())
            .expect("issued session verifies");
        assert_eq!(claims.owner_id(), "42");
        assert_eq!(claims.login, "alice");
        assert_eq!(json["data"]["user"]["github_id"], 42);
        assert_eq!(json["data"]["user"]["email"], "alice@github.com");
        assert!(tokens.has_valid("42").await);
    }

    #[tokio::test]
    async fn code_login_with_bad_code_is_unauthorized() {
        let mut oauth = MockGitHubOAuth::for_user(42, "alice", "gho_alice");
        oauth.fail_exchange = true;

        let res = app(state_with(oauth))
            .oneshot(
                Request::post("/auth/github")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"code":"stale"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(res).await["code"], "invalid_github_code");
    }

    #[tokio::test]
    async fn code_login_without_code_is_bad_request() {
        let res = app(state_with(MockGitHubOAuth::default()))
            .oneshot(
                Request::post("/auth/github")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(res).await["code"], "invalid_request");
    }

    #[tokio::test]
    async fn me_reports_github_connection() {
        let state = state_with(MockGitHubOAuth::default());
        let jwt = session_token(&state, "42", "alice");
        state
            .tokens
            .store("42", "gho_alice", chrono::Duration::days(1))
            .await;

        let res = app(state)
            .oneshot(
                Request::get("/auth/me")
                    .header(header::AUTHORIZATION, format!("Bearer {jwt}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        let json = body_json(res).await;
        assert_eq!(json["data"]["user"]["id"], "42");
        assert_eq!(json["data"]["github_connected"], true);
        assert!(json["data"]["repository"].is_null());
    }

    #[tokio::test]
    async fn me_requires_a_session() {
        let res = app(state_with(MockGitHubOAuth::default()))
            .oneshot(Request::get("/auth/me").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn logout_drops_token_and_clears_cookie() {
        let state = state_with(MockGitHubOAuth::default());
        let jwt = session_token(&state, "42", "alice");
        state
            .tokens
            .store("42", "gho_alice", chrono::Duration::days(1))
            .await;
        let tokens = state.tokens.clone();

        let res = app(state)
            .oneshot(
                Request::post("/auth/logout")
                    .header(header::COOKIE, format!("auth_token={jwt}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        let cookie = set_cookies(&res)
            .into_iter()
            .find(|c| c.starts_with("auth_token="))
            .expect("cleared cookie");
        assert!(cookie.contains("Max-Age=0"));
        assert_eq!(body_json(res).await["message"], "logout_success");
        assert!(!tokens.has_valid("42").await);
    }
}
