pub mod auth;
pub mod publish;
pub mod repository;
pub mod til;

use axum::{
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};

use crate::responses::JsonResponse;
use crate::state::AppState;

/// All application routes with state attached. Transport layers (CORS,
/// tracing, rate limiting) are added by the binary.
pub fn build_router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/github", post(auth::github_code_login))
        .route("/github/login", get(auth::github_login))
        .route("/github/callback", get(auth::github_callback))
        .route("/me", get(auth::handle_me))
        .route("/logout", post(auth::handle_logout));

    let til_routes = Router::new()
        .route("/convert", post(til::convert_til))
        .route("/enhance", post(til::enhance_til));

    Router::new()
        .route("/", get(root))
        .nest("/auth", auth_routes)
        .route("/parse/github-url", post(repository::parse_github_url))
        .route("/github/upload", post(publish::upload_note))
        .nest("/til", til_routes)
        .with_state(state)
}

/// A simple root route.
async fn root() -> Response {
    JsonResponse::success("ok").into_response()
}
