use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::models::repository::{RepositoryBinding, RepositoryError};
use crate::responses::JsonResponse;
use crate::routes::auth::session::AuthSession;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ParseRepositoryUrlPayload {
    #[serde(default)]
    pub repository_url: String,
}

/// `POST /parse/github-url`: validates the URL and binds the repository to
/// the caller, replacing any earlier binding.
pub async fn parse_github_url(
    State(state): State<AppState>,
    AuthSession(claims): AuthSession,
    Json(payload): Json<ParseRepositoryUrlPayload>,
) -> Response {
    let binding = match RepositoryBinding::parse(&payload.repository_url) {
        Ok(binding) => binding,
        Err(err) => return map_repository_error(err),
    };

    state
        .repositories
        .store(claims.owner_id(), binding.clone())
        .await;
    info!(owner_id = %claims.owner_id(), repository = %binding.full_name(), "repository registered");

    JsonResponse::success_with_data(
        "parse_success",
        json!({
            "owner": binding.owner,
            "repo": binding.repo,
        }),
    )
    .into_response()
}

fn map_repository_error(err: RepositoryError) -> Response {
    JsonResponse::error(StatusCode::BAD_REQUEST, &err.to_string(), Some(err.code()))
}
