use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::models::publish::PublishRequest;
use crate::responses::JsonResponse;
use crate::routes::auth::session::AuthSession;
use crate::services::publisher::PublishError;
use crate::state::AppState;

/// `POST /github/upload`: publishes a note into the caller's bound repository.
pub async fn upload_note(
    State(state): State<AppState>,
    AuthSession(claims): AuthSession,
    Json(request): Json<PublishRequest>,
) -> Response {
    if request.content.trim().is_empty() {
        return JsonResponse::error(
            StatusCode::BAD_REQUEST,
            "content is required",
            Some("invalid_request"),
        );
    }

    match state.publisher.publish(claims.owner_id(), request).await {
        Ok(published) => JsonResponse::success_with_data(
            "upload_success",
            json!({
                "url": published.url,
                "path": published.path,
                "created": published.created,
            }),
        )
        .into_response(),
        Err(err) => map_publish_error(err),
    }
}

fn map_publish_error(err: PublishError) -> Response {
    let message = match &err {
        PublishError::CredentialMissing => {
            "GitHub is not connected. Please sign in with GitHub again.".to_string()
        }
        PublishError::RepositoryNotBound => "Register a GitHub repository first.".to_string(),
        PublishError::RemoteNotFound => "GitHub repository not found.".to_string(),
        PublishError::RemoteAuthInvalid(_) => {
            "GitHub rejected the stored token. Please sign in with GitHub again.".to_string()
        }
        PublishError::RemoteWriteFailed { .. } if err.is_conflict() => {
            "The file changed on GitHub while publishing. Please try again.".to_string()
        }
        PublishError::RemoteWriteFailed { message, .. } => {
            error!("GitHub upload failed: {message}");
            "Failed to upload to GitHub.".to_string()
        }
        PublishError::InternalFailure(e) => {
            error!("Publish failed: {e}");
            "Internal server error.".to_string()
        }
    };

    JsonResponse::error(err.http_status(), &message, Some(err.code()))
}
