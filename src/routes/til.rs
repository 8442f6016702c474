use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use tracing::error;

use crate::responses::JsonResponse;
use crate::routes::auth::session::AuthSession;
use crate::services::llm::{ConvertTilRequest, EnhanceTilRequest, LlmError};
use crate::state::AppState;

/// `POST /til/convert`: the LLM server's Markdown answer, passed through.
pub async fn convert_til(
    State(state): State<AppState>,
    AuthSession(_claims): AuthSession,
    Json(request): Json<ConvertTilRequest>,
) -> Response {
    match state.llm.summarize(&request).await {
        Ok(body) => Json(body).into_response(),
        Err(err) => map_llm_error(err, "Failed to convert the note to Markdown."),
    }
}

/// `POST /til/enhance`: keyword and image suggestions, passed through.
pub async fn enhance_til(
    State(state): State<AppState>,
    AuthSession(_claims): AuthSession,
    Json(request): Json<EnhanceTilRequest>,
) -> Response {
    match state.llm.enhance(&request).await {
        Ok(body) => Json(body).into_response(),
        Err(err) => map_llm_error(err, "Failed to enhance the note."),
    }
}

fn map_llm_error(err: LlmError, default_message: &str) -> Response {
    match &err {
        LlmError::Validation(detail) => {
            return JsonResponse::error(
                err.http_status(),
                "invalid_request",
                Some(detail.as_str()),
            );
        }
        LlmError::Http(e) => error!("LLM API error: {e}"),
        LlmError::Upstream { status, .. } => error!(%status, "LLM API error"),
    }
    let message = err.public_message(default_message);
    JsonResponse::error(err.http_status(), &message, None)
}
