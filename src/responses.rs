use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of every JSON answer: `{ message, data, code? }`.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonResponse {
    pub message: String,
    pub data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl JsonResponse {
    pub fn success(msg: &str) -> impl IntoResponse {
        Self::success_with_data(msg, Value::Null)
    }

    pub fn success_with_data(msg: &str, data: Value) -> impl IntoResponse {
        (
            StatusCode::OK,
            Json(JsonResponse {
                message: msg.to_string(),
                data,
                code: None,
            }),
        )
    }

    /// Error answer with an explicit status and machine-readable code.
    pub fn error(status: StatusCode, msg: &str, code: Option<&str>) -> Response {
        (
            status,
            Json(JsonResponse {
                message: msg.to_string(),
                data: Value::Null,
                code: code.map(str::to_string),
            }),
        )
            .into_response()
    }

    pub fn bad_request(msg: &str) -> impl IntoResponse {
        Self::error(StatusCode::BAD_REQUEST, msg, None)
    }

    pub fn unauthorized(msg: &str) -> impl IntoResponse {
        Self::error(StatusCode::UNAUTHORIZED, msg, None)
    }

    pub fn not_found(msg: &str) -> impl IntoResponse {
        Self::error(StatusCode::NOT_FOUND, msg, None)
    }

    pub fn conflict(msg: &str) -> impl IntoResponse {
        Self::error(StatusCode::CONFLICT, msg, None)
    }

    pub fn server_error(msg: &str) -> impl IntoResponse {
        Self::error(StatusCode::INTERNAL_SERVER_ERROR, msg, None)
    }

    pub fn too_many_requests(msg: &str) -> impl IntoResponse {
        Self::error(StatusCode::TOO_MANY_REQUESTS, msg, None)
    }

    pub fn redirect_to_login_with_error(frontend_origin: &str, msg: &str) -> impl IntoResponse {
        let redirect_url = format!(
            "{}/login?error={}",
            frontend_origin.trim_end_matches('/'),
            urlencoding::encode(msg)
        );
        Redirect::to(&redirect_url).into_response()
    }
}
