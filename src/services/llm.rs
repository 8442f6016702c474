use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{error, warn};

use crate::config::LlmSettings;

const SUMMATION_PATH: &str = "summation";
const ENHANCE_PATH: &str = "enhance";
const CONVERT_MIN_CHARS: usize = 10;
const CONVERT_MAX_CHARS: usize = 5000;
const LANGUAGES: [&str; 2] = ["ko", "en"];

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("invalid request: {0}")]
    Validation(String),
    #[error("LLM server request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("LLM server responded with status {status}")]
    Upstream {
        status: StatusCode,
        message: Option<String>,
    },
}

impl LlmError {
    /// Status the caller sees. Upstream statuses pass through; transport
    /// failures are reported as the LLM server being unavailable.
    pub fn http_status(&self) -> StatusCode {
        match self {
            LlmError::Validation(_) => StatusCode::BAD_REQUEST,
            LlmError::Http(_) => StatusCode::SERVICE_UNAVAILABLE,
            LlmError::Upstream { status, .. } => *status,
        }
    }

    /// Message the caller sees.
    pub fn public_message(&self, default_message: &str) -> String {
        match self {
            LlmError::Validation(_) => "invalid_request".to_string(),
            LlmError::Http(_) => "llm_server_error".to_string(),
            LlmError::Upstream { status, .. } if *status == StatusCode::BAD_REQUEST => {
                "invalid_request".to_string()
            }
            LlmError::Upstream { status, .. } if status.is_server_error() => {
                "llm_server_error".to_string()
            }
            LlmError::Upstream { message, .. } => message
                .clone()
                .unwrap_or_else(|| default_message.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertTilRequest {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl ConvertTilRequest {
    pub fn validate(&self) -> Result<(), LlmError> {
        let length = self.content.chars().count();
        if self.content.trim().is_empty() {
            return Err(LlmError::Validation("content is required".into()));
        }
        if length < CONVERT_MIN_CHARS {
            return Err(LlmError::Validation(format!(
                "content must be at least {} characters",
                CONVERT_MIN_CHARS
            )));
        }
        if length > CONVERT_MAX_CHARS {
            return Err(LlmError::Validation(format!(
                "content must be at most {} characters",
                CONVERT_MAX_CHARS
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnhanceTilRequest {
    pub content: String,
    pub language: String,
    pub include_images: bool,
}

impl EnhanceTilRequest {
    pub fn validate(&self) -> Result<(), LlmError> {
        if self.content.trim().is_empty() {
            return Err(LlmError::Validation("content is required".into()));
        }
        if !LANGUAGES.contains(&self.language.as_str()) {
            return Err(LlmError::Validation(format!(
                "unsupported language: {}",
                self.language
            )));
        }
        Ok(())
    }
}

#[derive(Deserialize)]
struct UpstreamErrorBody {
    message: Option<String>,
}

/// Forwards note content to the summarization server and hands its JSON back
/// untouched.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    settings: LlmSettings,
}

impl LlmClient {
    pub fn new(client: Client, settings: LlmSettings) -> Self {
        Self { client, settings }
    }

    pub async fn summarize(&self, request: &ConvertTilRequest) -> Result<Value, LlmError> {
        request.validate()?;
        self.post(SUMMATION_PATH, request).await
    }

    pub async fn enhance(&self, request: &EnhanceTilRequest) -> Result<Value, LlmError> {
        request.validate()?;
        self.post(ENHANCE_PATH, request).await
    }

    async fn post<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<Value, LlmError> {
        let url = build_url(&self.settings.api_url, path);
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.settings.api_key)
            .json(body)
            .send()
            .await
            .map_err(|err| {
                error!(%path, "LLM server request failed: {err}");
                LlmError::Http(err)
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<UpstreamErrorBody>()
                .await
                .ok()
                .and_then(|body| body.message);
            warn!(%path, %status, "LLM server rejected request");
            return Err(LlmError::Upstream { status, message });
        }

        Ok(response.json::<Value>().await?)
    }
}

fn build_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
