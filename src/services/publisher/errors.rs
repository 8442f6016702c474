use reqwest::StatusCode;
use thiserror::Error;

use crate::services::github::contents::ContentsError;

/// Every way a publish can fail. Nothing here is retried automatically.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("no valid GitHub token is held for this user")]
    CredentialMissing,
    #[error("no GitHub repository is registered for this user")]
    RepositoryNotBound,
    #[error("GitHub repository not found")]
    RemoteNotFound,
    #[error("GitHub rejected the stored credential: {0}")]
    RemoteAuthInvalid(String),
    #[error("GitHub write failed: {message}")]
    RemoteWriteFailed {
        status: Option<StatusCode>,
        message: String,
    },
    #[error("internal publishing failure: {0}")]
    InternalFailure(String),
}

impl PublishError {
    /// Maps a failed content read or write against the target repository.
    pub fn from_remote(err: ContentsError) -> Self {
        match err {
            ContentsError::NotFound => PublishError::RemoteNotFound,
            ContentsError::Unauthorized(message) => PublishError::RemoteAuthInvalid(message),
            // Stale or missing sha; GitHub uses 409 or 422 for it.
            ContentsError::Conflict { message, .. } => PublishError::RemoteWriteFailed {
                status: Some(StatusCode::CONFLICT),
                message,
            },
            ContentsError::UnexpectedStatus { status, message } => {
                PublishError::RemoteWriteFailed {
                    status: Some(status),
                    message,
                }
            }
            ContentsError::Http(err) => PublishError::RemoteWriteFailed {
                status: err.status(),
                message: err.to_string(),
            },
            ContentsError::InvalidResponse(message) => PublishError::InternalFailure(message),
        }
    }

    /// A write lost an optimistic-concurrency race on the file's sha.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            PublishError::RemoteWriteFailed {
                status: Some(StatusCode::CONFLICT),
                ..
            }
        )
    }

    pub fn code(&self) -> &'static str {
        match self {
            PublishError::CredentialMissing => "github_token_missing",
            PublishError::RepositoryNotBound => "repository_not_registered",
            PublishError::RemoteNotFound => "repository_not_found",
            PublishError::RemoteAuthInvalid(_) => "github_token_invalid",
            PublishError::RemoteWriteFailed { .. } if self.is_conflict() => "github_upload_conflict",
            PublishError::RemoteWriteFailed { .. } => "github_upload_error",
            PublishError::InternalFailure(_) => "internal_server_error",
        }
    }

    pub fn http_status(&self) -> StatusCode {
        match self {
            PublishError::CredentialMissing | PublishError::RemoteAuthInvalid(_) => {
                StatusCode::UNAUTHORIZED
            }
            PublishError::RepositoryNotBound => StatusCode::BAD_REQUEST,
            PublishError::RemoteNotFound => StatusCode::NOT_FOUND,
            PublishError::RemoteWriteFailed { .. } if self.is_conflict() => StatusCode::CONFLICT,
            PublishError::RemoteWriteFailed { .. } => StatusCode::BAD_GATEWAY,
            PublishError::InternalFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
