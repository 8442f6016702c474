//! Client for the GitHub repository contents API.
//!
//! GitHub has no "mkdir": a directory exists only while it contains at least
//! one file. Reads of a directory return a listing, reads of a file return its
//! blob `sha`, and writes must echo that `sha` back to overwrite an existing
//! file.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[cfg(test)]
use mockall::automock;

use super::{GITHUB_API_VERSION, USER_AGENT};
use crate::models::publish::{RemoteContent, RemoteFileHandle};
use crate::models::repository::RepositoryBinding;

#[derive(Debug, Error)]
pub enum ContentsError {
    #[error("GitHub request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("GitHub resource not found")]
    NotFound,
    #[error("GitHub rejected the credential: {0}")]
    Unauthorized(String),
    #[error("GitHub reported a conflicting write ({status}): {message}")]
    Conflict { status: StatusCode, message: String },
    #[error("GitHub responded with status {status}: {message}")]
    UnexpectedStatus { status: StatusCode, message: String },
    #[error("GitHub returned an invalid response: {0}")]
    InvalidResponse(String),
}

impl ContentsError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ContentsError::NotFound)
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ContentsError::NotFound => Some(StatusCode::NOT_FOUND),
            ContentsError::Unauthorized(_) => Some(StatusCode::UNAUTHORIZED),
            ContentsError::Conflict { status, .. }
            | ContentsError::UnexpectedStatus { status, .. } => Some(*status),
            ContentsError::Http(err) => err.status(),
            ContentsError::InvalidResponse(_) => None,
        }
    }
}

/// A create-or-update write. `content` is raw text; the client encodes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutContentRequest {
    pub path: String,
    pub message: String,
    pub content: String,
    pub sha: Option<String>,
    pub branch: Option<String>,
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait ContentsApi: Send + Sync {
    /// Reads `path`; `ContentsError::NotFound` when nothing exists there.
    async fn get_content(
        &self,
        token: &str,
        repository: &RepositoryBinding,
        path: &str,
        branch: Option<String>,
    ) -> Result<RemoteContent, ContentsError>;

    /// Creates or updates a file. Returns the new handle when GitHub reports one.
    async fn put_content(
        &self,
        token: &str,
        repository: &RepositoryBinding,
        request: PutContentRequest,
    ) -> Result<Option<RemoteFileHandle>, ContentsError>;
}

#[derive(Clone)]
pub struct GitHubContentsClient {
    client: Client,
    base_url: String,
}

impl GitHubContentsClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn request(
        &self,
        method: Method,
        token: &str,
        repository: &RepositoryBinding,
        path: &str,
    ) -> RequestBuilder {
        let url = contents_url(&self.base_url, repository, path);
        self.client
            .request(method, url)
            .bearer_auth(token)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .header("X-GitHub-Api-Version", GITHUB_API_VERSION)
    }
}

#[derive(Deserialize)]
struct RawContentItem {
    path: Option<String>,
    sha: Option<String>,
}

impl RawContentItem {
    fn into_handle(self) -> Option<RemoteFileHandle> {
        Some(RemoteFileHandle {
            path: self.path?,
            sha: self.sha?,
        })
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawContentResponse {
    Listing(Vec<RawContentItem>),
    Item(RawContentItem),
}

#[derive(Deserialize)]
struct RawPutResponse {
    content: Option<RawContentItem>,
}

#[derive(Serialize)]
struct PutContentBody<'a> {
    message: &'a str,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    branch: Option<&'a str>,
}

#[async_trait]
impl ContentsApi for GitHubContentsClient {
    async fn get_content(
        &self,
        token: &str,
        repository: &RepositoryBinding,
        path: &str,
        branch: Option<String>,
    ) -> Result<RemoteContent, ContentsError> {
        let mut request = self.request(Method::GET, token, repository, path);
        if let Some(branch) = branch.as_deref() {
            request = request.query(&[("ref", branch)]);
        }

        let response = request.send().await?;
        let body = read_success_body(response).await?;

        match serde_json::from_str::<RawContentResponse>(&body) {
            Ok(RawContentResponse::Listing(items)) => Ok(RemoteContent::Directory(
                items
                    .into_iter()
                    .filter_map(RawContentItem::into_handle)
                    .collect(),
            )),
            Ok(RawContentResponse::Item(item)) => item
                .into_handle()
                .map(RemoteContent::File)
                .ok_or_else(|| ContentsError::InvalidResponse("content without sha".into())),
            Err(err) => Err(ContentsError::InvalidResponse(err.to_string())),
        }
    }

    async fn put_content(
        &self,
        token: &str,
        repository: &RepositoryBinding,
        request: PutContentRequest,
    ) -> Result<Option<RemoteFileHandle>, ContentsError> {
        let body = PutContentBody {
            message: &request.message,
            content: STANDARD.encode(request.content.as_bytes()),
            sha: request.sha.as_deref(),
            branch: request.branch.as_deref(),
        };

        let response = self
            .request(Method::PUT, token, repository, &request.path)
            .json(&body)
            .send()
            .await?;
        let body = read_success_body(response).await?;

        // The status code is authoritative; a body we cannot read is not a failure.
        Ok(serde_json::from_str::<RawPutResponse>(&body)
            .ok()
            .and_then(|parsed| parsed.content)
            .and_then(RawContentItem::into_handle))
    }
}

fn contents_url(base: &str, repository: &RepositoryBinding, path: &str) -> String {
    let encoded_path = path
        .trim_matches('/')
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/");
    format!(
        "{}/repos/{}/{}/contents/{}",
        base.trim_end_matches('/'),
        urlencoding::encode(&repository.owner),
        urlencoding::encode(&repository.repo),
        encoded_path
    )
}

async fn read_success_body(response: reqwest::Response) -> Result<String, ContentsError> {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    if status.is_success() {
        return Ok(body);
    }

    let message = extract_error_message(&body);
    Err(match status {
        StatusCode::NOT_FOUND => ContentsError::NotFound,
        StatusCode::UNAUTHORIZED => ContentsError::Unauthorized(message),
        StatusCode::CONFLICT => ContentsError::Conflict { status, message },
        // 422 is also GitHub's answer to malformed writes; only sha complaints are races.
        StatusCode::UNPROCESSABLE_ENTITY if mentions_sha(&message) => {
            ContentsError::Conflict { status, message }
        }
        _ => ContentsError::UnexpectedStatus { status, message },
    })
}

fn mentions_sha(message: &str) -> bool {
    message.to_ascii_lowercase().contains("sha")
}

fn extract_error_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct GitHubErrorBody {
        message: Option<String>,
    }

    if let Ok(parsed) = serde_json::from_str::<GitHubErrorBody>(body) {
        if let Some(message) = parsed.message {
            if !message.trim().is_empty() {
                return message;
            }
        }
    }

    let fallback = body.trim();
    if fallback.is_empty() {
        "GitHub request failed".to_string()
    } else {
        fallback.to_string()
    }
}
