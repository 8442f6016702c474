use std::sync::Arc;

use chrono::{Local, NaiveDate};
use tracing::{info, warn};

use super::errors::PublishError;
use super::scaffolder::DirectoryScaffolder;
use crate::models::publish::{PublishRequest, PublishTarget, PublishedFile, DEFAULT_COMMIT_MESSAGE};
use crate::services::github::contents::{ContentsApi, PutContentRequest};
use crate::store::{RepositoryBindingStore, TokenRegistry};
use crate::utils::date_path;

#[derive(Debug, Clone)]
pub struct PublishOptions {
    pub branch: String,
    pub scaffold_directories: bool,
}

impl Default for PublishOptions {
    fn default() -> Self {
        Self {
            branch: "main".to_string(),
            scaffold_directories: true,
        }
    }
}

/// Writes a user's Markdown note into their bound GitHub repository.
pub struct ContentPublisher {
    tokens: Arc<dyn TokenRegistry>,
    repositories: Arc<dyn RepositoryBindingStore>,
    contents: Arc<dyn ContentsApi>,
    scaffolder: DirectoryScaffolder,
    options: PublishOptions,
}

impl ContentPublisher {
    pub fn new(
        tokens: Arc<dyn TokenRegistry>,
        repositories: Arc<dyn RepositoryBindingStore>,
        contents: Arc<dyn ContentsApi>,
        options: PublishOptions,
    ) -> Self {
        let scaffolder = DirectoryScaffolder::new(contents.clone(), Some(options.branch.clone()));
        Self {
            tokens,
            repositories,
            contents,
            scaffolder,
            options,
        }
    }

    pub fn options(&self) -> &PublishOptions {
        &self.options
    }

    /// Publishes using today's local date when no path is given.
    pub async fn publish(
        &self,
        owner_id: &str,
        request: PublishRequest,
    ) -> Result<PublishedFile, PublishError> {
        self.publish_on(owner_id, request, Local::now().date_naive())
            .await
    }

    /// Same as [`publish`](Self::publish) with the date used for derived paths
    /// pinned to `today`.
    pub async fn publish_on(
        &self,
        owner_id: &str,
        request: PublishRequest,
        today: NaiveDate,
    ) -> Result<PublishedFile, PublishError> {
        let token = self
            .tokens
            .get(owner_id)
            .await
            .ok_or(PublishError::CredentialMissing)?;

        let repository = self
            .repositories
            .get(owner_id)
            .await
            .ok_or(PublishError::RepositoryNotBound)?;

        let target = resolve_target(request, today)?;
        let branch = Some(self.options.branch.clone());

        if self.options.scaffold_directories {
            let directory = date_path::split_directory(&target.relative_path);
            let created = self
                .scaffolder
                .ensure_directory(&token, &repository, directory)
                .await?;
            if !created.is_empty() {
                info!(%owner_id, ?created, "scaffolded directories before publish");
            }
        }

        let existing_sha = match self
            .contents
            .get_content(&token, &repository, &target.relative_path, branch.clone())
            .await
        {
            Ok(existing) => existing.file_sha().map(str::to_string),
            Err(err) if err.is_not_found() => None,
            Err(err) => {
                warn!(%owner_id, path = %target.relative_path, "existing file probe failed: {err}");
                return Err(PublishError::from_remote(err));
            }
        };
        let created = existing_sha.is_none();

        let written = self
            .contents
            .put_content(
                &token,
                &repository,
                PutContentRequest {
                    path: target.relative_path.clone(),
                    message: target.commit_message,
                    content: target.content,
                    sha: existing_sha,
                    branch,
                },
            )
            .await
            .map_err(|err| {
                warn!(%owner_id, path = %target.relative_path, "publish write failed: {err}");
                PublishError::from_remote(err)
            })?;

        info!(
            %owner_id,
            repository = %repository.full_name(),
            path = %target.relative_path,
            created,
            "published note"
        );

        Ok(PublishedFile {
            url: repository.blob_url(&self.options.branch, &target.relative_path),
            path: target.relative_path,
            sha: written.map(|handle| handle.sha),
            created,
        })
    }
}

/// Turns a request into the concrete write. A missing or blank path derives
/// one from `today`; a path ending in `/` names a directory that receives the
/// derived file name.
pub fn resolve_target(
    request: PublishRequest,
    today: NaiveDate,
) -> Result<PublishTarget, PublishError> {
    let derived = |directory: &str| -> Result<String, PublishError> {
        if directory.is_empty() {
            return date_path::full_path(&today)
                .map_err(|err| PublishError::InternalFailure(err.to_string()));
        }
        Ok(format!("{}/{}", directory, date_path::file_name(&today)))
    };

    let relative_path = match request.path.as_deref().map(str::trim) {
        None | Some("") => derived("")?,
        Some(path) if path.ends_with('/') => derived(&collapse_slashes(path))?,
        Some(path) => collapse_slashes(path),
    };

    let commit_message = request
        .commit_message
        .map(|message| message.trim().to_string())
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| DEFAULT_COMMIT_MESSAGE.to_string());

    Ok(PublishTarget {
        relative_path,
        content: request.content,
        commit_message,
    })
}

/// Drops empty segments so the written path and the reported path agree.
fn collapse_slashes(path: &str) -> String {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}
