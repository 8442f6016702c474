use std::sync::Arc;

use tracing::{debug, info, warn};

use super::errors::PublishError;
use crate::models::repository::RepositoryBinding;
use crate::services::github::contents::{ContentsApi, PutContentRequest};

/// Zero-byte file written to make a directory exist.
pub const PLACEHOLDER_FILE_NAME: &str = ".keep-marker";

/// Makes sure every ancestor directory of a path exists in the remote tree.
///
/// The walk is strictly sequential: each prefix is probed (and created if
/// missing) before the next one is looked at. Placeholders created before a
/// failure are left in place; running the walk again skips them.
pub struct DirectoryScaffolder {
    contents: Arc<dyn ContentsApi>,
    branch: Option<String>,
}

impl DirectoryScaffolder {
    pub fn new(contents: Arc<dyn ContentsApi>, branch: Option<String>) -> Self {
        Self { contents, branch }
    }

    /// Returns the directory prefixes that had to be created.
    pub async fn ensure_directory(
        &self,
        token: &str,
        repository: &RepositoryBinding,
        directory: &str,
    ) -> Result<Vec<String>, PublishError> {
        let mut created = Vec::new();
        let mut prefix = String::new();

        for segment in directory_segments(directory) {
            if !prefix.is_empty() {
                prefix.push('/');
            }
            prefix.push_str(segment);

            match self
                .contents
                .get_content(token, repository, &prefix, self.branch.clone())
                .await
            {
                Ok(_) => {
                    debug!(repository = %repository.full_name(), %prefix, "directory exists");
                }
                Err(err) if err.is_not_found() => {
                    self.create_placeholder(token, repository, &prefix).await?;
                    created.push(prefix.clone());
                }
                Err(err) => {
                    warn!(
                        repository = %repository.full_name(),
                        %prefix,
                        "directory probe failed: {err}"
                    );
                    return Err(PublishError::RemoteWriteFailed {
                        status: err.status(),
                        message: err.to_string(),
                    });
                }
            }
        }

        Ok(created)
    }

    async fn create_placeholder(
        &self,
        token: &str,
        repository: &RepositoryBinding,
        prefix: &str,
    ) -> Result<(), PublishError> {
        let request = PutContentRequest {
            path: format!("{}/{}", prefix, PLACEHOLDER_FILE_NAME),
            message: format!("Create {} directory", prefix),
            content: String::new(),
            sha: None,
            branch: self.branch.clone(),
        };

        self.contents
            .put_content(token, repository, request)
            .await
            .map_err(|err| {
                warn!(
                    repository = %repository.full_name(),
                    %prefix,
                    "placeholder write failed: {err}"
                );
                PublishError::from_remote(err)
            })?;

        info!(repository = %repository.full_name(), %prefix, "created directory");
        Ok(())
    }
}

/// `"a//b/c/"` -> `["a", "b", "c"]`.
pub fn directory_segments(directory: &str) -> Vec<&str> {
    directory
        .trim_matches('/')
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect()
}
