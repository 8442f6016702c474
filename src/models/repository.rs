use reqwest::Url;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const HOST_MARKER: &str = "github.com";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("invalid GitHub repository URL: {0}")]
    InvalidRepositoryUrl(String),
}

impl RepositoryError {
    pub fn code(&self) -> &'static str {
        match self {
            RepositoryError::InvalidRepositoryUrl(_) => "invalid_repository_url",
        }
    }
}

/// The repository a user publishes into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryBinding {
    pub owner: String,
    pub repo: String,
}

impl RepositoryBinding {
    /// Parses `https://github.com/{owner}/{repo}[.git][/...]`.
    pub fn parse(repository_url: &str) -> Result<Self, RepositoryError> {
        let raw = repository_url.trim();
        if raw.is_empty() || !raw.contains(HOST_MARKER) {
            return Err(RepositoryError::InvalidRepositoryUrl(
                "URL is not a GitHub repository URL".into(),
            ));
        }

        let with_scheme = if raw.contains("://") {
            raw.to_string()
        } else {
            format!("https://{}", raw)
        };
        let url = Url::parse(&with_scheme).map_err(|err| {
            RepositoryError::InvalidRepositoryUrl(format!("unparseable URL: {err}"))
        })?;

        let segments: Vec<&str> = url
            .path_segments()
            .map(|segments| segments.filter(|s| !s.is_empty()).collect())
            .unwrap_or_default();

        if segments.len() < 2 {
            return Err(RepositoryError::InvalidRepositoryUrl(
                "expected /{owner}/{repository} in the URL path".into(),
            ));
        }

        let owner = segments[0].trim();
        let repo = segments[1].trim();
        let repo = repo.strip_suffix(".git").unwrap_or(repo);

        if owner.is_empty() || repo.is_empty() {
            return Err(RepositoryError::InvalidRepositoryUrl(
                "could not extract owner or repository name".into(),
            ));
        }

        Ok(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
        })
    }

    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }

    /// Browser URL of a file on `branch`.
    pub fn blob_url(&self, branch: &str, path: &str) -> String {
        format!(
            "https://github.com/{}/{}/blob/{}/{}",
            self.owner,
            self.repo,
            branch,
            path.trim_start_matches('/')
        )
    }
}
