// services/github/models.rs
use serde::{Deserialize, Serialize};

/// Query GitHub appends to the callback URL. `error` is set when the user
/// declined the authorization.
#[derive(Deserialize, Default)]
pub struct GitHubCallback {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Deserialize)]
pub struct GitHubLoginRequest {
    #[serde(default)]
    pub code: String,
}

#[derive(Deserialize, Clone, Default)]
pub struct GitHubToken {
    pub access_token: String,
}

impl std::fmt::Debug for GitHubToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubToken").finish_non_exhaustive()
    }
}

/// Identity of the caller as reported by `GET /user`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GitHubUser {
    pub id: i64,
    pub login: String,
    pub name: String,
    pub email: String,
    pub avatar_url: String,
    pub html_url: String,
}

impl GitHubUser {
    /// Internal owner identifier used to key tokens and repository bindings.
    pub fn owner_id(&self) -> String {
        self.id.to_string()
    }
}

#[derive(Deserialize)]
pub(crate) struct RawGitHubUser {
    pub id: Option<i64>,
    pub login: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    pub html_url: Option<String>,
}

#[derive(Deserialize)]
pub(crate) struct TokenExchangeResponse {
    pub access_token: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}
