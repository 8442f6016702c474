use async_trait::async_trait;

use crate::services::github::{
    errors::GitHubAuthError,
    models::{GitHubToken, GitHubUser},
    service::GitHubOAuthService,
};

/// Succeeds with canned values, or fails the code exchange when
/// `fail_exchange` is set.
#[derive(Default)]
pub struct MockGitHubOAuth {
    pub token: GitHubToken,
    pub user_info: GitHubUser,
    pub fail_exchange: bool,
}

impl MockGitHubOAuth {
    pub fn for_user(id: i64, login: &str, token: &str) -> Self {
        Self {
            token: GitHubToken {
                access_token: token.to_string(),
            },
            user_info: GitHubUser {
                id,
                login: login.to_string(),
                name: login.to_string(),
                email: format!("{login}@github.com"),
                avatar_url: format!("https://avatars.example/{login}.png"),
                html_url: format!("https://github.com/{login}"),
            },
            fail_exchange: false,
        }
    }
}

#[async_trait]
impl GitHubOAuthService for MockGitHubOAuth {
    fn authorize_url(&self, state: &str) -> String {
        format!("https://github.com/login/oauth/authorize?client_id=test&state={state}")
    }

    async fn exchange_code_for_token(&self, _code: &str) -> Result<GitHubToken, GitHubAuthError> {
        if self.fail_exchange {
            return Err(GitHubAuthError::TokenExchangeFailed);
        }
        Ok(self.token.clone())
    }

    async fn fetch_user_info(&self, _token: &GitHubToken) -> Result<GitHubUser, GitHubAuthError> {
        Ok(self.user_info.clone())
    }
}
