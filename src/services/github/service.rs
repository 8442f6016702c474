// services/github/service.rs

use super::{
    errors::GitHubAuthError,
    models::{GitHubToken, GitHubUser},
};
use async_trait::async_trait;

#[async_trait]
pub trait GitHubOAuthService: Send + Sync {
    /// Authorization page the browser is sent to, carrying `state`.
    fn authorize_url(&self, state: &str) -> String;
    async fn exchange_code_for_token(&self, code: &str) -> Result<GitHubToken, GitHubAuthError>;
    async fn fetch_user_info(&self, token: &GitHubToken) -> Result<GitHubUser, GitHubAuthError>;
}
