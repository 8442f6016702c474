use crate::config::Config;
use crate::services::github::service::GitHubOAuthService;
use crate::services::llm::LlmClient;
use crate::services::publisher::ContentPublisher;
use crate::store::{RepositoryBindingStore, TokenRegistry};
use crate::utils::jwt::{SessionTokenProvider, SessionTokens};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub sessions: Arc<SessionTokens>,
    pub tokens: Arc<dyn TokenRegistry>,
    pub repositories: Arc<dyn RepositoryBindingStore>,
    pub github_oauth: Arc<dyn GitHubOAuthService>,
    pub publisher: Arc<ContentPublisher>,
    pub llm: Arc<LlmClient>,
}

impl SessionTokenProvider for AppState {
    fn session_tokens(&self) -> &SessionTokens {
        self.sessions.as_ref()
    }
}
