// services/github/client.rs

use async_trait::async_trait;
use reqwest::{Client, Url};
use tracing::warn;

use super::errors::GitHubAuthError;
use super::models::{GitHubToken, GitHubUser, RawGitHubUser, TokenExchangeResponse};
use super::service::GitHubOAuthService;
use super::{GITHUB_API_VERSION, USER_AGENT};
use crate::config::GitHubSettings;

/// `repo` is needed to write into the user's repositories.
const OAUTH_SCOPE: &str = "repo read:user user:email";

#[derive(Clone)]
pub struct GitHubOAuthClient {
    pub client: Client,
    pub settings: GitHubSettings,
}

impl GitHubOAuthClient {
    pub fn new(client: Client, settings: GitHubSettings) -> Self {
        Self { client, settings }
    }
}

#[async_trait]
impl GitHubOAuthService for GitHubOAuthClient {
    fn authorize_url(&self, state: &str) -> String {
        match Url::parse(&self.settings.authorize_url) {
            Ok(mut url) => {
                url.query_pairs_mut()
                    .append_pair("client_id", &self.settings.client_id)
                    .append_pair("redirect_uri", &self.settings.callback_url)
                    .append_pair("scope", OAUTH_SCOPE)
                    .append_pair("state", state);
                url.to_string()
            }
            Err(_) => format!(
                "{}?client_id={}&redirect_uri={}&scope={}&state={}",
                self.settings.authorize_url,
                urlencoding::encode(&self.settings.client_id),
                urlencoding::encode(&self.settings.callback_url),
                urlencoding::encode(OAUTH_SCOPE),
                urlencoding::encode(state),
            ),
        }
    }

    async fn exchange_code_for_token(&self, code: &str) -> Result<GitHubToken, GitHubAuthError> {
        let res = self
            .client
            .post(&self.settings.token_url)
            .header("Accept", "application/json") // Needed to get JSON response instead of URL-encoded
            .form(&[
                ("client_id", self.settings.client_id.as_str()),
                ("client_secret", self.settings.client_secret.as_str()),
                ("code", code),
                ("redirect_uri", self.settings.callback_url.as_str()),
            ])
            .send()
            .await
            .map_err(|err| {
                warn!("GitHub token exchange request failed: {err}");
                GitHubAuthError::TokenExchangeFailed
            })?;

        if !res.status().is_success() {
            warn!(status = %res.status(), "GitHub token exchange rejected");
            return Err(GitHubAuthError::TokenExchangeFailed);
        }

        let body: TokenExchangeResponse = res
            .json()
            .await
            .map_err(|_| GitHubAuthError::InvalidTokenJson)?;

        if let Some(error) = body.error {
            warn!(
                error = %error,
                description = body.error_description.as_deref().unwrap_or(""),
                "GitHub token exchange returned an error"
            );
            return Err(GitHubAuthError::TokenExchangeFailed);
        }

        match body.access_token {
            Some(access_token) if !access_token.is_empty() => Ok(GitHubToken { access_token }),
            _ => Err(GitHubAuthError::InvalidTokenJson),
        }
    }

    async fn fetch_user_info(&self, token: &GitHubToken) -> Result<GitHubUser, GitHubAuthError> {
        let url = format!("{}/user", self.settings.api_base_url.trim_end_matches('/'));
        let user_resp = self
            .client
            .get(url)
            .bearer_auth(&token.access_token)
            .header("User-Agent", USER_AGENT)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", GITHUB_API_VERSION)
            .send()
            .await
            .map_err(|_| GitHubAuthError::UserInfoFetchFailed)?;

        if !user_resp.status().is_success() {
            warn!(status = %user_resp.status(), "GitHub user info request rejected");
            return Err(GitHubAuthError::UserInfoFetchFailed);
        }

        let raw: RawGitHubUser = user_resp
            .json()
            .await
            .map_err(|_| GitHubAuthError::InvalidUserInfo)?;

        let id = raw.id.ok_or(GitHubAuthError::InvalidUserInfo)?;
        let login = raw
            .login
            .filter(|login| !login.trim().is_empty())
            .ok_or(GitHubAuthError::InvalidUserInfo)?;

        let name = raw
            .name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| login.clone());
        // GitHub hides the address unless the user made it public
        let email = raw
            .email
            .filter(|email| !email.trim().is_empty())
            .unwrap_or_else(|| format!("{}@github.com", login));

        Ok(GitHubUser {
            id,
            name,
            email,
            avatar_url: raw.avatar_url.unwrap_or_default(),
            html_url: raw
                .html_url
                .unwrap_or_else(|| format!("https://github.com/{}", login)),
            login,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn settings(base: &str) -> GitHubSettings {
        GitHubSettings {
            client_id: "client-id".into(),
            client_secret: "client-secret".into(),
            callback_url: "http://localhost:3000/auth/github/callback".into(),
            authorize_url: "https://github.com/login/oauth/authorize".into(),
            token_url: format!("{}/login/oauth/access_token", base),
            api_base_url: base.to_string(),
            branch: "main".into(),
            token_ttl_days: 7,
            scaffold_directories: true,
        }
    }

    fn client_for(server: &httpmock::MockServer) -> GitHubOAuthClient {
        GitHubOAuthClient::new(Client::new(), settings(&server.url("")))
    }

    #[test]
    fn authorize_url_carries_client_scope_and_state() {
        let client = GitHubOAuthClient::new(Client::new(), settings("http://localhost"));
        let url = client.authorize_url("abc123");

        assert!(url.starts_with("https://github.com/login/oauth/authorize?"));
        assert!(url.contains("client_id=client-id"));
        assert!(url.contains("state=abc123"));
        assert!(url.contains("scope=repo"));
    }

    #[tokio::test]
    async fn exchange_returns_access_token() {
        let server = httpmock::MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(httpmock::Method::POST)
                .path("/login/oauth/access_token")
                .header("accept", "application/json")
                .body_contains("code=the-code")
                .body_contains("client_secret=client-secret");
            then.status(200)
                .header("content-type", "application/json")
                .body(json!({ "access_token": "gho_123", "token_type": "bearer" }).to_string());
        });

        let token = client_for(&server)
            .exchange_code_for_token("the-code")
            .await
            .expect("token");

        mock.assert();
        assert_eq!(token.access_token, "gho_123");
    }

    #[tokio::test]
    async fn exchange_error_payload_is_a_failure() {
        let server = httpmock::MockServer::start();
        server.mock(|when, then| {
            when.method(httpmock::Method::POST);
            then.status(200)
                .header("content-type", "application/json")
                .body(
                    json!({
                        "error": "bad_verification_code",
                        "error_description": "The code passed is incorrect or expired."
                    })
                    .to_string(),
                );
        });

        let err = client_for(&server)
            .exchange_code_for_token("stale")
            .await
            .unwrap_err();
        assert!(matches!(err, GitHubAuthError::TokenExchangeFailed));
    }

    #[tokio::test]
    async fn exchange_without_token_is_invalid_json() {
        let server = httpmock::MockServer::start();
        server.mock(|when, then| {
            when.method(httpmock::Method::POST);
            then.status(200)
                .header("content-type", "application/json")
                .body("{}");
        });

        let err = client_for(&server)
            .exchange_code_for_token("code")
            .await
            .unwrap_err();
        assert!(matches!(err, GitHubAuthError::InvalidTokenJson));
    }

    #[tokio::test]
    async fn exchange_non_success_status_fails() {
        let server = httpmock::MockServer::start();
        server.mock(|when, then| {
            when.method(httpmock::Method::POST);
            then.status(500);
        });

        let err = client_for(&server)
            .exchange_code_for_token("code")
            .await
            .unwrap_err();
        assert!(matches!(err, GitHubAuthError::TokenExchangeFailed));
    }

    #[tokio::test]
    async fn fetch_user_info_fills_fallbacks() {
        let server = httpmock::MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(httpmock::Method::GET)
                .path("/user")
                .header("authorization", "Bearer gho_123");
            then.status(200)
                .header("content-type", "application/json")
                .body(
                    json!({
                        "id": 42,
                        "login": "alice",
                        "name": null,
                        "email": null,
                        "avatar_url": "https://avatars.example/alice.png",
                        "html_url": "https://github.com/alice"
                    })
                    .to_string(),
                );
        });

        let user = client_for(&server)
            .fetch_user_info(&GitHubToken {
                access_token: "gho_123".into(),
            })
            .await
            .expect("user");

        mock.assert();
        assert_eq!(user.id, 42);
        assert_eq!(user.owner_id(), "42");
        assert_eq!(user.name, "alice");
        assert_eq!(user.email, "alice@github.com");
        assert_eq!(user.avatar_url, "https://avatars.example/alice.png");
    }

    #[tokio::test]
    async fn fetch_user_info_rejected_credential_fails() {
        let server = httpmock::MockServer::start();
        server.mock(|when, then| {
            when.method(httpmock::Method::GET).path("/user");
            then.status(401)
                .header("content-type", "application/json")
                .body(json!({ "message": "Bad credentials" }).to_string());
        });

        let err = client_for(&server)
            .fetch_user_info(&GitHubToken {
                access_token: "revoked".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, GitHubAuthError::UserInfoFetchFailed));
    }
}
