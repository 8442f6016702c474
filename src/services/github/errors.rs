// services/github/errors.rs
use std::fmt;

#[derive(Debug)]
pub enum GitHubAuthError {
    MissingCode,
    MissingStateCookie,
    InvalidState,
    TokenExchangeFailed,
    InvalidTokenJson,
    UserInfoFetchFailed,
    InvalidUserInfo,
    JwtCreationFailed,
}

impl GitHubAuthError {
    /// Stable code reported to API clients.
    pub fn code(&self) -> &'static str {
        use GitHubAuthError::*;
        match self {
            MissingCode => "invalid_request",
            MissingStateCookie | InvalidState => "invalid_state",
            TokenExchangeFailed | InvalidTokenJson | UserInfoFetchFailed | InvalidUserInfo => {
                "invalid_github_code"
            }
            JwtCreationFailed => "internal_server_error",
        }
    }
}

impl fmt::Display for GitHubAuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use GitHubAuthError::*;
        match self {
            MissingCode => write!(f, "GitHub authorization code is required"),
            MissingStateCookie => write!(f, "Missing 'oauth_state' cookie"),
            InvalidState => write!(f, "Invalid state parameter"),
            TokenExchangeFailed => write!(f, "GitHub token exchange failed"),
            InvalidTokenJson => write!(f, "Invalid GitHub token"),
            UserInfoFetchFailed => write!(f, "Failed to fetch GitHub user info"),
            InvalidUserInfo => write!(f, "Invalid GitHub user info"),
            JwtCreationFailed => write!(f, "JWT generation failed"),
        }
    }
}

impl std::error::Error for GitHubAuthError {}
