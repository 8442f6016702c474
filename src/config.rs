use std::env;

use thiserror::Error;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_FRONTEND_ORIGIN: &str = "http://localhost:3000";
const GITHUB_AUTHORIZE_URL: &str = "https://github.com/login/oauth/authorize";
const GITHUB_TOKEN_URL: &str = "https://github.com/login/oauth/access_token";
const GITHUB_API_BASE_URL: &str = "https://api.github.com";
const DEFAULT_BRANCH: &str = "main";
const DEFAULT_LLM_API_URL: &str = "http://llm-server:5000/api/v1";
const DEFAULT_JWT_ISSUER: &str = "tilhub-backend";
const DEFAULT_JWT_AUDIENCE: &str = "tilhub-frontend";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Clone)]
pub struct GitHubSettings {
    pub client_id: String,
    pub client_secret: String,
    pub callback_url: String,
    pub authorize_url: String,
    pub token_url: String,
    pub api_base_url: String,
    pub branch: String,
    pub token_ttl_days: i64,
    pub scaffold_directories: bool,
}

#[derive(Clone)]
pub struct LlmSettings {
    pub api_url: String,
    pub api_key: String,
}

#[derive(Clone)]
pub struct JwtSettings {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
}

#[derive(Clone, Copy)]
pub struct RateLimitSettings {
    pub per_millisecond: u64,
    pub burst: u32,
}

#[derive(Clone)]
pub struct Config {
    pub port: u16,
    pub frontend_origin: String,
    pub github: GitHubSettings,
    pub llm: LlmSettings,
    pub jwt: JwtSettings,
    pub rate_limit: RateLimitSettings,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok(); // Load .env file
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process
    /// environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let required = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let port = parse_or(&get, "PORT", DEFAULT_PORT)?;
        let frontend_origin =
            get("FRONTEND_ORIGIN").unwrap_or_else(|| DEFAULT_FRONTEND_ORIGIN.to_string());

        let github = GitHubSettings {
            client_id: required("GITHUB_CLIENT_ID")?,
            client_secret: required("GITHUB_CLIENT_SECRET")?,
            callback_url: get("GITHUB_CALLBACK_URL")
                .unwrap_or_else(|| format!("http://localhost:{}/auth/github/callback", port)),
            authorize_url: get("GITHUB_OAUTH_AUTHORIZE_URL")
                .unwrap_or_else(|| GITHUB_AUTHORIZE_URL.to_string()),
            token_url: get("GITHUB_OAUTH_TOKEN_URL")
                .unwrap_or_else(|| GITHUB_TOKEN_URL.to_string()),
            api_base_url: get("GITHUB_API_BASE_URL")
                .unwrap_or_else(|| GITHUB_API_BASE_URL.to_string()),
            branch: get("GITHUB_BRANCH").unwrap_or_else(|| DEFAULT_BRANCH.to_string()),
            token_ttl_days: parse_or(
                &get,
                "GITHUB_TOKEN_TTL_DAYS",
                crate::store::token_registry::DEFAULT_TOKEN_TTL_DAYS,
            )?,
            scaffold_directories: parse_bool_or(&get, "SCAFFOLD_DIRECTORIES", true)?,
        };

        if github.token_ttl_days <= 0 {
            return Err(ConfigError::Invalid {
                name: "GITHUB_TOKEN_TTL_DAYS",
                value: github.token_ttl_days.to_string(),
            });
        }

        let llm = LlmSettings {
            api_url: get("LLM_API_URL").unwrap_or_else(|| DEFAULT_LLM_API_URL.to_string()),
            api_key: get("LLM_API_KEY").unwrap_or_default(),
        };

        let jwt = JwtSettings {
            secret: required("JWT_SECRET")?,
            issuer: get("JWT_ISSUER").unwrap_or_else(|| DEFAULT_JWT_ISSUER.to_string()),
            audience: get("JWT_AUDIENCE").unwrap_or_else(|| DEFAULT_JWT_AUDIENCE.to_string()),
        };

        // Default: 200ms/token (~5 req/sec) with short bursts
        let rate_limit = RateLimitSettings {
            per_millisecond: parse_or(&get, "RATE_LIMITER_MILLISECONDS", 200)?,
            burst: parse_or(&get, "RATE_LIMITER_BURST", 20)?,
        };

        Ok(Config {
            port,
            frontend_origin,
            github,
            llm,
            jwt,
            rate_limit,
        })
    }
}

fn parse_or<G, T>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    G: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match get(key) {
        Some(raw) => raw.trim().parse::<T>().map_err(|_| ConfigError::Invalid {
            name: key,
            value: raw,
        }),
        None => Ok(default),
    }
}

fn parse_bool_or<G>(get: &G, key: &'static str, default: bool) -> Result<bool, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::Invalid {
                name: key,
                value: raw,
            }),
        },
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const REQUIRED: [(&str, &str); 3] = [
        ("GITHUB_CLIENT_ID", "client"),
        ("GITHUB_CLIENT_SECRET", "secret"),
        ("JWT_SECRET", "0123456789abcdef0123456789abcdef"),
    ];

    #[test]
    fn defaults_apply_when_only_required_values_are_set() {
        let config = Config::from_lookup(lookup(&REQUIRED)).expect("config");

        assert_eq!(config.port, 3000);
        assert_eq!(config.github.branch, "main");
        assert_eq!(config.github.token_ttl_days, 7);
        assert!(config.github.scaffold_directories);
        assert_eq!(config.github.api_base_url, "https://api.github.com");
        assert_eq!(
            config.github.callback_url,
            "http://localhost:3000/auth/github/callback"
        );
        assert_eq!(config.llm.api_url, "http://llm-server:5000/api/v1");
        assert_eq!(config.rate_limit.per_millisecond, 200);
        assert_eq!(config.rate_limit.burst, 20);
    }

    #[test]
    fn missing_required_value_is_reported() {
        let err = Config::from_lookup(lookup(&REQUIRED[..2])).err();
        assert_eq!(err, Some(ConfigError::Missing("JWT_SECRET")));
    }

    #[test]
    fn blank_values_count_as_missing() {
        let mut pairs = REQUIRED.to_vec();
        pairs[0] = ("GITHUB_CLIENT_ID", "   ");
        let err = Config::from_lookup(lookup(&pairs)).err();
        assert_eq!(err, Some(ConfigError::Missing("GITHUB_CLIENT_ID")));
    }

    #[test]
    fn scaffolding_can_be_disabled() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("SCAFFOLD_DIRECTORIES", "off"));
        let config = Config::from_lookup(lookup(&pairs)).expect("config");
        assert!(!config.github.scaffold_directories);
    }

    #[test]
    fn invalid_numbers_are_rejected() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("PORT", "not-a-port"));
        assert!(matches!(
            Config::from_lookup(lookup(&pairs)),
            Err(ConfigError::Invalid { name: "PORT", .. })
        ));

        let mut pairs = REQUIRED.to_vec();
        pairs.push(("GITHUB_TOKEN_TTL_DAYS", "0"));
        assert!(matches!(
            Config::from_lookup(lookup(&pairs)),
            Err(ConfigError::Invalid {
                name: "GITHUB_TOKEN_TTL_DAYS",
                ..
            })
        ));
    }
}
