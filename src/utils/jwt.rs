use std::collections::HashSet;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use crate::config::JwtSettings;
use crate::routes::auth::claims::Claims;

pub const MIN_SECRET_BYTES: usize = 32;
const MIN_DISTINCT_SECRET_BYTES: usize = 8;
/// Matches the default lifetime of the stored GitHub credential.
pub const SESSION_TTL_DAYS: i64 = 7;

#[derive(Debug, Error)]
pub enum SessionTokenError {
    #[error("JWT_SECRET is {0} bytes long; at least {MIN_SECRET_BYTES} are required")]
    SecretTooShort(usize),
    #[error("JWT_SECRET uses {0} distinct bytes; at least {MIN_DISTINCT_SECRET_BYTES} are required")]
    SecretTooUniform(usize),
    #[error("could not sign session token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
    #[error("session token rejected: {0}")]
    Rejected(#[source] jsonwebtoken::errors::Error),
}

/// Issues and verifies the HS256 session tokens handed out after a GitHub
/// login. Issuer, audience and lifetime are fixed at construction.
pub struct SessionTokens {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    issuer: String,
    audience: String,
    ttl: Duration,
}

impl std::fmt::Debug for SessionTokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTokens")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl SessionTokens {
    pub fn new(settings: &JwtSettings) -> Result<Self, SessionTokenError> {
        Self::with_ttl(settings, Duration::days(SESSION_TTL_DAYS))
    }

    pub fn with_ttl(settings: &JwtSettings, ttl: Duration) -> Result<Self, SessionTokenError> {
        let secret = settings.secret.as_bytes();
        check_secret(secret)?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&settings.issuer]);
        validation.set_audience(&[&settings.audience]);
        validation.set_required_spec_claims(&["exp", "sub", "iss", "aud"]);
        validation.leeway = 0;

        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            issuer: settings.issuer.clone(),
            audience: settings.audience.clone(),
            ttl,
        })
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Signs a session for `owner_id` that expires after the configured ttl.
    pub fn issue(
        &self,
        owner_id: &str,
        login: &str,
        email: &str,
    ) -> Result<String, SessionTokenError> {
        let expires_at = Utc::now() + self.ttl;
        let claims = Claims {
            sub: owner_id.to_string(),
            login: login.to_string(),
            email: email.to_string(),
            exp: expires_at.timestamp().max(0) as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(SessionTokenError::Signing)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, SessionTokenError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(SessionTokenError::Rejected)
    }
}

/// Implemented by router state so the session extractor can reach the signer.
pub trait SessionTokenProvider {
    fn session_tokens(&self) -> &SessionTokens;
}

fn check_secret(secret: &[u8]) -> Result<(), SessionTokenError> {
    if secret.len() < MIN_SECRET_BYTES {
        return Err(SessionTokenError::SecretTooShort(secret.len()));
    }
    let distinct = secret.iter().collect::<HashSet<_>>().len();
    if distinct < MIN_DISTINCT_SECRET_BYTES {
        return Err(SessionTokenError::SecretTooUniform(distinct));
    }
    Ok(())
}
