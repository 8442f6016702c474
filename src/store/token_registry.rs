use async_trait::async_trait;
use chrono::{Duration, Utc};
use dashmap::DashMap;
use tracing::{info, warn};

use crate::models::credential::Credential;

pub const DEFAULT_TOKEN_TTL_DAYS: i64 = 7;

pub fn default_token_ttl() -> Duration {
    Duration::days(DEFAULT_TOKEN_TTL_DAYS)
}

/// GitHub access tokens keyed by owner id.
///
/// Absence is an ordinary outcome: none of these calls fail.
#[async_trait]
pub trait TokenRegistry: Send + Sync {
    /// Inserts or overwrites the owner's token, expiring `ttl` from now.
    async fn store(&self, owner_id: &str, token: &str, ttl: Duration);

    /// Returns the token unless it is missing or expired. Expired entries are
    /// evicted by this call.
    async fn get(&self, owner_id: &str) -> Option<String>;

    async fn remove(&self, owner_id: &str);

    async fn has_valid(&self, owner_id: &str) -> bool {
        self.get(owner_id).await.is_some()
    }
}

#[derive(Default)]
pub struct InMemoryTokenRegistry {
    entries: DashMap<String, Credential>,
}

impl InMemoryTokenRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries held, expired ones included until their next read.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl TokenRegistry for InMemoryTokenRegistry {
    async fn store(&self, owner_id: &str, token: &str, ttl: Duration) {
        if token.is_empty() {
            warn!(%owner_id, "refusing to store an empty GitHub token");
            return;
        }

        let credential = Credential {
            owner_id: owner_id.to_string(),
            token: token.to_string(),
            expires_at: Utc::now() + ttl,
        };
        info!(%owner_id, expires_at = %credential.expires_at, "stored GitHub token");
        self.entries.insert(owner_id.to_string(), credential);
    }

    async fn get(&self, owner_id: &str) -> Option<String> {
        let now = Utc::now();
        if let Some(entry) = self.entries.get(owner_id) {
            if !entry.is_expired_at(now) {
                return Some(entry.token.clone());
            }
        } else {
            return None;
        }

        // Only evict if the entry is still the expired one; a concurrent store
        // may have replaced it since the read above.
        if self
            .entries
            .remove_if(owner_id, |_, credential| credential.is_expired_at(now))
            .is_some()
        {
            info!(%owner_id, "GitHub token expired and was evicted");
        }
        None
    }

    async fn remove(&self, owner_id: &str) {
        if self.entries.remove(owner_id).is_some() {
            info!(%owner_id, "removed GitHub token");
        }
    }
}
