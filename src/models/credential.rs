use chrono::{DateTime, Utc};

/// A GitHub access token held for one owner until `expires_at`.
#[derive(Clone)]
pub struct Credential {
    pub owner_id: String,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl Credential {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("owner_id", &self.owner_id)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}
