use async_trait::async_trait;
use dashmap::DashMap;
use tracing::info;

use crate::models::repository::RepositoryBinding;

/// Repository each owner publishes into. Entries never expire.
#[async_trait]
pub trait RepositoryBindingStore: Send + Sync {
    async fn store(&self, owner_id: &str, binding: RepositoryBinding);
    async fn get(&self, owner_id: &str) -> Option<RepositoryBinding>;
}

#[derive(Default)]
pub struct InMemoryRepositoryStore {
    entries: DashMap<String, RepositoryBinding>,
}

impl InMemoryRepositoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RepositoryBindingStore for InMemoryRepositoryStore {
    async fn store(&self, owner_id: &str, binding: RepositoryBinding) {
        info!(%owner_id, repository = %binding.full_name(), "stored repository binding");
        self.entries.insert(owner_id.to_string(), binding);
    }

    async fn get(&self, owner_id: &str) -> Option<RepositoryBinding> {
        self.entries.get(owner_id).map(|entry| entry.clone())
    }
}
