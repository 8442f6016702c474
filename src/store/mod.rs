pub mod repository_store;
pub mod token_registry;

pub use repository_store::{InMemoryRepositoryStore, RepositoryBindingStore};
pub use token_registry::{InMemoryTokenRegistry, TokenRegistry};
