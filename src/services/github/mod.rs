pub mod client;
pub mod contents;
pub mod errors;
pub mod models;
pub mod service;

#[cfg(test)]
pub mod mock_contents;
#[cfg(test)]
pub mod mock_github_oauth;

pub(crate) const USER_AGENT: &str = "tilhub-backend";
pub(crate) const GITHUB_API_VERSION: &str = "2022-11-28";
