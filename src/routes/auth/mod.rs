pub mod claims;
pub mod github;
pub mod session;

pub use github::{github_callback, github_code_login, github_login, handle_logout, handle_me};
