pub mod errors;
pub mod scaffolder;
pub mod service;

pub use errors::PublishError;
pub use scaffolder::{DirectoryScaffolder, PLACEHOLDER_FILE_NAME};
pub use service::{ContentPublisher, PublishOptions};
