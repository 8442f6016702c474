use serde::{Deserialize, Serialize};

pub const DEFAULT_COMMIT_MESSAGE: &str = "Add TIL via TIL Converter";

/// What a caller asks to publish.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PublishRequest {
    pub content: String,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub commit_message: Option<String>,
}

/// A resolved write, built once per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishTarget {
    pub relative_path: String,
    pub content: String,
    pub commit_message: String,
}

/// Current version of a file in the remote tree.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteFileHandle {
    pub path: String,
    pub sha: String,
}

/// Outcome of a content probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteContent {
    File(RemoteFileHandle),
    Directory(Vec<RemoteFileHandle>),
}

impl RemoteContent {
    /// The sha to send when overwriting this path, if it is a file.
    pub fn file_sha(&self) -> Option<&str> {
        match self {
            RemoteContent::File(handle) => Some(handle.sha.as_str()),
            RemoteContent::Directory(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishedFile {
    pub url: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
    pub created: bool,
}
