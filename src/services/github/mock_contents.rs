use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::StatusCode;
use tokio::sync::Barrier;

use crate::models::publish::{RemoteContent, RemoteFileHandle};
use crate::models::repository::RepositoryBinding;
use crate::services::github::contents::{ContentsApi, ContentsError, PutContentRequest};

/// In-memory stand-in for a GitHub repository tree that enforces the
/// contents API's sha rules and treats directories as implied by files.
#[derive(Default)]
pub struct InMemoryContents {
    files: Mutex<BTreeMap<String, String>>,
    next_sha: AtomicUsize,
    pub reads: Mutex<Vec<String>>,
    pub writes: Mutex<Vec<PutContentRequest>>,
    /// Fails every read with this status (other than 404).
    pub fail_reads_with: Option<StatusCode>,
    /// Reads of this path wait here before answering.
    pub read_gate: Option<(String, Arc<Barrier>)>,
}

impl InMemoryContents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(self, path: &str) -> Self {
        let sha = self.mint_sha();
        self.files.lock().unwrap().insert(path.to_string(), sha);
        self
    }

    pub fn sha_of(&self, path: &str) -> Option<String> {
        self.files.lock().unwrap().get(path).cloned()
    }

    pub fn paths(&self) -> Vec<String> {
        self.files.lock().unwrap().keys().cloned().collect()
    }

    pub fn written_paths(&self) -> Vec<String> {
        self.writes
            .lock()
            .unwrap()
            .iter()
            .map(|write| write.path.clone())
            .collect()
    }

    fn mint_sha(&self) -> String {
        format!("sha-{}", self.next_sha.fetch_add(1, Ordering::SeqCst))
    }
}

#[async_trait]
impl ContentsApi for InMemoryContents {
    async fn get_content(
        &self,
        _token: &str,
        _repository: &RepositoryBinding,
        path: &str,
        _branch: Option<String>,
    ) -> Result<RemoteContent, ContentsError> {
        self.reads.lock().unwrap().push(path.to_string());

        if let Some((gated, barrier)) = &self.read_gate {
            if gated == path {
                barrier.wait().await;
            }
        }

        if let Some(status) = self.fail_reads_with {
            return Err(match status {
                StatusCode::UNAUTHORIZED => ContentsError::Unauthorized("Bad credentials".into()),
                status => ContentsError::UnexpectedStatus {
                    status,
                    message: "simulated failure".into(),
                },
            });
        }

        let files = self.files.lock().unwrap();
        if let Some(sha) = files.get(path) {
            return Ok(RemoteContent::File(RemoteFileHandle {
                path: path.to_string(),
                sha: sha.clone(),
            }));
        }

        let prefix = format!("{}/", path.trim_end_matches('/'));
        let entries: Vec<RemoteFileHandle> = files
            .iter()
            .filter(|(file, _)| file.starts_with(&prefix))
            .map(|(file, sha)| RemoteFileHandle {
                path: file.clone(),
                sha: sha.clone(),
            })
            .collect();

        if entries.is_empty() {
            Err(ContentsError::NotFound)
        } else {
            Ok(RemoteContent::Directory(entries))
        }
    }

    async fn put_content(
        &self,
        _token: &str,
        _repository: &RepositoryBinding,
        request: PutContentRequest,
    ) -> Result<Option<RemoteFileHandle>, ContentsError> {
        self.writes.lock().unwrap().push(request.clone());

        let mut files = self.files.lock().unwrap();
        match (files.get(&request.path), request.sha.as_deref()) {
            (Some(_), None) => {
                return Err(ContentsError::Conflict {
                    status: StatusCode::UNPROCESSABLE_ENTITY,
                    message: "\"sha\" wasn't supplied.".into(),
                })
            }
            (Some(current), Some(sent)) if current != sent => {
                return Err(ContentsError::Conflict {
                    status: StatusCode::CONFLICT,
                    message: format!("{} does not match {}", request.path, sent),
                })
            }
            (None, Some(_)) => {
                return Err(ContentsError::Conflict {
                    status: StatusCode::CONFLICT,
                    message: format!("{} does not exist", request.path),
                })
            }
            _ => {}
        }

        let sha = self.mint_sha();
        files.insert(request.path.clone(), sha.clone());
        Ok(Some(RemoteFileHandle {
            path: request.path,
            sha,
        }))
    }
}
