//! In-memory source-control host

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use tokio::sync::Notify;

use doclink_github::{AccessToken, BranchInfo, Error, FileContent, Result, SourceHost};

type FileKey = (String, String, String, String);
type BranchKey = (String, String, String);

#[derive(Default)]
struct HostState {
    /// Plain text per (owner, repo, path, commit); encoded on serve
    files: HashMap<FileKey, String>,
    /// Files that serve an undecodable payload
    corrupt: HashSet<FileKey>,
    branches: HashMap<BranchKey, String>,
    /// file_at_commit calls per commit id
    fetch_counts: HashMap<String, usize>,
    required_token: Option<String>,
    /// One-shot gate: the next branch_head call parks until notified
    branch_gate: Option<Arc<Notify>>,
}

/// In-memory [`SourceHost`] with fetch counters and one-shot async gates
/// for ordering tests.
#[derive(Default)]
pub struct FakeSourceHost {
    state: Mutex<HostState>,
}

impl FakeSourceHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_file(&self, owner: &str, repo: &str, path: &str, commit_id: &str, text: &str) {
        self.lock().files.insert(
            file_key(owner, repo, path, commit_id),
            text.to_string(),
        );
    }

    /// Serve an undecodable payload for this file version.
    pub fn corrupt_file(&self, owner: &str, repo: &str, path: &str, commit_id: &str) {
        self.lock()
            .corrupt
            .insert(file_key(owner, repo, path, commit_id));
    }

    pub fn set_branch_head(&self, owner: &str, repo: &str, branch: &str, commit_id: &str) {
        self.lock().branches.insert(
            (owner.to_string(), repo.to_string(), branch.to_string()),
            commit_id.to_string(),
        );
    }

    /// Reject every call whose token does not match `secret`.
    pub fn require_token(&self, secret: &str) {
        self.lock().required_token = Some(secret.to_string());
    }

    /// Number of `file_at_commit` calls seen for a commit.
    pub fn fetch_count(&self, commit_id: &str) -> usize {
        self.lock()
            .fetch_counts
            .get(commit_id)
            .copied()
            .unwrap_or(0)
    }

    /// Park the next `branch_head` call until the returned handle is
    /// notified. Later calls pass through ungated.
    pub fn gate_next_branch_head(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.lock().branch_gate = Some(gate.clone());
        gate
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HostState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_token(&self, token: &AccessToken) -> Result<()> {
        let state = self.lock();
        match &state.required_token {
            Some(required) if token.secret() != required => Err(Error::Unauthenticated),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl SourceHost for FakeSourceHost {
    async fn file_at_commit(
        &self,
        token: &AccessToken,
        owner: &str,
        repo: &str,
        path: &str,
        commit_id: &str,
    ) -> Result<FileContent> {
        self.check_token(token)?;

        let key = file_key(owner, repo, path, commit_id);
        let mut state = self.lock();
        *state.fetch_counts.entry(commit_id.to_string()).or_insert(0) += 1;

        if state.corrupt.contains(&key) {
            return Ok(FileContent {
                content: "!!!not-base64!!!".to_string(),
            });
        }
        match state.files.get(&key) {
            Some(text) => Ok(FileContent {
                content: STANDARD.encode(text),
            }),
            None => Err(Error::NotFound(format!("{path}@{commit_id}"))),
        }
    }

    async fn branch_head(
        &self,
        token: &AccessToken,
        owner: &str,
        repo: &str,
        branch: &str,
    ) -> Result<BranchInfo> {
        self.check_token(token)?;

        // Resolve the answer before parking so a gated call released later
        // returns the state it saw when it was issued, not the latest state.
        let (gate, result) = {
            let mut state = self.lock();
            let gate = state.branch_gate.take();
            let result = state
                .branches
                .get(&(owner.to_string(), repo.to_string(), branch.to_string()))
                .cloned();
            (gate, result)
        };

        if let Some(gate) = gate {
            gate.notified().await;
        }

        match result {
            Some(commit_id) => Ok(BranchInfo { commit_id }),
            None => Err(Error::NotFound(format!("{owner}/{repo}@{branch}"))),
        }
    }
}

fn file_key(owner: &str, repo: &str, path: &str, commit_id: &str) -> FileKey {
    (
        owner.to_string(),
        repo.to_string(),
        path.to_string(),
        commit_id.to_string(),
    )
}
