use std::sync::Arc;

use reqwest::Method;
use serde_json::{json, Value};

use crate::github::transport::{GitTransport, GithubError};

/// One commit's worth of work: relative path → UTF-8 content, in the order
/// the files should become tree entries, plus the commit message.
#[derive(Debug, Clone)]
pub struct CommitRequest {
    pub files: Vec<(String, String)>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommitResult {
    pub commit_sha: String,
    pub commit_url: String,
}

/// Executes the ordered remote sequence that lands a commit on the branch.
///
/// Strictly sequential; no step starts before the previous response is known.
/// A failure aborts the remaining steps, leaving at most orphaned objects for
/// the host to garbage-collect — there is no rollback.
pub struct CommitOrchestrator {
    transport: Arc<dyn GitTransport>,
    owner: String,
    repo: String,
    branch: String,
}

impl CommitOrchestrator {
    pub fn new(transport: Arc<dyn GitTransport>, owner: String, repo: String, branch: String) -> Self {
        Self {
            transport,
            owner,
            repo,
            branch,
        }
    }

    pub fn branch(&self) -> &str {
        &self.branch
    }

    pub fn repository(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }

    /// The commit sequence: ref → head commit → blobs → tree → commit → ref
    /// update. The final PATCH carries `force: false`, so a branch moved by a
    /// concurrent writer between the first and last step is rejected by the
    /// host as a conflict instead of being overwritten.
    pub async fn commit(&self, request: &CommitRequest) -> Result<CommitResult, GithubError> {
        let repo = format!("/repos/{}/{}", self.owner, self.repo);

        let head_ref = self
            .call(
                Method::GET,
                &format!("{repo}/git/ref/heads/{}", self.branch),
                None,
            )
            .await?;
        let head_sha = str_at(&head_ref, "/object/sha")?;

        let head_commit = self
            .call(Method::GET, &format!("{repo}/git/commits/{head_sha}"), None)
            .await?;
        let base_tree_sha = str_at(&head_commit, "/tree/sha")?;

        let mut tree_entries = Vec::with_capacity(request.files.len());
        for (path, content) in &request.files {
            let blob = self
                .call(
                    Method::POST,
                    &format!("{repo}/git/blobs"),
                    Some(json!({ "content": content, "encoding": "utf-8" })),
                )
                .await?;
            tree_entries.push(json!({
                "path": path,
                "mode": "100644",
                "type": "blob",
                "sha": str_at(&blob, "/sha")?,
            }));
        }

        let new_tree = self
            .call(
                Method::POST,
                &format!("{repo}/git/trees"),
                Some(json!({ "base_tree": base_tree_sha, "tree": tree_entries })),
            )
            .await?;
        let tree_sha = str_at(&new_tree, "/sha")?;

        let new_commit = self
            .call(
                Method::POST,
                &format!("{repo}/git/commits"),
                Some(json!({
                    "message": request.message,
                    "tree": tree_sha,
                    "parents": [head_sha],
                })),
            )
            .await?;
        let commit_sha = str_at(&new_commit, "/sha")?;

        self.call(
            Method::PATCH,
            &format!("{repo}/git/refs/heads/{}", self.branch),
            Some(json!({ "sha": commit_sha, "force": false })),
        )
        .await?;

        let commit_url = new_commit
            .pointer("/html_url")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| {
                format!(
                    "https://github.com/{}/{}/commit/{commit_sha}",
                    self.owner, self.repo
                )
            });

        Ok(CommitResult {
            commit_sha,
            commit_url,
        })
    }

    /// Whether a file exists at `path` on the branch. The only caller is the
    /// setup-marker probe, which treats 404 as "absent", not as an error.
    pub async fn path_exists(&self, path: &str) -> Result<bool, GithubError> {
        let url = format!(
            "/repos/{}/{}/contents/{path}?ref={}",
            self.owner, self.repo, self.branch
        );
        let found = self
            .transport
            .request(Method::GET, &url, None, true)
            .await?;
        Ok(found.is_some())
    }

    async fn call(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, GithubError> {
        self.transport
            .request(method, path, body, false)
            .await?
            .ok_or_else(|| GithubError::Decode("empty response body".to_string()))
    }
}

fn str_at(value: &Value, pointer: &str) -> Result<String, GithubError> {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| GithubError::Decode(format!("missing field {pointer}")))
}
