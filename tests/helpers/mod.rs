#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use reqwest::Method;
use serde_json::{json, Value};

use foliod::config::Config;
use foliod::github::{CommitOrchestrator, GitTransport, GithubError};
use foliod::llm::{ChatClient, LlmError};
use foliod::server::AppState;

pub const TEST_SETUP_KEY: &str = "test-setup-key";

/// One-shot scripted model client.
pub struct MockChatClient {
    response: Mutex<Option<Result<String, LlmError>>>,
}

impl MockChatClient {
    pub fn replying(text: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            response: Mutex::new(Some(Ok(text.into()))),
        })
    }

    pub fn failing(error: LlmError) -> Arc<Self> {
        Arc::new(Self {
            response: Mutex::new(Some(Err(error))),
        })
    }

    /// For routes that must never reach the model.
    pub fn unreachable() -> Arc<Self> {
        Arc::new(Self {
            response: Mutex::new(None),
        })
    }
}

#[async_trait]
impl ChatClient for MockChatClient {
    async fn complete(&self, _user_prompt: &str) -> Result<String, LlmError> {
        self.response
            .lock()
            .unwrap()
            .take()
            .expect("unexpected model call")
    }
}

/// Scripted Git transport that records every call in order.
pub struct RecordingTransport {
    calls: Mutex<Vec<(Method, String, Option<Value>)>>,
    responses: Mutex<Vec<Result<Option<Value>, GithubError>>>,
}

impl RecordingTransport {
    pub fn scripted(responses: Vec<Result<Option<Value>, GithubError>>) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            responses: Mutex::new(responses),
        })
    }

    /// For flows that must never touch Git.
    pub fn unreachable() -> Arc<Self> {
        Self::scripted(Vec::new())
    }

    pub fn calls(&self) -> Vec<(Method, String, Option<Value>)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl GitTransport for RecordingTransport {
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        _allow_missing: bool,
    ) -> Result<Option<Value>, GithubError> {
        self.calls
            .lock()
            .unwrap()
            .push((method, path.to_string(), body));
        let mut responses = self.responses.lock().unwrap();
        assert!(!responses.is_empty(), "unexpected Git call to {path}");
        responses.remove(0)
    }
}

/// The six responses of a successful one-file commit sequence.
pub fn commit_happy_path() -> Vec<Result<Option<Value>, GithubError>> {
    vec![
        Ok(Some(json!({ "object": { "sha": "head-sha" } }))),
        Ok(Some(json!({ "tree": { "sha": "base-tree-sha" } }))),
        Ok(Some(json!({ "sha": "blob-sha" }))),
        Ok(Some(json!({ "sha": "tree-sha" }))),
        Ok(Some(json!({ "sha": "commit-sha", "html_url": "https://example.com/commit" }))),
        Ok(Some(json!({ "ref": "refs/heads/main" }))),
    ]
}

pub fn test_state(chat: Arc<MockChatClient>, transport: Arc<RecordingTransport>) -> AppState {
    let mut config = Config::default();
    config.github.owner = "owner".to_string();
    config.github.repo = "repo".to_string();
    config.setup.key_env = "FOLIOD_TEST_UNSET_SETUP_KEY".to_string();
    config.setup.key = Some(TEST_SETUP_KEY.to_string());

    let orchestrator = CommitOrchestrator::new(
        transport as Arc<dyn GitTransport>,
        config.github.owner.clone(),
        config.github.repo.clone(),
        config.github.branch.clone(),
    );

    AppState {
        config: Arc::new(config),
        chat_client: chat,
        orchestrator: Arc::new(orchestrator),
    }
}

pub fn test_router(chat: Arc<MockChatClient>, transport: Arc<RecordingTransport>) -> Router {
    foliod::server::build_router(test_state(chat, transport))
}

/// A document that passes the full schema.
pub fn valid_document() -> Value {
    json!({
        "personal_brand": {
            "hero_statement": "I build things",
            "about_me": "An engineer",
            "core_values": ["Efficiency", "Transparency"],
            "work_philosophy": "Keep it simple"
        },
        "services": [
            {
                "service_name": "Automation",
                "description": "Automates workflows",
                "client_value_add": "Saves time"
            }
        ],
        "portfolio_demos": [
            {
                "project_title": "Demo",
                "problem_solved": "A problem",
                "demo_url": "https://example.com/demo",
                "repo_url": "https://example.com/repo"
            }
        ],
        "social_proof": {
            "google_reviews": [
                { "quote": "Great work", "stars": 5 }
            ]
        },
        "connect_links": {
            "linkedin": "https://linkedin.com/in/x",
            "github": "https://github.com/x",
            "facebook": "https://facebook.com/x",
            "instagram": "https://instagram.com/x",
            "scheduling_url": "https://calendly.com/x"
        }
    })
}
