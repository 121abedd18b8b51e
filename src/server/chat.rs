use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::content::parse_generated_payload;
use crate::error::AppError;
use crate::github::CommitRequest;
use crate::server::app::AppState;
use crate::server::request::{sanitize_prompt, PromptError};

#[derive(Debug, Deserialize)]
pub struct ChatBody {
    #[serde(default)]
    pub prompt: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub ok: bool,
    pub branch: String,
    #[serde(rename = "commitSha")]
    pub commit_sha: String,
    #[serde(rename = "commitUrl")]
    pub commit_url: String,
    pub files: Vec<String>,
}

/// The update flow: prompt validated → model called → payload parsed →
/// committed → responded. The parser runs to completion before the first Git
/// call, so a contract violation can never leave repository side effects.
pub async fn handle_chat(
    State(state): State<AppState>,
    body: Result<Json<ChatBody>, JsonRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    let Json(body) = body.map_err(|_| PromptError::InvalidBody)?;
    let prompt = sanitize_prompt(
        body.prompt.as_deref().unwrap_or(""),
        state.config.server.max_prompt_chars,
    )?;

    let raw = state.chat_client.complete(&prompt).await?;
    let generated = parse_generated_payload(&raw)?;

    let content_path = state.config.github.content_path.clone();
    let message = generated
        .commit_message
        .unwrap_or_else(default_commit_message);

    let request = CommitRequest {
        files: vec![(content_path.clone(), generated.content_json)],
        message,
    };
    let result = state.orchestrator.commit(&request).await?;

    tracing::info!(sha = %result.commit_sha, file = %content_path, "content update committed");

    Ok(Json(ChatResponse {
        ok: true,
        branch: state.orchestrator.branch().to_string(),
        commit_sha: result.commit_sha,
        commit_url: result.commit_url,
        files: vec![content_path],
    }))
}

fn default_commit_message() -> String {
    format!(
        "chore: AI content update {}",
        Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
    )
}
