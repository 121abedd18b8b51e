use axum::extract::State;
use axum::http::{header, HeaderMap};
use axum::Json;
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};

use crate::error::AppError;
use crate::github::CommitRequest;
use crate::server::app::AppState;

const SETUP_COMMIT_MESSAGE: &str = "chore: bootstrap minimal modern portfolio";
const SETUP_MODE: &str = "minimal-modern";

const SEED_INDEX_HTML: &str = include_str!("../../assets/index.html");
const SEED_STYLES_CSS: &str = include_str!("../../assets/styles.css");
const SEED_SCRIPT_JS: &str = include_str!("../../assets/script.js");
const SEED_CONTENT_JSON: &str = include_str!("../../assets/content.json");

/// One-time repository bootstrap. Idempotent: once the marker file exists on
/// the branch the handler reports success without committing anything.
pub async fn handle_setup(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    let expected = state.config.setup_key()?;
    if provided_setup_key(&headers).as_deref() != Some(expected.as_str()) {
        return Err(AppError::SetupAuth);
    }

    let repository = state.orchestrator.repository();
    let branch = state.orchestrator.branch().to_string();
    let marker_path = state.config.github.setup_marker_path.clone();

    if state.orchestrator.path_exists(&marker_path).await? {
        return Ok(Json(json!({
            "ok": true,
            "message": "Setup already completed. No changes applied.",
            "repository": repository,
            "branch": branch,
        })));
    }

    let mut files = seed_files(&state.config.github.content_path);
    files.push((
        marker_path,
        serde_json::to_string_pretty(&json!({
            "setup_complete": true,
            "repository": repository,
            "branch": branch,
            "initialized_at": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            "mode": SETUP_MODE,
        }))
        .unwrap_or_default(),
    ));

    let file_names: Vec<String> = files.iter().map(|(path, _)| path.clone()).collect();
    let result = state
        .orchestrator
        .commit(&CommitRequest {
            files,
            message: SETUP_COMMIT_MESSAGE.to_string(),
        })
        .await?;

    tracing::info!(sha = %result.commit_sha, files = file_names.len(), "repository bootstrapped");

    Ok(Json(json!({
        "ok": true,
        "setup": "completed",
        "repository": repository,
        "branch": branch,
        "commitSha": result.commit_sha,
        "commitUrl": result.commit_url,
        "files": file_names,
    })))
}

/// `x-setup-key` header, or a bearer token as a fallback.
fn provided_setup_key(headers: &HeaderMap) -> Option<String> {
    if let Some(value) = headers.get("x-setup-key").and_then(|v| v.to_str().ok()) {
        return Some(value.to_string());
    }

    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| {
            if v.len() > 7 && v.as_bytes()[..7].eq_ignore_ascii_case(b"bearer ") {
                Some(v[7..].trim().to_string())
            } else {
                None
            }
        })
}

fn seed_files(content_path: &str) -> Vec<(String, String)> {
    vec![
        ("index.html".to_string(), SEED_INDEX_HTML.to_string()),
        ("styles.css".to_string(), SEED_STYLES_CSS.to_string()),
        ("script.js".to_string(), SEED_SCRIPT_JS.to_string()),
        (content_path.to_string(), SEED_CONTENT_JSON.to_string()),
    ]
}
