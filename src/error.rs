use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::config::ConfigError;
use crate::content::ContentError;
use crate::github::GithubError;
use crate::llm::LlmError;
use crate::server::request::PromptError;

/// Top-level application error wrapping every module error. Each variant
/// carries its own HTTP mapping; module errors convert via `From`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Input(#[from] PromptError),

    #[error("{0}")]
    Llm(#[from] LlmError),

    #[error("{0}")]
    Content(#[from] ContentError),

    #[error("{0}")]
    Github(#[from] GithubError),

    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("Setup authorization failed.")]
    SetupAuth,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Input(_) => StatusCode::BAD_REQUEST,
            AppError::Llm(LlmError::Timeout) => StatusCode::GATEWAY_TIMEOUT,
            AppError::Llm(_) => StatusCode::BAD_GATEWAY,
            AppError::Content(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Github(GithubError::Conflict) => StatusCode::CONFLICT,
            AppError::Github(GithubError::Auth) => StatusCode::UNAUTHORIZED,
            AppError::Github(GithubError::RateLimit) => StatusCode::TOO_MANY_REQUESTS,
            AppError::Github(GithubError::Timeout) => StatusCode::GATEWAY_TIMEOUT,
            AppError::Github(_) => StatusCode::BAD_GATEWAY,
            AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::SetupAuth => StatusCode::UNAUTHORIZED,
        }
    }
}

/// Every internal failure is converted here into a single-shot JSON error
/// response; no partial success is ever reported.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();
        tracing::warn!(status = status.as_u16(), error = %message, "request failed");
        (status, Json(json!({ "error": message }))).into_response()
    }
}

pub type AppResult<T> = std::result::Result<T, AppError>;
