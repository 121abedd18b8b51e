pub mod parser;
pub mod sanitizer;
pub mod schema;

use thiserror::Error;

pub use parser::{parse_generated_payload, GeneratedPayload};
pub use sanitizer::{normalize_content, reject_forbidden_keys, whitelist_document};
pub use schema::{looks_like_content_document, validate_document};

/// Errors produced while narrowing a raw model response down to a canonical
/// content document. Every variant maps to a 422 at the route boundary.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("LLM output must be strict JSON")]
    EmptyOutput,

    #[error("LLM output must be strict JSON without conversational text")]
    LooseEnvelope,

    #[error("Invalid LLM JSON output")]
    InvalidJson,

    #[error("LLM output must not contain html/css/js fields")]
    MarkupFields,

    #[error("LLM response missing contentJson field")]
    MissingContent,

    #[error("contentJson must be a valid JSON object")]
    NotAnObject,

    #[error("Pricing or style/tier data is not allowed in this schema (key '{0}')")]
    ForbiddenKey(String),

    #[error("Missing required key: {0}")]
    MissingKey(String),

    #[error("{path} must be {expected}")]
    Shape { path: String, expected: &'static str },
}

impl ContentError {
    pub(crate) fn shape(path: impl Into<String>, expected: &'static str) -> Self {
        ContentError::Shape {
            path: path.into(),
            expected,
        }
    }
}
