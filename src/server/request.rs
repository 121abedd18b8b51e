use thiserror::Error;

/// Request-body validation failures; all map to 400.
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("Invalid JSON body.")]
    InvalidBody,

    #[error("Missing prompt.")]
    Missing,

    #[error("Prompt too long (max {0}).")]
    TooLong(usize),
}

/// Trim and bound the caller-supplied prompt before it goes anywhere near the
/// model.
pub fn sanitize_prompt(value: &str, max_chars: usize) -> Result<String, PromptError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(PromptError::Missing);
    }
    if trimmed.chars().count() > max_chars {
        return Err(PromptError::TooLong(max_chars));
    }
    Ok(trimmed.to_string())
}
