use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::llm::client::{ChatClient, LlmError};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const TEMPERATURE: f32 = 0.2;

/// Fixed system instruction: strict-JSON-only output, the exact five-key
/// schema, brand voice, and the standing prohibition on pricing/tier/style
/// keys and on html/css/js output.
pub const SYSTEM_PROMPT: &str = "\
You are a Content Data Engineer.
You are not a web designer and must never produce HTML, CSS, or JS.
Return ONLY a strict JSON object for content.json (no markdown, no prose, no wrapper keys).
Brand pillars to preserve in all wording: Efficiency, Transparency, Automation.
If the user asks to update philosophy-related content, keep tone sophisticated, professional, and consistent with Minimal Art Deco Chic voice.
Rules:
- JSON must match this exact top-level structure:
  personal_brand, services, portfolio_demos, social_proof, connect_links
- personal_brand keys: hero_statement, about_me, core_values (array), work_philosophy
- services is an array of objects with: service_name, description, client_value_add
- portfolio_demos is an array with: project_title, problem_solved, demo_url, repo_url
- social_proof has: google_reviews (array of { quote, stars })
- connect_links keys: linkedin, github, facebook, instagram, scheduling_url
- ZERO pricing, tier, or style data is allowed anywhere.
- Do not add any keys outside this schema.
- Do not include html, css, js, or any non-JSON content.";

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    temperature: f32,
    messages: Vec<Message>,
}

#[derive(Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<ErrorDetail>,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: Option<String>,
}

/// Client for an OpenAI-compatible chat-completions endpoint. One outbound
/// call per completion, no internal retries: every failure surfaces once.
pub struct OpenAiClient {
    api_url: String,
    api_key: String,
    model: String,
    http_client: Client,
}

impl OpenAiClient {
    pub fn new(api_url: String, api_key: String, model: String) -> Result<Self, LlmError> {
        let http_client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(LlmError::from_transport)?;

        Ok(Self {
            api_url,
            api_key,
            model,
            http_client,
        })
    }
}

#[async_trait]
impl ChatClient for OpenAiClient {
    async fn complete(&self, user_prompt: &str) -> Result<String, LlmError> {
        let request_body = ChatRequest {
            model: self.model.clone(),
            temperature: TEMPERATURE,
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                Message {
                    role: "user".to_string(),
                    content: user_prompt.to_string(),
                },
            ],
        };

        let response = self
            .http_client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(LlmError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.error)
                .and_then(|detail| detail.message)
                .unwrap_or_else(|| format!("LLM request failed ({})", status.as_u16()));
            return Err(LlmError::Api(message));
        }

        let completion: ChatResponse = response
            .json()
            .await
            .map_err(|_| LlmError::EmptyResponse)?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.is_empty())
            .ok_or(LlmError::EmptyResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_names_schema_and_prohibitions() {
        assert!(SYSTEM_PROMPT.contains("personal_brand"));
        assert!(SYSTEM_PROMPT.contains("connect_links"));
        assert!(SYSTEM_PROMPT.contains("ZERO pricing, tier, or style"));
        assert!(SYSTEM_PROMPT.contains("html, css, js"));
    }

    #[test]
    fn test_empty_completion_deserializes_to_none() {
        let body = r#"{"choices":[{"message":{"role":"assistant"}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(body).unwrap();
        assert!(parsed.choices[0].message.content.is_none());
    }

    #[test]
    fn test_provider_error_body_shape() {
        let body = r#"{"error":{"message":"model overloaded","type":"server_error"}}"#;
        let parsed: ErrorBody = serde_json::from_str(body).unwrap();
        assert_eq!(
            parsed.error.and_then(|e| e.message).as_deref(),
            Some("model overloaded")
        );
    }
}
