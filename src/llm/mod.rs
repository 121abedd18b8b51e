pub mod client;
pub mod openai;

pub use client::{ChatClient, LlmError};
pub use openai::{OpenAiClient, SYSTEM_PROMPT};
