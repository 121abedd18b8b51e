pub mod app;
pub mod chat;
pub mod request;
pub mod setup;

pub use app::{build_router, serve, AppState, SERVICE_NAME};
pub use request::{sanitize_prompt, PromptError};
