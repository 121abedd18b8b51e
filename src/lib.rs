pub mod config;
pub mod content;
pub mod error;
pub mod github;
pub mod llm;
pub mod server;

// Re-export commonly used types for convenience
pub use config::{Config, ConfigError};
pub use error::{AppError, AppResult};
pub use server::{build_router, AppState};
