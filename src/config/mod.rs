pub mod settings;

pub use settings::{Config, ConfigError, GithubConfig, LlmConfig, ServerConfig, SetupConfig};
