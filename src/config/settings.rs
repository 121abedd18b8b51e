use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid config value: {0}")]
    InvalidValue(String),

    /// Names the environment variable, never the value.
    #[error("Missing required secret: {0}")]
    MissingSecret(String),
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub github: GithubConfig,
    pub setup: SetupConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub cors_origin: String,
    pub max_prompt_chars: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct LlmConfig {
    pub api_url: String,
    pub model: String,
    pub api_key_env: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct GithubConfig {
    pub api_url: String,
    pub owner: String,
    pub repo: String,
    pub branch: String,
    pub content_path: String,
    pub setup_marker_path: String,
    pub token_env: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct SetupConfig {
    pub key_env: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind_addr: "0.0.0.0:8787".to_string(),
            cors_origin: "*".to_string(),
            max_prompt_chars: 4000,
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        LlmConfig {
            api_url: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4.1-mini".to_string(),
            api_key_env: "LLM_API_KEY".to_string(),
            api_key: None,
        }
    }
}

impl Default for GithubConfig {
    fn default() -> Self {
        GithubConfig {
            api_url: "https://api.github.com".to_string(),
            owner: "atg25".to_string(),
            repo: "ai-consulting-portfolio".to_string(),
            branch: "main".to_string(),
            content_path: "content.json".to_string(),
            setup_marker_path: ".ai-setup-complete.json".to_string(),
            token_env: "GITHUB_PAT".to_string(),
            token: None,
        }
    }
}

impl Default for SetupConfig {
    fn default() -> Self {
        SetupConfig {
            key_env: "SETUP_KEY".to_string(),
            key: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig::default(),
            llm: LlmConfig::default(),
            github: GithubConfig::default(),
            setup: SetupConfig::default(),
        }
    }
}

impl Config {
    /// Config file path: $FOLIOD_CONFIG, or ./foliod.toml.
    pub fn config_path() -> PathBuf {
        std::env::var("FOLIOD_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("foliod.toml"))
    }

    /// Load configuration, falling back to defaults when no file exists.
    /// Secrets are never read from the file in production; each one names an
    /// environment variable instead.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path();

        let config = if path.exists() {
            let contents = fs::read_to_string(&path)?;
            toml::from_str(&contents)?
        } else {
            Config::default()
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.max_prompt_chars == 0 {
            return Err(ConfigError::InvalidValue(
                "max_prompt_chars must be greater than 0".to_string(),
            ));
        }

        if self.llm.api_url.is_empty() {
            return Err(ConfigError::InvalidValue("llm.api_url must be set".to_string()));
        }

        for (name, value) in [
            ("github.owner", &self.github.owner),
            ("github.repo", &self.github.repo),
            ("github.branch", &self.github.branch),
            ("github.content_path", &self.github.content_path),
            ("github.setup_marker_path", &self.github.setup_marker_path),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::InvalidValue(format!("{name} must be set")));
            }
        }

        Ok(())
    }

    pub fn llm_api_key(&self) -> Result<String, ConfigError> {
        resolve_secret(&self.llm.api_key_env, self.llm.api_key.as_deref())
    }

    pub fn github_token(&self) -> Result<String, ConfigError> {
        resolve_secret(&self.github.token_env, self.github.token.as_deref())
    }

    pub fn setup_key(&self) -> Result<String, ConfigError> {
        resolve_secret(&self.setup.key_env, self.setup.key.as_deref())
    }
}

/// Environment variable first, inline override second (tests only).
fn resolve_secret(env_name: &str, inline: Option<&str>) -> Result<String, ConfigError> {
    if let Ok(value) = std::env::var(env_name) {
        if !value.trim().is_empty() {
            return Ok(value);
        }
    }

    match inline {
        Some(value) if !value.trim().is_empty() => Ok(value.to_string()),
        _ => Err(ConfigError::MissingSecret(env_name.to_string())),
    }
}
