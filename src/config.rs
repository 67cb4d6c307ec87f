//! Configuration management for nutrisage
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from a YAML file, environment variables, and CLI overrides.
//!
//! Credentials (bot token, model API key, Nutritionix id/key) are required
//! and validated at startup; a missing value fails fast instead of deferring
//! the error to the first external call.

use crate::error::{NutrisageError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for nutrisage
///
/// This structure holds all configuration needed for the service,
/// including provider settings, agent behavior, external endpoints,
/// and storage locations.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Language-model provider configuration
    #[serde(default)]
    pub provider: ProviderConfig,
    /// Agent behavior configuration
    #[serde(default)]
    pub agent: AgentConfig,
    /// Telegram bot configuration
    #[serde(default)]
    pub telegram: TelegramConfig,
    /// Nutritionix API configuration
    #[serde(default)]
    pub nutritionix: NutritionixConfig,
    /// Meal-log storage configuration
    #[serde(default)]
    pub storage: StorageConfig,
    /// Webhook server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Per-user session store configuration
    #[serde(default)]
    pub sessions: SessionConfig,
}

/// Provider configuration
///
/// Specifies which language-model provider to use and its settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Type of provider to use
    #[serde(rename = "type", default = "default_provider_type")]
    pub provider_type: String,

    /// OpenAI-compatible provider configuration
    #[serde(default)]
    pub openai: OpenAiConfig,
}

fn default_provider_type() -> String {
    "openai".to_string()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider_type: default_provider_type(),
            openai: OpenAiConfig::default(),
        }
    }
}

/// OpenAI-compatible provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    /// API base URL (override to point at a compatible gateway or a test mock)
    #[serde(default = "default_openai_api_base")]
    pub api_base: String,

    /// Model to use for completions
    #[serde(default = "default_openai_model")]
    pub model: String,

    /// API key; usually supplied via NUTRISAGE_OPENAI_API_KEY
    #[serde(default)]
    pub api_key: String,

    /// Sampling temperature for agent completions
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_openai_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_openai_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_temperature() -> f32 {
    0.1
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_base: default_openai_api_base(),
            model: default_openai_model(),
            api_key: String::new(),
            temperature: default_temperature(),
        }
    }
}

/// Agent behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Maximum number of reasoning turns before stopping
    #[serde(default = "default_max_turns")]
    pub max_turns: usize,

    /// Timeout for one agent run (seconds)
    #[serde(default = "default_agent_timeout")]
    pub timeout_seconds: u64,

    /// Conversation management settings
    #[serde(default)]
    pub conversation: ConversationConfig,

    /// Tool execution settings
    #[serde(default)]
    pub tools: ToolsConfig,
}

fn default_max_turns() -> usize {
    5
}

fn default_agent_timeout() -> u64 {
    60
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_turns: default_max_turns(),
            timeout_seconds: default_agent_timeout(),
            conversation: ConversationConfig::default(),
            tools: ToolsConfig::default(),
        }
    }
}

/// Conversation management configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationConfig {
    /// Maximum estimated tokens allowed in conversation context
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,

    /// Minimum number of turns to retain when pruning
    #[serde(default = "default_min_retain")]
    pub min_retain_turns: usize,

    /// Token threshold to trigger pruning (fraction of max_tokens)
    #[serde(default = "default_prune_threshold")]
    pub prune_threshold: f32,
}

fn default_max_tokens() -> usize {
    16_000
}

fn default_min_retain() -> usize {
    4
}

fn default_prune_threshold() -> f32 {
    0.8
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            max_tokens: default_max_tokens(),
            min_retain_turns: default_min_retain(),
            prune_threshold: default_prune_threshold(),
        }
    }
}

/// Tool execution configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Maximum size of a tool output fed back to the model (bytes)
    #[serde(default = "default_max_output")]
    pub max_output_size: usize,
}

fn default_max_output() -> usize {
    16_384
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            max_output_size: default_max_output(),
        }
    }
}

/// Telegram bot configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Telegram API base URL (override for tests)
    #[serde(default = "default_telegram_api_base")]
    pub api_base: String,

    /// Bot token; usually supplied via NUTRISAGE_TELEGRAM_TOKEN
    #[serde(default)]
    pub bot_token: String,

    /// Public callback URL registered with Telegram on startup
    #[serde(default)]
    pub webhook_url: Option<String>,
}

fn default_telegram_api_base() -> String {
    "https://api.telegram.org".to_string()
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_base: default_telegram_api_base(),
            bot_token: String::new(),
            webhook_url: None,
        }
    }
}

/// Nutritionix API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NutritionixConfig {
    /// Nutritionix API base URL (override for tests)
    #[serde(default = "default_nutritionix_api_base")]
    pub api_base: String,

    /// Application id; usually supplied via NUTRISAGE_NUTRITIONIX_APP_ID
    #[serde(default)]
    pub app_id: String,

    /// API key; usually supplied via NUTRISAGE_NUTRITIONIX_API_KEY
    #[serde(default)]
    pub api_key: String,
}

fn default_nutritionix_api_base() -> String {
    "https://trackapi.nutritionix.com".to_string()
}

impl Default for NutritionixConfig {
    fn default() -> Self {
        Self {
            api_base: default_nutritionix_api_base(),
            app_id: String::new(),
            api_key: String::new(),
        }
    }
}

/// Meal-log storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path of the meal-log JSON document
    #[serde(default = "default_meal_log_path")]
    pub meal_log_path: String,
}

fn default_meal_log_path() -> String {
    "meal_data.json".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            meal_log_path: default_meal_log_path(),
        }
    }
}

/// Webhook server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind host
    #[serde(default = "default_server_host")]
    pub host: String,

    /// Bind port
    #[serde(default = "default_server_port")]
    pub port: u16,
}

fn default_server_host() -> String {
    "0.0.0.0".to_string()
}

fn default_server_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
        }
    }
}

/// Per-user session store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Maximum number of concurrently retained sessions
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,

    /// Idle time after which a session is evicted (seconds)
    #[serde(default = "default_session_idle_ttl")]
    pub idle_ttl_seconds: u64,
}

fn default_max_sessions() -> usize {
    1024
}

fn default_session_idle_ttl() -> u64 {
    86_400
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_sessions: default_max_sessions(),
            idle_ttl_seconds: default_session_idle_ttl(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Returns
    ///
    /// Returns the loaded and merged configuration
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| NutrisageError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| NutrisageError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        // Provider overrides
        if let Ok(api_key) = std::env::var("NUTRISAGE_OPENAI_API_KEY") {
            self.provider.openai.api_key = api_key;
        }
        if let Ok(api_base) = std::env::var("NUTRISAGE_OPENAI_API_BASE") {
            self.provider.openai.api_base = api_base;
        }
        if let Ok(model) = std::env::var("NUTRISAGE_OPENAI_MODEL") {
            self.provider.openai.model = model;
        }

        // Telegram overrides
        if let Ok(token) = std::env::var("NUTRISAGE_TELEGRAM_TOKEN") {
            self.telegram.bot_token = token;
        }
        if let Ok(api_base) = std::env::var("NUTRISAGE_TELEGRAM_API_BASE") {
            self.telegram.api_base = api_base;
        }
        if let Ok(url) = std::env::var("NUTRISAGE_WEBHOOK_URL") {
            self.telegram.webhook_url = Some(url);
        }

        // Nutritionix overrides
        if let Ok(app_id) = std::env::var("NUTRISAGE_NUTRITIONIX_APP_ID") {
            self.nutritionix.app_id = app_id;
        }
        if let Ok(api_key) = std::env::var("NUTRISAGE_NUTRITIONIX_API_KEY") {
            self.nutritionix.api_key = api_key;
        }
        if let Ok(api_base) = std::env::var("NUTRISAGE_NUTRITIONIX_API_BASE") {
            self.nutritionix.api_base = api_base;
        }

        // Storage overrides
        if let Ok(path) = std::env::var("NUTRISAGE_MEAL_LOG_PATH") {
            self.storage.meal_log_path = path;
        }

        // Agent overrides
        if let Ok(max_turns) = std::env::var("NUTRISAGE_MAX_TURNS") {
            if let Ok(value) = max_turns.parse() {
                self.agent.max_turns = value;
            } else {
                tracing::warn!("Invalid NUTRISAGE_MAX_TURNS: {}", max_turns);
            }
        }
        if let Ok(timeout) = std::env::var("NUTRISAGE_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse() {
                self.agent.timeout_seconds = value;
            } else {
                tracing::warn!("Invalid NUTRISAGE_TIMEOUT_SECONDS: {}", timeout);
            }
        }

        // Server overrides
        if let Ok(host) = std::env::var("NUTRISAGE_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("NUTRISAGE_PORT") {
            if let Ok(value) = port.parse() {
                self.server.port = value;
            } else {
                tracing::warn!("Invalid NUTRISAGE_PORT: {}", port);
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(host) = &cli.host {
            self.server.host = host.clone();
        }
        if let Some(port) = cli.port {
            self.server.port = port;
        }
    }

    /// Validate the configuration, failing fast on missing required values
    ///
    /// # Errors
    ///
    /// Returns `NutrisageError::Config` naming the first invalid field
    pub fn validate(&self) -> Result<()> {
        if self.provider.provider_type != "openai" {
            return Err(NutrisageError::Config(format!(
                "Unknown provider type: {}",
                self.provider.provider_type
            ))
            .into());
        }
        if self.provider.openai.api_key.is_empty() {
            return Err(NutrisageError::Config(
                "provider.openai.api_key is required (set NUTRISAGE_OPENAI_API_KEY)".to_string(),
            )
            .into());
        }
        if self.telegram.bot_token.is_empty() {
            return Err(NutrisageError::Config(
                "telegram.bot_token is required (set NUTRISAGE_TELEGRAM_TOKEN)".to_string(),
            )
            .into());
        }
        if self.nutritionix.app_id.is_empty() || self.nutritionix.api_key.is_empty() {
            return Err(NutrisageError::Config(
                "nutritionix credentials are required (set NUTRISAGE_NUTRITIONIX_APP_ID and NUTRISAGE_NUTRITIONIX_API_KEY)"
                    .to_string(),
            )
            .into());
        }
        if let Some(webhook_url) = &self.telegram.webhook_url {
            url::Url::parse(webhook_url).map_err(|e| {
                NutrisageError::Config(format!("Invalid telegram.webhook_url: {}", e))
            })?;
        }
        if self.agent.max_turns == 0 {
            return Err(
                NutrisageError::Config("agent.max_turns must be greater than 0".to_string()).into(),
            );
        }
        if self.sessions.max_sessions == 0 {
            return Err(NutrisageError::Config(
                "sessions.max_sessions must be greater than 0".to_string(),
            )
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        let mut config = Config::default();
        config.provider.openai.api_key = "sk-test".to_string();
        config.telegram.bot_token = "123:abc".to_string();
        config.nutritionix.app_id = "app".to_string();
        config.nutritionix.api_key = "key".to_string();
        config
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.provider.provider_type, "openai");
        assert_eq!(config.provider.openai.model, "gpt-3.5-turbo");
        assert_eq!(config.agent.max_turns, 5);
        assert_eq!(config.storage.meal_log_path, "meal_data.json");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.nutritionix.api_base, "https://trackapi.nutritionix.com");
    }

    #[test]
    fn test_validate_accepts_complete_config() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_api_key() {
        let mut config = valid_config();
        config.provider.openai.api_key = String::new();
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("api_key"));
    }

    #[test]
    fn test_validate_rejects_missing_bot_token() {
        let mut config = valid_config();
        config.telegram.bot_token = String::new();
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("bot_token"));
    }

    #[test]
    fn test_validate_rejects_missing_nutritionix_credentials() {
        let mut config = valid_config();
        config.nutritionix.app_id = String::new();
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("nutritionix"));
    }

    #[test]
    fn test_validate_rejects_unknown_provider() {
        let mut config = valid_config();
        config.provider.provider_type = "parrot".to_string();
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("Unknown provider type"));
    }

    #[test]
    fn test_validate_rejects_bad_webhook_url() {
        let mut config = valid_config();
        config.telegram.webhook_url = Some("not a url".to_string());
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("webhook_url"));
    }

    #[test]
    fn test_validate_rejects_zero_max_turns() {
        let mut config = valid_config();
        config.agent.max_turns = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_parses_yaml() {
        let yaml = r#"
provider:
  type: openai
  openai:
    model: gpt-4o-mini
    temperature: 0.3
telegram:
  webhook_url: https://example.ngrok.io/webhook
agent:
  max_turns: 3
storage:
  meal_log_path: /tmp/meals.json
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.provider.openai.model, "gpt-4o-mini");
        assert_eq!(
            config.telegram.webhook_url.as_deref(),
            Some("https://example.ngrok.io/webhook")
        );
        assert_eq!(config.agent.max_turns, 3);
        assert_eq!(config.storage.meal_log_path, "/tmp/meals.json");
        // Unspecified sections fall back to defaults
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.sessions.max_sessions, 1024);
    }

    #[test]
    #[serial_test::serial]
    fn test_env_overrides() {
        std::env::set_var("NUTRISAGE_OPENAI_MODEL", "gpt-4o");
        std::env::set_var("NUTRISAGE_MEAL_LOG_PATH", "/tmp/override.json");
        std::env::set_var("NUTRISAGE_MAX_TURNS", "7");

        let cli = crate::cli::Cli::default();
        let config = Config::load("does-not-exist.yaml", &cli).unwrap();

        std::env::remove_var("NUTRISAGE_OPENAI_MODEL");
        std::env::remove_var("NUTRISAGE_MEAL_LOG_PATH");
        std::env::remove_var("NUTRISAGE_MAX_TURNS");

        assert_eq!(config.provider.openai.model, "gpt-4o");
        assert_eq!(config.storage.meal_log_path, "/tmp/override.json");
        assert_eq!(config.agent.max_turns, 7);
    }

    #[test]
    #[serial_test::serial]
    fn test_cli_overrides_win_over_defaults() {
        let cli = crate::cli::Cli {
            host: Some("127.0.0.1".to_string()),
            port: Some(9999),
            ..Default::default()
        };
        let config = Config::load("does-not-exist.yaml", &cli).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9999);
    }
}
