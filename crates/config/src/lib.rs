//! Configuration management for autopilot
//!
//! Loads and saves the JSON config file, the AI settings file, and resolves
//! the workspace and service credentials the agent needs.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

pub mod ai_settings;
pub mod paths;

pub use ai_settings::AiSettings;
pub use paths::{ai_settings_path, config_path, data_dir, workspace_path};

/// Placeholder shipped in example configs; treated as "no key".
pub const GOOGLE_API_KEY_PLACEHOLDER: &str = "your-google-api-key";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config not found: {0}")]
    NotFound(PathBuf),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Model provider credentials
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProviderConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
}

/// All model providers
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub openrouter: ProviderConfig,
    #[serde(default)]
    pub openai: ProviderConfig,
    #[serde(default)]
    pub anthropic: ProviderConfig,
    #[serde(default)]
    pub vllm: ProviderConfig,
}

/// Agent loop defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentDefaults {
    #[serde(default = "default_workspace")]
    pub workspace: String,
    #[serde(default = "default_fast_model")]
    pub fast_model: String,
    #[serde(default = "default_smart_model")]
    pub smart_model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_cycles")]
    pub max_cycles: u32,
    #[serde(default = "default_history_window")]
    pub history_window: usize,
    /// Exposes `execute_shell` to the model when set
    #[serde(default)]
    pub execute_local_commands: bool,
    #[serde(default)]
    pub ai_settings_file: Option<String>,
}

impl Default for AgentDefaults {
    fn default() -> Self {
        Self {
            workspace: default_workspace(),
            fast_model: default_fast_model(),
            smart_model: default_smart_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            max_cycles: default_max_cycles(),
            history_window: default_history_window(),
            execute_local_commands: false,
            ai_settings_file: None,
        }
    }
}

fn default_workspace() -> String {
    "~/.autopilot/workspace".to_string()
}

fn default_fast_model() -> String {
    "openai/gpt-3.5-turbo".to_string()
}

fn default_smart_model() -> String {
    "openai/gpt-4".to_string()
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_temperature() -> f32 {
    0.0
}

fn default_max_cycles() -> u32 {
    50
}

fn default_history_window() -> usize {
    20
}

/// Agent configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AgentConfig {
    #[serde(default)]
    pub defaults: AgentDefaults,
}

/// Google Custom Search credentials
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GoogleConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub custom_search_engine_id: String,
}

/// Search result limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_max_results")]
    pub max_results: u32,
}

fn default_max_results() -> u32 {
    8
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
        }
    }
}

/// Image generation (OpenAI images API)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_image_size")]
    pub size: String,
}

fn default_image_size() -> String {
    "256x256".to_string()
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            size: default_image_size(),
        }
    }
}

/// Hugging Face inference API (audio transcription)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HuggingFaceConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_audio_model")]
    pub audio_model: String,
}

fn default_audio_model() -> String {
    "facebook/wav2vec2-base-960h".to_string()
}

impl Default for HuggingFaceConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            audio_model: default_audio_model(),
        }
    }
}

/// Twitter API v2 credentials (OAuth 2.0 user access token)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TwitterConfig {
    #[serde(default)]
    pub access_token: String,
}

/// External service configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ServicesConfig {
    #[serde(default)]
    pub google: GoogleConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub image: ImageConfig,
    #[serde(default)]
    pub huggingface: HuggingFaceConfig,
    #[serde(default)]
    pub twitter: TwitterConfig,
}

/// Root configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub services: ServicesConfig,
}

impl Config {
    /// Load from the default location
    pub async fn load() -> Result<Self> {
        let path = config_path();
        Self::load_from(&path).await
    }

    /// Load from specific location
    pub async fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("◆ No config at {:?}, using defaults", path);
            return Ok(Config::default());
        }

        debug!("◆ Loading config from {:?}", path);
        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save to the default location
    pub async fn save(&self) -> Result<()> {
        let path = config_path();
        self.save_to(&path).await
    }

    /// Save to specific location
    pub async fn save_to(&self, path: &Path) -> Result<()> {
        debug!("◆ Saving config to {:?}", path);

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }

    /// Workspace root with `~` expanded
    pub fn workspace_path(&self) -> PathBuf {
        paths::expand_home(&self.agent.defaults.workspace)
    }

    /// AI settings file, falling back to the default location
    pub fn ai_settings_path(&self) -> PathBuf {
        match &self.agent.defaults.ai_settings_file {
            Some(path) if !path.is_empty() => paths::expand_home(path),
            _ => ai_settings_path(),
        }
    }

    /// First configured provider key
    pub fn api_key(&self) -> Option<String> {
        [
            &self.providers.openrouter,
            &self.providers.anthropic,
            &self.providers.openai,
            &self.providers.vllm,
        ]
        .into_iter()
        .map(|p| p.api_key.clone())
        .find(|k| !k.is_empty())
    }

    /// API base for the provider whose key is in use
    pub fn api_base(&self) -> Option<String> {
        if !self.providers.openrouter.api_key.is_empty() {
            return self
                .providers
                .openrouter
                .api_base
                .clone()
                .or_else(|| Some("https://openrouter.ai/api/v1".to_string()));
        }

        if !self.providers.openai.api_key.is_empty() {
            return self.providers.openai.api_base.clone();
        }

        if let Some(ref api_base) = self.providers.vllm.api_base {
            if !api_base.is_empty() {
                return Some(api_base.clone());
            }
        }

        None
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key().is_some()
    }

    pub fn fast_model(&self) -> String {
        self.agent.defaults.fast_model.clone()
    }

    pub fn smart_model(&self) -> String {
        self.agent.defaults.smart_model.clone()
    }

    pub fn execute_local_commands(&self) -> bool {
        self.agent.defaults.execute_local_commands
    }

    /// Google key usable for the official search API.
    ///
    /// Present, non-blank, and not the shipped placeholder.
    pub fn google_api_key(&self) -> Option<String> {
        let key = &self.services.google.api_key;
        if key.trim().is_empty() || key == GOOGLE_API_KEY_PLACEHOLDER {
            None
        } else {
            Some(key.clone())
        }
    }

    pub fn search_max_results(&self) -> u32 {
        self.services.search.max_results
    }
}

/// Create config file, workspace and AI settings if missing
pub async fn init() -> Result<Config> {
    let config_path = config_path();

    if config_path.exists() {
        warn!("◆ Config already exists at {:?}", config_path);
    } else {
        Config::default().save().await?;
        info!("◆ Config created at {:?}", config_path);
    }

    let config = Config::load().await?;

    let workspace = config.workspace_path();
    tokio::fs::create_dir_all(&workspace).await?;
    info!("◆ Workspace ready at {:?}", workspace);

    let settings_path = config.ai_settings_path();
    if !settings_path.exists() {
        AiSettings::default().save_to(&settings_path).await?;
        info!("◆ AI settings created at {:?}", settings_path);
    }

    Ok(config)
}
