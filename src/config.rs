//! Configuration for toolbuilder.
//!
//! Supports both environment variables and YAML config file.
//! Environment variables take precedence over config file values.
//! Solver parameters are fixed and never read from either source.

use crate::error::{Result, ToolbuilderError};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// LLM configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL for the LLM API (e.g., "https://api.openai.com")
    pub api_base: String,

    /// API key for authentication
    pub api_key: String,

    /// Model name (e.g., "gpt-3.5-turbo")
    pub model: String,

    /// Maximum tokens for response (optional)
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Temperature for generation (optional)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_base() -> String {
    "https://api.openai.com".to_string()
}

fn default_max_tokens() -> u32 {
    2048
}

fn default_temperature() -> f32 {
    0.7
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_template_path() -> PathBuf {
    PathBuf::from("templates/file_retrieval.ppt")
}

/// Parse `NEURAL_API_TIMEOUT_SECS`. Must be a positive whole number of seconds.
fn parse_timeout_secs(value: &str) -> Result<u64> {
    match value.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(ToolbuilderError::Config(format!(
            "NEURAL_API_TIMEOUT_SECS must be a positive number of seconds, got '{}'",
            value
        ))),
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            api_key: String::new(),
            model: "gpt-3.5-turbo".to_string(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Fixed tree-of-thoughts parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Thoughts generated per frontier state and step.
    pub num_thoughts: usize,
    /// Expansion rounds before the final answer is produced.
    pub max_steps: usize,
    /// Frontier size kept after each round.
    pub max_states: usize,
    /// Candidate states scoring below this are discarded.
    pub pruning_threshold: f32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            num_thoughts: 1,
            max_steps: 3,
            max_states: 4,
            pruning_threshold: 0.5,
        }
    }
}

/// Full application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// LLM settings
    pub llm: LlmConfig,

    /// Path to the file-retrieval prompt template
    pub template_path: PathBuf,

    /// Tree-of-thoughts parameters
    #[serde(skip)]
    pub solver: SolverConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm: LlmConfig::default(),
            template_path: default_template_path(),
            solver: SolverConfig::default(),
        }
    }
}

/// Configuration file structure (YAML format).
#[derive(Debug, Deserialize)]
struct ConfigFile {
    llm: Option<LlmFileSection>,
    template_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct LlmFileSection {
    api_base: Option<String>,
    api_key: Option<String>,
    model: Option<String>,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
    timeout_secs: Option<u64>,
}

impl Config {
    /// Load configuration from environment variables and optional config file.
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (NEURAL_API_KEY, NEURAL_API_BASE, NEURAL_API_MODEL, ...)
    /// 2. Config file (~/.config/toolbuilder/config.yaml)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        let mut config = Config::default();

        if let Some(config_path) = Self::config_file_path() {
            if config_path.exists() {
                config = Self::load_from_file(&config_path)?;
            }
        }

        if let Ok(api_key) = env::var("NEURAL_API_KEY") {
            config.llm.api_key = api_key;
        }

        if let Ok(api_base) = env::var("NEURAL_API_BASE") {
            config.llm.api_base = api_base;
        }

        if let Ok(model) = env::var("NEURAL_API_MODEL") {
            config.llm.model = model;
        }

        if let Ok(timeout) = env::var("NEURAL_API_TIMEOUT_SECS") {
            config.llm.timeout_secs = parse_timeout_secs(&timeout)?;
        }

        if let Ok(template) = env::var("TOOLBUILDER_TEMPLATE") {
            config.template_path = PathBuf::from(template);
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from_file(path: &PathBuf) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ToolbuilderError::io(path, e))?;
        Self::from_yaml(&content)
    }

    /// Parse a YAML config document, filling gaps with defaults.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let file_config: ConfigFile = serde_yaml::from_str(content).map_err(|e| {
            ToolbuilderError::Config(format!("Failed to parse config file: {}", e))
        })?;

        let mut config = Config::default();

        if let Some(llm) = file_config.llm {
            if let Some(api_base) = llm.api_base {
                config.llm.api_base = api_base;
            }
            if let Some(api_key) = llm.api_key {
                config.llm.api_key = api_key;
            }
            if let Some(model) = llm.model {
                config.llm.model = model;
            }
            if let Some(max_tokens) = llm.max_tokens {
                config.llm.max_tokens = max_tokens;
            }
            if let Some(temperature) = llm.temperature {
                config.llm.temperature = temperature;
            }
            if let Some(timeout_secs) = llm.timeout_secs {
                config.llm.timeout_secs = timeout_secs;
            }
        }

        if let Some(template_path) = file_config.template_path {
            config.template_path = template_path;
        }

        Ok(config)
    }

    /// Get the default config file path.
    pub fn config_file_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "toolbuilder")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Validate that required configuration is present.
    pub fn validate(&self) -> Result<()> {
        if self.llm.api_key.is_empty() {
            return Err(ToolbuilderError::Config(
                "API key is required. Set NEURAL_API_KEY environment variable or add to config file.".to_string(),
            ));
        }

        if self.llm.api_base.is_empty() {
            return Err(ToolbuilderError::Config(
                "API base URL is required. Set NEURAL_API_BASE environment variable or add to config file.".to_string(),
            ));
        }

        if self.llm.model.is_empty() {
            return Err(ToolbuilderError::Config(
                "Model is required. Set NEURAL_API_MODEL environment variable or add to config file."
                    .to_string(),
            ));
        }

        Ok(())
    }
}
