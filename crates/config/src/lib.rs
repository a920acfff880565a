//! Configuration loading, validation, and management for Covey.
//!
//! Loads configuration from `~/.covey/config.toml` with environment variable
//! overrides. Validates all settings at startup. The agent roster declared
//! here drives which sub-agents the supervisor can delegate to.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.covey/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key (can be overridden per-provider)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Default LLM provider
    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// Default model for all agents unless overridden per-agent
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Default temperature
    #[serde(default = "default_temperature")]
    pub default_temperature: f32,

    /// Default max tokens per LLM response
    #[serde(default = "default_max_tokens")]
    pub default_max_tokens: u32,

    /// Supervisor step budget: one step per orchestrator turn
    #[serde(default = "default_max_steps")]
    pub max_steps: u32,

    /// Consecutive supervisor turns without a delegation before the run
    /// is forced to terminate
    #[serde(default = "default_max_noop_turns")]
    pub max_noop_turns: u32,

    /// Ordered provider fallback chain. Each name must appear in `providers`
    /// or be the built-in `default_provider`.
    #[serde(default)]
    pub provider_order: Vec<String>,

    /// Provider-specific configurations
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,

    /// The sub-agent roster the supervisor can delegate to.
    /// Empty means "use the built-in roster".
    #[serde(default)]
    pub agents: Vec<AgentEntry>,
}

/// Per-provider settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL of the OpenAI-compatible endpoint
    pub base_url: String,

    /// API key for this provider (falls back to the top-level key)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// One sub-agent roster entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentEntry {
    /// Agent name — becomes the `delegate_to_<name>` tool suffix
    pub name: String,

    /// What this agent specializes in (shown to the supervisor)
    pub description: String,

    /// Model override for this agent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Iteration budget for the agent's internal loop
    #[serde(default = "default_agent_iterations")]
    pub max_iterations: u32,

    /// Whether the driver should inject binary attachments (images) into
    /// this agent's task message
    #[serde(default)]
    pub accepts_binary_attachments: bool,

    /// Tool names this agent gets in its registry
    #[serde(default)]
    pub tools: Vec<String>,
}

fn default_provider() -> String {
    "openrouter".into()
}
fn default_model() -> String {
    "deepseek/deepseek-chat-v3-0324:free".into()
}
fn default_temperature() -> f32 {
    0.3
}
fn default_max_tokens() -> u32 {
    1024
}
fn default_max_steps() -> u32 {
    12
}
fn default_max_noop_turns() -> u32 {
    2
}
fn default_timeout_secs() -> u64 {
    120
}
fn default_agent_iterations() -> u32 {
    6
}

fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "***",
        None => "<unset>",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("default_provider", &self.default_provider)
            .field("default_model", &self.default_model)
            .field("default_temperature", &self.default_temperature)
            .field("max_steps", &self.max_steps)
            .field("agents", &self.agents.len())
            .finish_non_exhaustive()
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &redact(&self.api_key))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// The built-in five-agent roster used when the config declares none.
pub fn default_agents() -> Vec<AgentEntry> {
    vec![
        AgentEntry {
            name: "generic".into(),
            description: "General information lookup, text generation, and \
                          cross-referencing when no specialist fits"
                .into(),
            model: None,
            max_iterations: default_agent_iterations(),
            accepts_binary_attachments: false,
            tools: vec!["web_search".into(), "web_scrape".into()],
        },
        AgentEntry {
            name: "researcher".into(),
            description: "Deep research, fact-checking, and scientific paper \
                          lookup on Arxiv and Wikipedia"
                .into(),
            model: None,
            max_iterations: default_agent_iterations(),
            accepts_binary_attachments: false,
            tools: vec![
                "web_search".into(),
                "wikipedia_search".into(),
                "arxiv_search".into(),
                "web_scrape".into(),
            ],
        },
        AgentEntry {
            name: "audio".into(),
            description: "Audio transcription and YouTube transcript extraction".into(),
            model: None,
            max_iterations: default_agent_iterations(),
            accepts_binary_attachments: false,
            tools: vec!["transcribe_audio".into(), "youtube_transcript".into()],
        },
        AgentEntry {
            name: "visual".into(),
            description: "Image understanding and visual analysis".into(),
            model: None,
            max_iterations: default_agent_iterations(),
            accepts_binary_attachments: true,
            tools: vec!["read_image".into()],
        },
        AgentEntry {
            name: "code".into(),
            description: "Writing, executing, and debugging code; filesystem \
                          interaction"
                .into(),
            model: None,
            max_iterations: default_agent_iterations(),
            accepts_binary_attachments: false,
            tools: vec![
                "file_read".into(),
                "file_write".into(),
                "run_shell_command".into(),
                "run_python_script".into(),
                "web_search".into(),
                "web_scrape".into(),
            ],
        },
    ]
}

impl AppConfig {
    /// Load configuration from the default path (~/.covey/config.toml).
    ///
    /// Also checks environment variables for API keys:
    /// - `COVEY_API_KEY` (highest priority)
    /// - `OPENROUTER_API_KEY`
    /// - `OPENAI_API_KEY`
    /// - `GROQ_API_KEY`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;

        // Environment variable overrides (highest priority)
        if config.api_key.is_none() {
            config.api_key = std::env::var("COVEY_API_KEY")
                .ok()
                .or_else(|| std::env::var("OPENROUTER_API_KEY").ok())
                .or_else(|| std::env::var("OPENAI_API_KEY").ok())
                .or_else(|| std::env::var("GROQ_API_KEY").ok());
        }

        if let Ok(provider) = std::env::var("COVEY_PROVIDER") {
            config.default_provider = provider;
        }

        if let Ok(model) = std::env::var("COVEY_MODEL") {
            config.default_model = model;
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".covey")
    }

    /// The effective agent roster: configured entries, or the built-in five.
    pub fn roster(&self) -> Vec<AgentEntry> {
        if self.agents.is_empty() {
            default_agents()
        } else {
            self.agents.clone()
        }
    }

    /// The effective provider order: configured chain, or just the default.
    pub fn effective_provider_order(&self) -> Vec<String> {
        if self.provider_order.is_empty() {
            vec![self.default_provider.clone()]
        } else {
            self.provider_order.clone()
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_temperature < 0.0 || self.default_temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "default_temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.max_steps == 0 {
            return Err(ConfigError::ValidationError(
                "max_steps must be at least 1".into(),
            ));
        }

        let mut seen = std::collections::HashSet::new();
        for agent in &self.agents {
            if agent.name.is_empty() {
                return Err(ConfigError::ValidationError(
                    "agent name must not be empty".into(),
                ));
            }
            if !seen.insert(agent.name.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate agent name: {}",
                    agent.name
                )));
            }
            if agent.max_iterations == 0 {
                return Err(ConfigError::ValidationError(format!(
                    "agent '{}': max_iterations must be at least 1",
                    agent.name
                )));
            }
        }

        for name in &self.provider_order {
            if !self.providers.contains_key(name) && *name != self.default_provider {
                return Err(ConfigError::ValidationError(format!(
                    "provider_order references unknown provider: {name}"
                )));
            }
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Generate a default config TOML string (for first-run setup).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_provider: default_provider(),
            default_model: default_model(),
            default_temperature: default_temperature(),
            default_max_tokens: default_max_tokens(),
            max_steps: default_max_steps(),
            max_noop_turns: default_max_noop_turns(),
            provider_order: vec![],
            providers: HashMap::new(),
            agents: vec![],
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert_eq!(config.default_provider, "openrouter");
        assert_eq!(config.max_steps, 12);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.default_provider, config.default_provider);
        assert_eq!(parsed.max_steps, config.max_steps);
    }

    #[test]
    fn invalid_temperature_rejected() {
        let config = AppConfig {
            default_temperature: 5.0,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_steps_rejected() {
        let config = AppConfig {
            max_steps: 0,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let result = AppConfig::load_from(Path::new("/nonexistent/config.toml"));
        assert!(result.is_ok());
        assert_eq!(result.unwrap().default_provider, "openrouter");
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(
            f,
            r#"
default_provider = "groq"
max_steps = 5

[[agents]]
name = "researcher"
description = "Research specialist"
tools = ["web_search"]
"#
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.default_provider, "groq");
        assert_eq!(config.max_steps, 5);
        assert_eq!(config.agents.len(), 1);
        assert_eq!(config.agents[0].name, "researcher");
        assert_eq!(config.agents[0].max_iterations, 6);
        assert!(!config.agents[0].accepts_binary_attachments);
    }

    #[test]
    fn duplicate_agent_names_rejected() {
        let config = AppConfig {
            agents: vec![
                AgentEntry {
                    name: "generic".into(),
                    description: "a".into(),
                    model: None,
                    max_iterations: 3,
                    accepts_binary_attachments: false,
                    tools: vec![],
                },
                AgentEntry {
                    name: "generic".into(),
                    description: "b".into(),
                    model: None,
                    max_iterations: 3,
                    accepts_binary_attachments: false,
                    tools: vec![],
                },
            ],
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn unknown_provider_in_order_rejected() {
        let config = AppConfig {
            provider_order: vec!["nonexistent".into()],
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn builtin_roster_has_five_agents() {
        let roster = AppConfig::default().roster();
        assert_eq!(roster.len(), 5);

        let visual = roster.iter().find(|a| a.name == "visual").unwrap();
        assert!(visual.accepts_binary_attachments);

        let names: Vec<&str> = roster.iter().map(|a| a.name.as_str()).collect();
        assert!(names.contains(&"generic"));
        assert!(names.contains(&"researcher"));
        assert!(names.contains(&"audio"));
        assert!(names.contains(&"code"));
    }

    #[test]
    fn configured_roster_overrides_builtin() {
        let config = AppConfig {
            agents: vec![AgentEntry {
                name: "solo".into(),
                description: "only one".into(),
                model: None,
                max_iterations: 2,
                accepts_binary_attachments: false,
                tools: vec![],
            }],
            ..AppConfig::default()
        };
        let roster = config.roster();
        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0].name, "solo");
    }

    #[test]
    fn api_key_redacted_in_debug() {
        let config = AppConfig {
            api_key: Some("sk-secret".into()),
            ..AppConfig::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("***"));
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = AppConfig::default_toml();
        assert!(toml_str.contains("openrouter"));
        assert!(toml_str.contains("max_steps"));
    }
}
