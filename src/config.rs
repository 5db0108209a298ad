//! TOML configuration.
//!
//! Only `[db]` is required; every other section falls back to defaults.
//! See `config/msme.example.toml` for a full example.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub narrative: NarrativeConfig,
    #[serde(default)]
    pub gazetteer: GazetteerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    #[serde(default = "default_company_limit")]
    pub company_limit: usize,
    #[serde(default = "default_news_limit")]
    pub news_limit: usize,
    /// Companies and articles ranked when no intent matched.
    #[serde(default = "default_fallback_limit")]
    pub fallback_limit: usize,
    /// Upper bound applied to caller-supplied limits.
    #[serde(default = "default_max_limit")]
    pub max_limit: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            company_limit: default_company_limit(),
            news_limit: default_news_limit(),
            fallback_limit: default_fallback_limit(),
            max_limit: default_max_limit(),
        }
    }
}

impl RetrievalConfig {
    /// Resolve a caller limit: `None` takes `default`, anything else is
    /// clamped to `max_limit`.
    pub fn clamp(&self, requested: Option<usize>, default: usize) -> usize {
        requested.unwrap_or(default).min(self.max_limit)
    }
}

fn default_company_limit() -> usize {
    5
}
fn default_news_limit() -> usize {
    10
}
fn default_fallback_limit() -> usize {
    5
}
fn default_max_limit() -> usize {
    50
}

#[derive(Debug, Deserialize, Clone)]
pub struct NarrativeConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for NarrativeConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: None,
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

fn default_provider() -> String {
    "template".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_max_retries() -> u32 {
    3
}

/// Entries appended to the built-in location and sector lists.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct GazetteerConfig {
    #[serde(default)]
    pub extra_locations: Vec<String>,
    #[serde(default)]
    pub extra_sectors: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive.
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config(&content)
}

/// Parse and validate a configuration document.
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;

    // Validate retrieval
    if config.retrieval.company_limit == 0 {
        anyhow::bail!("retrieval.company_limit must be >= 1");
    }
    if config.retrieval.news_limit == 0 {
        anyhow::bail!("retrieval.news_limit must be >= 1");
    }
    if config.retrieval.fallback_limit == 0 {
        anyhow::bail!("retrieval.fallback_limit must be >= 1");
    }
    let largest = config
        .retrieval
        .company_limit
        .max(config.retrieval.news_limit)
        .max(config.retrieval.fallback_limit);
    if config.retrieval.max_limit < largest {
        anyhow::bail!("retrieval.max_limit must be >= company_limit, news_limit and fallback_limit");
    }

    // Validate narrative
    match config.narrative.provider.as_str() {
        "template" | "disabled" => {}
        "openai" => {
            if config.narrative.model.as_deref().map_or(true, str::is_empty) {
                anyhow::bail!("narrative.model must be specified when provider is 'openai'");
            }
        }
        other => anyhow::bail!(
            "Unknown narrative provider: '{}'. Must be template, openai, or disabled.",
            other
        ),
    }

    Ok(config)
}
