use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

/// Library configuration module
/// This module handles configuration for the segmentation pipeline and the
/// session layer, including loading and validating settings.
/// Represents the full configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Segmentation settings
    #[serde(default)]
    pub segmentation: SegmentationConfig,

    /// Service provider settings
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Settings for chunking, normalization and output validation.
///
/// The grounding and colon thresholds are empirically chosen values; they
/// are kept configurable rather than hard-coded so the cutoffs can be tuned
/// without touching the validation logic.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SegmentationConfig {
    // @field: Max characters per service chunk
    #[serde(default = "default_max_chunk_chars")]
    pub max_chunk_chars: usize,

    // @field: Max visible characters per dialogue line
    #[serde(default = "default_max_line_chars")]
    pub max_line_chars: usize,

    // @field: Shortest grounding probe substring
    #[serde(default = "default_grounding_probe_min")]
    pub grounding_probe_min: usize,

    // @field: Longest grounding probe substring
    #[serde(default = "default_grounding_probe_max")]
    pub grounding_probe_max: usize,

    // @field: Speaker-label colon must appear within this many leading chars
    #[serde(default = "default_speaker_colon_cutoff")]
    pub speaker_colon_cutoff: usize,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            max_chunk_chars: default_max_chunk_chars(),
            max_line_chars: default_max_line_chars(),
            grounding_probe_min: default_grounding_probe_min(),
            grounding_probe_max: default_grounding_probe_max(),
            speaker_colon_cutoff: default_speaker_colon_cutoff(),
        }
    }
}

/// Provider configuration for the text-understanding service
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    // @field: Model name
    #[serde(default = "default_model")]
    pub model: String,

    // @field: API key
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    // @field: Max concurrent chunk requests
    #[serde(default = "default_concurrent_requests")]
    pub concurrent_requests: usize,

    // @field: Max tokens per completion
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_key: String::new(),
            endpoint: default_endpoint(),
            concurrent_requests: default_concurrent_requests(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_max_chunk_chars() -> usize {
    2500
}

fn default_max_line_chars() -> usize {
    20
}

fn default_grounding_probe_min() -> usize {
    3
}

fn default_grounding_probe_max() -> usize {
    8
}

fn default_speaker_colon_cutoff() -> usize {
    6
}

fn default_model() -> String {
    "claude-3-haiku-20240307".to_string()
}

fn default_endpoint() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_concurrent_requests() -> usize {
    4
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for Config {
    fn default() -> Self {
        Self {
            segmentation: SegmentationConfig::default(),
            provider: ProviderConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl Config {
    /// Parse a configuration from a JSON string
    pub fn from_json(content: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(content)
            .map_err(|e| anyhow!("Failed to parse configuration: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration values
    pub fn validate(&self) -> Result<()> {
        let seg = &self.segmentation;
        if seg.max_chunk_chars < 100 {
            return Err(anyhow!(
                "max_chunk_chars must be at least 100, got {}",
                seg.max_chunk_chars
            ));
        }
        if seg.max_line_chars < 4 {
            return Err(anyhow!(
                "max_line_chars must be at least 4, got {}",
                seg.max_line_chars
            ));
        }
        if seg.grounding_probe_min == 0 || seg.grounding_probe_min > seg.grounding_probe_max {
            return Err(anyhow!(
                "invalid grounding probe range: {}..{}",
                seg.grounding_probe_min,
                seg.grounding_probe_max
            ));
        }
        if self.provider.concurrent_requests == 0 {
            return Err(anyhow!("concurrent_requests must be at least 1"));
        }
        Ok(())
    }
}
