use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Pipeline configuration module
/// This module handles the pipeline configuration including loading,
/// validating and defaulting configuration settings.
/// Represents the full pipeline configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct PipelineConfig {
    /// Batching and misalignment-recovery policy
    #[serde(default)]
    pub batch: BatchPolicy,

    /// Streaming aggregator settings
    #[serde(default)]
    pub aggregator: AggregatorConfig,
}

/// Batching and misalignment-recovery policy
///
/// The thresholds here are empirically tuned to the observed failure modes of
/// the external translation vendor. They are policy, not protocol: adjust them
/// per backend rather than hardcoding around them.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BatchPolicy {
    // @field: Max units joined into one translate call
    #[serde(default = "default_max_units_per_batch")]
    pub max_units_per_batch: usize,

    // @field: Batch separator the vendor best-effort preserves
    #[serde(default = "default_separator")]
    pub separator: char,

    // @field: Max trimmed length for a unit to count as a header
    #[serde(default = "default_header_max_len")]
    pub header_max_len: usize,

    // @field: Vendor chatter words that mark a corrupted header assignment
    #[serde(default = "default_filler_words")]
    pub filler_words: Vec<String>,
}

impl Default for BatchPolicy {
    fn default() -> Self {
        Self {
            max_units_per_batch: default_max_units_per_batch(),
            separator: default_separator(),
            header_max_len: default_header_max_len(),
            filler_words: default_filler_words(),
        }
    }
}

/// Streaming aggregator settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AggregatorConfig {
    // @field: Minimum chunk length before a natural break is taken
    #[serde(default = "default_min_chunk_len")]
    pub min_chunk_len: usize,

    // @field: Flush drain budget in seconds
    #[serde(default = "default_flush_timeout_secs")]
    pub flush_timeout_secs: u64,

    // @field: Idle-poll interval in milliseconds while draining
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            min_chunk_len: default_min_chunk_len(),
            flush_timeout_secs: default_flush_timeout_secs(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl AggregatorConfig {
    /// Flush drain budget as a Duration
    pub fn flush_timeout(&self) -> Duration {
        Duration::from_secs(self.flush_timeout_secs)
    }

    /// Idle-poll interval as a Duration
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl PipelineConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.batch.max_units_per_batch == 0 {
            return Err(anyhow!("max_units_per_batch must be greater than 0"));
        }
        if self.batch.header_max_len == 0 {
            return Err(anyhow!("header_max_len must be greater than 0"));
        }
        if self.aggregator.flush_timeout_secs == 0 {
            return Err(anyhow!("flush_timeout_secs must be greater than 0"));
        }
        if self.aggregator.poll_interval_ms == 0 {
            return Err(anyhow!("poll_interval_ms must be greater than 0"));
        }
        Ok(())
    }
}

fn default_max_units_per_batch() -> usize {
    24
}

fn default_separator() -> char {
    '|'
}

fn default_header_max_len() -> usize {
    50
}

fn default_filler_words() -> Vec<String> {
    vec![
        "translation".to_string(),
        "translated".to_string(),
        "output".to_string(),
    ]
}

fn default_min_chunk_len() -> usize {
    150
}

fn default_flush_timeout_secs() -> u64 {
    60
}

fn default_poll_interval_ms() -> u64 {
    50
}
