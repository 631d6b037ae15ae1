//! Run configuration.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config from {path}: {source}")]
    Io { path: String, source: std::io::Error },
    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Parameters of one search run.
///
/// Every field has a default, so an empty TOML document is a valid config.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchConfig {
    /// Significance level α in (0, 1]. A test with p > α counts as independence.
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    /// Largest conditioning-set size tried during skeleton discovery.
    #[serde(default = "default_max_order")]
    pub max_order: usize,
    /// Test the candidate separating sets of one edge on the rayon pool.
    #[serde(default)]
    pub parallel: bool,
}

fn default_alpha() -> f64 { 0.05 }
fn default_max_order() -> usize { 4 }

impl Default for SearchConfig {
    fn default() -> Self {
        Self { alpha: default_alpha(), max_order: default_max_order(), parallel: false }
    }
}

impl SearchConfig {
    pub fn new(alpha: f64, max_order: usize) -> Self {
        Self { alpha, max_order, ..Self::default() }
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: SearchConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|source| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.alpha > 0.0 && self.alpha <= 1.0) {
            return Err(ConfigError::Invalid(format!("alpha must lie in (0, 1], got {}", self.alpha)));
        }
        Ok(())
    }
}
