/// Tuning parameters for sentence generation.
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::walker::DEFAULT_MAX_WALK_LENGTH;

pub const DEFAULT_TRIES: u32 = 8;
pub const DEFAULT_MAX_OVERLAP_RATIO: f64 = 0.7;
pub const DEFAULT_MAX_OVERLAP_TOTAL: usize = 20;

/// Immutable per-call generation settings.
///
/// Missing fields fall back to their defaults when loaded from RON, so a
/// config file only needs the values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Attempts per call before giving up. Length and novelty rejections
    /// share this budget.
    pub tries: u32,
    pub max_overlap_ratio: f64,
    pub max_overlap_total: usize,
    /// Apply the novelty check when the model retained its source text.
    pub test_output: bool,
    pub max_words: Option<usize>,
    /// Hard cap on a single walk; `None` removes it.
    pub max_walk_length: Option<usize>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            tries: DEFAULT_TRIES,
            max_overlap_ratio: DEFAULT_MAX_OVERLAP_RATIO,
            max_overlap_total: DEFAULT_MAX_OVERLAP_TOTAL,
            test_output: true,
            max_words: None,
            max_walk_length: Some(DEFAULT_MAX_WALK_LENGTH),
        }
    }
}

impl GenerationConfig {
    pub fn with_tries(mut self, tries: u32) -> Self {
        self.tries = tries;
        self
    }

    pub fn with_max_words(mut self, max_words: usize) -> Self {
        self.max_words = Some(max_words);
        self
    }

    pub fn without_novelty_check(mut self) -> Self {
        self.test_output = false;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.max_overlap_ratio.is_finite() || self.max_overlap_ratio < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "max_overlap_ratio must be a non-negative number, got {}",
                self.max_overlap_ratio
            )));
        }
        Ok(())
    }

    pub fn parse_ron(contents: &str) -> Result<Self, ConfigError> {
        let config: GenerationConfig = ron::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a RON file.
    pub fn load_from_ron(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("invalid config: {0}")]
    Invalid(String),
}
