//! Policy file schema.
//!
//! A policy defines the deployed scoring configuration: verdict bands,
//! the reasoning noise floor, and the built-in rule configurations. It is
//! a YAML file so the thresholds in force are a reviewable artifact, not
//! constants in the binary.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::aggregate::VerdictBands;
use crate::error::{EngineError, Result};
use crate::rules::keyword::DEFAULT_TERMS;

/// Top-level policy definition.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Policy {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub name: String,
    /// Verdict threshold bands over the aggregated risk score.
    #[serde(default)]
    pub bands: VerdictBands,
    /// Scores at or below this are treated as noise by the reasoning
    /// synthesizer.
    #[serde(default = "default_noise_floor")]
    pub noise_floor: f64,
    #[serde(default)]
    pub keyword: Option<KeywordRuleConfig>,
    #[serde(default)]
    pub length: Option<LengthRuleConfig>,
}

/// Configuration for the built-in keyword risk rule.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct KeywordRuleConfig {
    #[serde(default = "default_keyword_terms")]
    pub terms: Vec<String>,
    #[serde(default = "default_weight")]
    pub weight: f64,
}

/// Configuration for the built-in length/complexity rule.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LengthRuleConfig {
    #[serde(default = "default_max_length")]
    pub max_length: usize,
    #[serde(default = "default_length_weight")]
    pub weight: f64,
}

fn default_noise_floor() -> f64 {
    1.0
}

fn default_weight() -> f64 {
    1.0
}

fn default_length_weight() -> f64 {
    0.5
}

fn default_max_length() -> usize {
    10000
}

fn default_keyword_terms() -> Vec<String> {
    DEFAULT_TERMS.iter().map(|t| t.to_string()).collect()
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            version: "1".to_string(),
            name: "default".to_string(),
            bands: VerdictBands::default(),
            noise_floor: default_noise_floor(),
            keyword: Some(KeywordRuleConfig {
                terms: default_keyword_terms(),
                weight: default_weight(),
            }),
            length: Some(LengthRuleConfig {
                max_length: default_max_length(),
                weight: default_length_weight(),
            }),
        }
    }
}

impl Policy {
    /// Parse a policy from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            EngineError::Configuration(format!(
                "reading policy {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        let policy: Policy = serde_yaml::from_str(&content)
            .map_err(|e| EngineError::Configuration(format!("parsing policy: {}", e)))?;
        policy.validate()?;
        Ok(policy)
    }

    /// Render the policy as YAML (used by `init`).
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| EngineError::Configuration(format!("serializing policy: {}", e)))
    }

    /// Validate bands and the noise floor.
    pub fn validate(&self) -> Result<()> {
        self.bands.validate()?;
        if !self.noise_floor.is_finite() || self.noise_floor < 0.0 {
            return Err(EngineError::Configuration(format!(
                "noise_floor must be finite and non-negative, got {}",
                self.noise_floor
            )));
        }
        Ok(())
    }
}
