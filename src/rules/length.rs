//! Length/complexity rule: flag content that exceeds a length budget.

use crate::error::{EngineError, Result};
use crate::features::FeatureSet;

use super::{RuleOutcome, ScoringRule};

/// Scores the `text` feature by how far it exceeds a configured maximum.
///
/// At or below `max_length` the score is zero. Above it the score scales
/// linearly: `(excess / max_length) x 100 x weight`, clamped to 100.
pub struct LengthComplexityRule {
    max_length: usize,
    weight: f64,
}

impl LengthComplexityRule {
    pub fn new(max_length: usize, weight: f64) -> Result<Self> {
        if !weight.is_finite() || weight < 0.0 {
            return Err(EngineError::Configuration(format!(
                "length rule weight must be finite and non-negative, got {}",
                weight
            )));
        }
        if max_length == 0 {
            return Err(EngineError::Configuration(
                "length rule max_length must be positive".to_string(),
            ));
        }
        Ok(Self { max_length, weight })
    }
}

impl ScoringRule for LengthComplexityRule {
    fn name(&self) -> &str {
        "length_complexity"
    }

    fn evaluate(&self, features: &FeatureSet) -> Result<RuleOutcome> {
        let text = match features.text() {
            Some(t) => t,
            None => return Ok(RuleOutcome::clean("no text feature to measure")),
        };

        let length = text.chars().count();
        if length <= self.max_length {
            return Ok(RuleOutcome::clean("text length is within acceptable limits"));
        }

        let excess = (length - self.max_length) as f64;
        let raw = (excess / self.max_length as f64) * 100.0;
        let score = (raw * self.weight).min(100.0);

        Ok(RuleOutcome {
            score,
            explanation: format!(
                "text length ({}) exceeds recommended maximum ({})",
                length, self.max_length
            ),
            remediation: Some(format!(
                "shorten the content below {} characters or split it into parts",
                self.max_length
            )),
        })
    }
}
