//! Pluggable scoring rules.
//!
//! A rule is a single unit of scoring logic evaluated against a feature
//! set. Rules are registered at runtime and must be pure: the same feature
//! set and the same configuration always produce the same outcome, which is
//! what makes the parallel fan-out in the engine sound.

pub mod keyword;
pub mod length;

pub use keyword::KeywordRiskRule;
pub use length::LengthComplexityRule;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::features::{FeatureSet, Modality};

/// The result of one rule evaluation.
///
/// Score and explanation come back together from a single call, so there is
/// no hidden scratch state and no ordering hazard between scoring and
/// explaining.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleOutcome {
    /// Risk score in [0, 100]. The engine clamps out-of-range values.
    pub score: f64,
    /// Human-readable justification for the score.
    pub explanation: String,
    /// Actionable remediation hint, present when the rule found something.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remediation: Option<String>,
}

impl RuleOutcome {
    /// A zero-score outcome with a neutral explanation.
    pub fn clean(explanation: &str) -> Self {
        Self {
            score: 0.0,
            explanation: explanation.to_string(),
            remediation: None,
        }
    }
}

/// One rule's contribution to an evaluation, keyed by rule name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleFinding {
    pub rule: String,
    pub score: f64,
    pub explanation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remediation: Option<String>,
}

/// A rule name and its numeric score, in registration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleScore {
    pub rule: String,
    pub score: f64,
}

/// Contract for a pluggable scoring rule.
///
/// Implementations must be stateless across invocations and safe to call
/// from multiple worker threads at once.
pub trait ScoringRule: Send + Sync {
    /// Stable name identifying this rule in registries and breakdowns.
    fn name(&self) -> &str;

    /// Modalities this rule applies to. `None` means all modalities.
    fn modalities(&self) -> Option<&[Modality]> {
        None
    }

    /// Evaluate the feature set, returning a score in [0, 100] together
    /// with its explanation.
    fn evaluate(&self, features: &FeatureSet) -> Result<RuleOutcome>;
}

/// Whether a rule declares support for the given modality.
pub fn applies_to(rule: &dyn ScoringRule, modality: Modality) -> bool {
    match rule.modalities() {
        None => true,
        Some(supported) => supported.contains(&modality),
    }
}
