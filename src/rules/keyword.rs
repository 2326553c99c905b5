//! Lexical risk rule: scan text for configured high-risk terms.

use regex::Regex;

use crate::error::{EngineError, Result};
use crate::features::FeatureSet;

use super::{RuleOutcome, ScoringRule};

/// Points contributed by each individual term match, before weighting.
pub const POINTS_PER_MATCH: f64 = 10.0;

/// Default high-risk term set.
pub const DEFAULT_TERMS: &[&str] = &[
    "password",
    "secret",
    "api_key",
    "token",
    "credit_card",
    "social_security",
    "private_key",
];

/// Pre-compiled term with its pattern.
struct CompiledTerm {
    term: String,
    pattern: Regex,
}

/// Detects high-risk keywords in the `text` feature.
///
/// Every occurrence of every configured term counts: the score is
/// `matches x 10 x weight`, clamped to 100. Matching is case-insensitive
/// and word-bounded, with suffixed forms accepted ("passwords" matches the
/// term "password").
pub struct KeywordRiskRule {
    terms: Vec<CompiledTerm>,
    weight: f64,
}

impl KeywordRiskRule {
    /// Build a keyword rule from a term list and weight.
    ///
    /// Fails with a configuration error if the weight is negative or
    /// non-finite, or the term list is empty.
    pub fn new(terms: &[String], weight: f64) -> Result<Self> {
        if !weight.is_finite() || weight < 0.0 {
            return Err(EngineError::Configuration(format!(
                "keyword rule weight must be finite and non-negative, got {}",
                weight
            )));
        }
        if terms.is_empty() {
            return Err(EngineError::Configuration(
                "keyword rule requires at least one term".to_string(),
            ));
        }

        // Terms may contain regex metacharacters, so escape before
        // compiling. The trailing \w* accepts plural/suffixed forms.
        let compiled = terms
            .iter()
            .map(|t| {
                let pattern = Regex::new(&format!(r"(?i)\b{}\w*", regex::escape(t)))
                    .map_err(|e| {
                        EngineError::Configuration(format!("compiling term {:?}: {}", t, e))
                    })?;
                Ok(CompiledTerm {
                    term: t.clone(),
                    pattern,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            terms: compiled,
            weight,
        })
    }

    /// Default term set with the given weight.
    pub fn with_defaults(weight: f64) -> Result<Self> {
        let terms: Vec<String> = DEFAULT_TERMS.iter().map(|t| t.to_string()).collect();
        Self::new(&terms, weight)
    }

    /// Count occurrences per term, returning (total matches, matched terms).
    fn count_matches(&self, text: &str) -> (usize, Vec<String>) {
        let mut total = 0;
        let mut matched = Vec::new();

        for ct in &self.terms {
            let count = ct.pattern.find_iter(text).count();
            if count > 0 {
                total += count;
                matched.push(ct.term.clone());
            }
        }

        (total, matched)
    }
}

impl ScoringRule for KeywordRiskRule {
    fn name(&self) -> &str {
        "keyword_risk"
    }

    fn evaluate(&self, features: &FeatureSet) -> Result<RuleOutcome> {
        let text = match features.text() {
            Some(t) => t,
            None => return Ok(RuleOutcome::clean("no text feature to scan")),
        };

        let (matches, matched_terms) = self.count_matches(text);
        if matches == 0 {
            return Ok(RuleOutcome::clean("no high-risk keywords detected"));
        }

        let score = (matches as f64 * POINTS_PER_MATCH * self.weight).min(100.0);
        Ok(RuleOutcome {
            score,
            explanation: format!(
                "found {} high-risk keyword match(es): {}",
                matches,
                matched_terms.join(", ")
            ),
            remediation: Some("remove or redact the matched terms before release".to_string()),
        })
    }
}
