//! The scoring engine.
//!
//! `ScoreEngine` owns the rule registry and the deployed policy knobs, and
//! orchestrates one pipeline invocation: fan rule evaluation out across
//! worker threads, wait at the barrier, aggregate, synthesize reasoning,
//! and thread the audited stages ROUTED through REPORTED.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::aggregate::{aggregate, Verdict, VerdictBands};
use crate::audit::{AuditChain, Stage};
use crate::error::{EngineError, Result};
use crate::features::{FeatureSet, RouteDecision};
use crate::policy::Policy;
use crate::reasoning::{synthesize, Reasoning};
use crate::registry::RuleRegistry;
use crate::rules::{KeywordRiskRule, LengthComplexityRule, RuleFinding, RuleScore, ScoringRule};

/// The aggregate outcome of one evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// Aggregated risk score in [0, 100].
    pub risk_score: f64,
    pub verdict: Verdict,
    pub compliance_pass: bool,
    /// Confidence in [0.0, 1.0].
    pub confidence: f64,
    /// Per-rule scores in registration order; one entry for every rule
    /// applicable to the evaluated modality.
    pub breakdown: Vec<RuleScore>,
    pub reasoning: Reasoning,
}

/// Summary recorded as the REPORTED audit link's payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSummary {
    pub verdict: Verdict,
    pub risk_score: f64,
    pub confidence: f64,
    /// Link id of the SCORED stage this report was rendered from.
    pub scored_link: String,
}

/// A completed pipeline run: the result plus its verified audit chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineOutcome {
    pub result: EvaluationResult,
    pub chain: AuditChain,
}

/// Risk scoring engine with a pluggable rule registry.
pub struct ScoreEngine {
    registry: RuleRegistry,
    bands: VerdictBands,
    noise_floor: f64,
}

impl ScoreEngine {
    /// An engine with default bands and no rules registered.
    pub fn new() -> Self {
        Self {
            registry: RuleRegistry::new(),
            bands: VerdictBands::default(),
            noise_floor: 1.0,
        }
    }

    /// Build an engine from a policy, registering the built-in rules the
    /// policy configures.
    pub fn from_policy(policy: &Policy) -> Result<Self> {
        policy.validate()?;

        let engine = Self {
            registry: RuleRegistry::new(),
            bands: policy.bands,
            noise_floor: policy.noise_floor,
        };

        if let Some(cfg) = &policy.keyword {
            engine.register_plugin(Arc::new(KeywordRiskRule::new(&cfg.terms, cfg.weight)?))?;
        }
        if let Some(cfg) = &policy.length {
            engine.register_plugin(Arc::new(LengthComplexityRule::new(
                cfg.max_length,
                cfg.weight,
            )?))?;
        }

        Ok(engine)
    }

    /// Register a scoring rule. Fails on duplicate names.
    pub fn register_plugin(&self, rule: Arc<dyn ScoringRule>) -> Result<()> {
        self.registry.register(rule)
    }

    /// Remove a rule by name. Fails if no such rule is registered.
    pub fn unregister_plugin(&self, name: &str) -> Result<()> {
        self.registry.unregister(name)
    }

    /// Registered rule names, in registration order.
    pub fn rule_names(&self) -> Result<Vec<String>> {
        self.registry.names()
    }

    /// Evaluate a feature set against the registered rules.
    pub fn evaluate(&self, features: &FeatureSet) -> Result<EvaluationResult> {
        self.evaluate_inner(features, None)
    }

    /// Evaluate with a cancellation flag.
    ///
    /// Workers observing the flag skip their rule; the barrier then fails
    /// with [`EngineError::IncompleteEvaluation`] and partial findings are
    /// discarded. There is no partial aggregation.
    pub fn evaluate_with_cancel(
        &self,
        features: &FeatureSet,
        cancel: &AtomicBool,
    ) -> Result<EvaluationResult> {
        self.evaluate_inner(features, Some(cancel))
    }

    fn evaluate_inner(
        &self,
        features: &FeatureSet,
        cancel: Option<&AtomicBool>,
    ) -> Result<EvaluationResult> {
        let rules = self.registry.applicable(features.modality)?;
        let expected = rules.len();

        // Parallel fan-out over an immutable snapshot; collect is the
        // barrier. Ok(None) marks a worker skipped by cancellation.
        let evaluated: Vec<Result<Option<RuleFinding>>> = rules
            .par_iter()
            .map(|rule| {
                if let Some(flag) = cancel {
                    if flag.load(Ordering::Relaxed) {
                        return Ok(None);
                    }
                }
                let outcome = rule.evaluate(features).map_err(|e| EngineError::Evaluation {
                    rule: rule.name().to_string(),
                    message: e.to_string(),
                })?;
                if !outcome.score.is_finite() {
                    return Err(EngineError::Evaluation {
                        rule: rule.name().to_string(),
                        message: format!("returned a non-finite score: {}", outcome.score),
                    });
                }
                Ok(Some(RuleFinding {
                    rule: rule.name().to_string(),
                    // Range violations are clamped; only a raised fault is
                    // a hard failure.
                    score: outcome.score.clamp(0.0, 100.0),
                    explanation: outcome.explanation,
                    remediation: outcome.remediation,
                }))
            })
            .collect();

        let mut findings = Vec::with_capacity(expected);
        for entry in evaluated {
            if let Some(finding) = entry? {
                findings.push(finding);
            }
        }
        if findings.len() != expected {
            return Err(EngineError::IncompleteEvaluation {
                expected,
                got: findings.len(),
            });
        }

        let breakdown: Vec<RuleScore> = findings
            .iter()
            .map(|f| RuleScore {
                rule: f.rule.clone(),
                score: f.score,
            })
            .collect();

        let agg = aggregate(&breakdown, expected, &self.bands)?;
        let reasoning = synthesize(features, &findings, self.noise_floor);

        Ok(EvaluationResult {
            risk_score: agg.risk_score,
            verdict: agg.verdict,
            compliance_pass: agg.compliance_pass,
            confidence: agg.confidence,
            breakdown,
            reasoning,
        })
    }

    /// Run the full audited pipeline for one invocation.
    ///
    /// Appends the four stages in order around `evaluate` and verifies the
    /// chain before handing it off; a caller never sees a broken or
    /// partial chain.
    pub fn run(&self, route: &RouteDecision, features: &FeatureSet) -> Result<PipelineOutcome> {
        let chain = AuditChain::new();
        let (chain, _) = chain.append(Stage::Routed, route)?;
        let (chain, _) = chain.append(Stage::Extracted, features)?;

        let result = self.evaluate(features)?;
        let (chain, scored_link) = chain.append(Stage::Scored, &result)?;

        let summary = ReportSummary {
            verdict: result.verdict,
            risk_score: result.risk_score,
            confidence: result.confidence,
            scored_link,
        };
        let (chain, _) = chain.append(Stage::Reported, &summary)?;

        chain.verify()?;
        Ok(PipelineOutcome { result, chain })
    }
}

impl Default for ScoreEngine {
    fn default() -> Self {
        Self::new()
    }
}
