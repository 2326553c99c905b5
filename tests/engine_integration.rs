//! Integration tests for the full evaluation pipeline.
//!
//! These tests drive the engine end to end: policy-configured rules,
//! plugin registration, aggregation, reasoning, and the audited run.

use std::sync::Arc;

use scoregate::engine::ScoreEngine;
use scoregate::error::EngineError;
use scoregate::features::{FeatureSet, FeatureValue, Modality, RouteDecision};
use scoregate::policy::Policy;
use scoregate::rules::{RuleOutcome, ScoringRule};
use scoregate::Verdict;

fn text_features(text: &str) -> FeatureSet {
    FeatureSet::new(Modality::Text)
        .with_feature("text", FeatureValue::Text(text.to_string()))
        .with_metadata("source", "integration_test")
}

fn default_engine() -> ScoreEngine {
    ScoreEngine::from_policy(&Policy::default()).expect("default policy should build")
}

#[test]
fn test_clean_text_passes() {
    let engine = default_engine();
    let result = engine
        .evaluate(&text_features("a short note about the weather"))
        .unwrap();

    assert_eq!(result.risk_score, 0.0);
    assert_eq!(result.verdict, Verdict::Pass);
    assert!(result.compliance_pass);
    assert_eq!(result.confidence, 0.0);
    // One breakdown entry per applicable rule, even at zero score.
    assert_eq!(result.breakdown.len(), 2);
}

#[test]
fn test_sensitive_text_is_flagged() {
    let engine = default_engine();
    let text = "This document contains passwords and secret API keys. ".repeat(10);
    let result = engine.evaluate(&text_features(&text)).unwrap();

    assert!(result.risk_score > 70.0);
    assert_eq!(result.verdict, Verdict::Fail);
    assert!(!result.compliance_pass);
    assert!(result.confidence > 0.0);

    let keyword = result
        .breakdown
        .iter()
        .find(|rs| rs.rule == "keyword_risk")
        .expect("keyword rule should be in breakdown");
    assert_eq!(keyword.score, 100.0);

    assert!(!result.reasoning.risks.is_empty());
    assert_eq!(
        result.reasoning.risks.len(),
        result.reasoning.recommendations.len()
    );
    assert!(result.reasoning.intent.contains("keyword_risk"));
}

#[test]
fn test_scores_stay_in_range() {
    let engine = default_engine();
    let heavy_keywords = "password secret token credit_card ".repeat(100);
    let very_long = "x".repeat(50_000);
    for text in ["", "password", heavy_keywords.as_str(), very_long.as_str()] {
        let result = engine.evaluate(&text_features(text)).unwrap();
        assert!((0.0..=100.0).contains(&result.risk_score), "text={:.20}", text);
        assert!((0.0..=1.0).contains(&result.confidence));
        for rs in &result.breakdown {
            assert!((0.0..=100.0).contains(&rs.score));
        }
    }
}

#[test]
fn test_repeat_evaluation_is_identical() {
    let engine = default_engine();
    let features = text_features("secret plans, 9000 passwords");

    let a = engine.evaluate(&features).unwrap();
    let b = engine.evaluate(&features).unwrap();

    assert_eq!(a.risk_score, b.risk_score);
    assert_eq!(a.verdict, b.verdict);
    assert_eq!(a.confidence, b.confidence);
    assert_eq!(a.breakdown, b.breakdown);
}

#[test]
fn test_plugin_registration_and_listing() {
    struct EntityCountRule;

    impl ScoringRule for EntityCountRule {
        fn name(&self) -> &str {
            "entity_count"
        }

        fn evaluate(&self, features: &FeatureSet) -> scoregate::error::Result<RuleOutcome> {
            let count = match features.features.get("entities") {
                Some(FeatureValue::List(items)) => items.len(),
                _ => 0,
            };
            Ok(RuleOutcome {
                score: (count as f64 * 5.0).min(100.0),
                explanation: format!("{} sensitive entities extracted", count),
                remediation: None,
            })
        }
    }

    let engine = default_engine();
    engine.register_plugin(Arc::new(EntityCountRule)).unwrap();
    assert_eq!(
        engine.rule_names().unwrap(),
        vec!["keyword_risk", "length_complexity", "entity_count"]
    );

    let features = text_features("nothing risky").with_feature(
        "entities",
        FeatureValue::List(vec!["email".to_string(), "phone".to_string()]),
    );
    let result = engine.evaluate(&features).unwrap();
    assert_eq!(result.breakdown[2].rule, "entity_count");
    assert_eq!(result.breakdown[2].score, 10.0);

    engine.unregister_plugin("entity_count").unwrap();
    assert_eq!(engine.rule_names().unwrap().len(), 2);
    assert!(matches!(
        engine.unregister_plugin("entity_count"),
        Err(EngineError::RuleNotFound(_))
    ));
}

#[test]
fn test_modality_restricted_rule_skips_other_modalities() {
    struct TextOnlyRule;

    impl ScoringRule for TextOnlyRule {
        fn name(&self) -> &str {
            "text_only"
        }

        fn modalities(&self) -> Option<&[Modality]> {
            Some(&[Modality::Text])
        }

        fn evaluate(&self, _features: &FeatureSet) -> scoregate::error::Result<RuleOutcome> {
            Ok(RuleOutcome {
                score: 50.0,
                explanation: "text-only signal".to_string(),
                remediation: None,
            })
        }
    }

    let engine = ScoreEngine::new();
    engine.register_plugin(Arc::new(TextOnlyRule)).unwrap();

    let text_result = engine.evaluate(&text_features("hello")).unwrap();
    assert_eq!(text_result.breakdown.len(), 1);

    let image_result = engine.evaluate(&FeatureSet::new(Modality::Image)).unwrap();
    // No entry for a rule that declined to run.
    assert!(image_result.breakdown.is_empty());
    assert_eq!(image_result.verdict, Verdict::Pass);
    assert_eq!(image_result.confidence, 0.0);
}

#[test]
fn test_full_pipeline_run() {
    let engine = default_engine();
    let route = RouteDecision::new("scorer-v2", "a1b2c3");
    let features = text_features("quarterly report draft");

    let outcome = engine.run(&route, &features).unwrap();

    assert!(outcome.chain.is_complete());
    outcome.chain.verify().unwrap();

    let stages: Vec<String> = outcome
        .chain
        .links()
        .iter()
        .map(|l| l.stage.to_string())
        .collect();
    assert_eq!(stages, vec!["routed", "extracted", "scored", "reported"]);
}

#[test]
fn test_pipeline_is_deterministic_for_same_input() {
    let engine = default_engine();
    let route = RouteDecision::new("scorer-v2", "a1b2c3");
    let features = text_features("identical input");

    let first = engine.run(&route, &features).unwrap();
    let second = engine.run(&route, &features).unwrap();

    assert_eq!(first.chain.ids(), second.chain.ids());
}

#[test]
fn test_custom_policy_bands() {
    let mut policy = Policy::default();
    policy.bands.pass_below = 5.0;
    policy.bands.fail_above = 15.0;

    let engine = ScoreEngine::from_policy(&policy).unwrap();
    // One keyword match: 10 points, which lands in the review band.
    let result = engine.evaluate(&text_features("the password field")).unwrap();
    assert_eq!(result.risk_score, 10.0);
    assert_eq!(result.verdict, Verdict::Review);
    assert!(result.compliance_pass);
}
