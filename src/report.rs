//! Output formatting for evaluation results.
//!
//! Supports three output formats:
//! - Pretty: colored terminal output for human readability
//! - JSON: structured output for programmatic consumption
//! - Markdown: report document for review workflows

use colored::*;
use serde::{Deserialize, Serialize};

use crate::aggregate::Verdict;
use crate::engine::{EvaluationResult, PipelineOutcome};
use crate::error::{EngineError, Result};
use crate::rules::RuleScore;

/// JSON report structure handed to downstream consumers.
#[derive(Serialize, Deserialize)]
pub struct JsonReport {
    pub version: String,
    pub risk_score: f64,
    pub verdict: Verdict,
    pub compliance_pass: bool,
    pub confidence: f64,
    /// Ordered per-rule breakdown (registration order).
    pub rule_breakdown: Vec<RuleScore>,
    pub raw_reasoning: JsonReasoning,
    /// Ordered audit link identifiers, ROUTED through REPORTED.
    pub audit_chain: Vec<String>,
}

/// Reasoning block of the JSON report.
#[derive(Serialize, Deserialize)]
pub struct JsonReasoning {
    pub intent: String,
    pub risks: Vec<String>,
    pub compliance: Vec<String>,
    pub recommendations: Vec<String>,
}

/// Build the JSON report value for a completed pipeline.
pub fn render_json(outcome: &PipelineOutcome) -> Result<serde_json::Value> {
    let result = &outcome.result;
    let report = JsonReport {
        version: env!("CARGO_PKG_VERSION").to_string(),
        risk_score: result.risk_score,
        verdict: result.verdict,
        compliance_pass: result.compliance_pass,
        confidence: result.confidence,
        rule_breakdown: result.breakdown.clone(),
        raw_reasoning: JsonReasoning {
            intent: result.reasoning.intent.clone(),
            risks: result.reasoning.risks.clone(),
            compliance: result.reasoning.compliance.clone(),
            recommendations: result.reasoning.recommendations.clone(),
        },
        audit_chain: outcome.chain.ids(),
    };
    serde_json::to_value(&report).map_err(|e| EngineError::AuditSerialization {
        stage: "reported".to_string(),
        message: e.to_string(),
    })
}

/// Render a Markdown report for review workflows.
pub fn render_markdown(outcome: &PipelineOutcome) -> String {
    let result = &outcome.result;
    let mut md = String::new();

    md.push_str("# Content Evaluation Report\n\n");
    md.push_str(&format!("**Verdict:** {}\n\n", result.verdict));
    md.push_str(&format!("**Risk Score:** {:.1}/100\n\n", result.risk_score));
    md.push_str(&format!("**Confidence:** {:.2}\n\n", result.confidence));
    md.push_str(&format!(
        "**Compliance:** {}\n\n",
        if result.compliance_pass { "pass" } else { "fail" }
    ));

    md.push_str("## Rule Breakdown\n\n");
    if result.breakdown.is_empty() {
        md.push_str("No applicable rules.\n\n");
    } else {
        md.push_str("| Rule | Score |\n|---|---|\n");
        for rs in &result.breakdown {
            md.push_str(&format!("| {} | {:.1} |\n", rs.rule, rs.score));
        }
        md.push('\n');
    }

    md.push_str("## Reasoning\n\n");
    md.push_str(&format!("Intent: {}\n\n", result.reasoning.intent));
    push_list(&mut md, "Risks", &result.reasoning.risks);
    push_list(&mut md, "Compliance", &result.reasoning.compliance);
    push_list(&mut md, "Recommendations", &result.reasoning.recommendations);

    md.push_str("## Audit Chain\n\n");
    for (i, link) in outcome.chain.links().iter().enumerate() {
        md.push_str(&format!("{}. `{}` ({})\n", i + 1, link.link_id, link.stage));
    }

    md
}

fn push_list(md: &mut String, title: &str, items: &[String]) {
    md.push_str(&format!("### {}\n\n", title));
    if items.is_empty() {
        md.push_str("- none\n\n");
        return;
    }
    for item in items {
        md.push_str(&format!("- {}\n", item));
    }
    md.push('\n');
}

/// Write a colored summary to stdout.
pub fn write_pretty(outcome: &PipelineOutcome) {
    let result = &outcome.result;

    let verdict = match result.verdict {
        Verdict::Pass => "PASS".green().bold(),
        Verdict::Review => "REVIEW".yellow().bold(),
        Verdict::Fail => "FAIL".red().bold(),
    };

    println!("{} risk score {:.1}/100", verdict, result.risk_score);
    println!("confidence: {:.2}", result.confidence);
    println!();

    if result.breakdown.is_empty() {
        println!("no applicable rules for this modality");
    } else {
        println!("rule breakdown:");
        for rs in &result.breakdown {
            let score = format!("{:>6.1}", rs.score);
            let colored_score = if rs.score > 0.0 {
                score.red()
            } else {
                score.green()
            };
            println!("  {} {}", colored_score, rs.rule);
        }
    }
    println!();

    println!("intent: {}", result.reasoning.intent);
    for risk in &result.reasoning.risks {
        println!("  {} {}", "risk:".red(), risk);
    }
    for rec in &result.reasoning.recommendations {
        println!("  {} {}", "hint:".cyan(), rec);
    }
    println!();

    println!("audit chain:");
    for link in outcome.chain.links() {
        println!("  {:<9} {}", link.stage.to_string(), link.link_id.dimmed());
    }
}

/// One-line summary of an evaluation without its audit context.
pub fn summary_line(result: &EvaluationResult) -> String {
    format!(
        "{} (risk {:.1}, confidence {:.2}, {} rule(s))",
        result.verdict,
        result.risk_score,
        result.confidence,
        result.breakdown.len()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ScoreEngine;
    use crate::features::{FeatureSet, FeatureValue, Modality, RouteDecision};
    use crate::policy::Policy;

    fn sample_outcome() -> PipelineOutcome {
        let engine = ScoreEngine::from_policy(&Policy::default()).unwrap();
        let features = FeatureSet::new(Modality::Text).with_feature(
            "text",
            FeatureValue::Text("this file holds a password and a secret token".to_string()),
        );
        engine
            .run(&RouteDecision::new("model-a", "route-1"), &features)
            .unwrap()
    }

    #[test]
    fn test_json_report_schema() {
        let outcome = sample_outcome();
        let value = render_json(&outcome).unwrap();

        assert!(value.get("risk_score").is_some());
        assert!(value.get("compliance_pass").is_some());
        assert_eq!(value["audit_chain"].as_array().unwrap().len(), 4);
        assert_eq!(
            value["rule_breakdown"][0]["rule"].as_str().unwrap(),
            "keyword_risk"
        );
        assert!(value["raw_reasoning"]["intent"].as_str().is_some());
    }

    #[test]
    fn test_json_report_round_trip() {
        let outcome = sample_outcome();
        let value = render_json(&outcome).unwrap();
        let parsed: JsonReport = serde_json::from_value(value).unwrap();
        assert_eq!(parsed.rule_breakdown.len(), outcome.result.breakdown.len());
    }

    #[test]
    fn test_markdown_report_contents() {
        let outcome = sample_outcome();
        let md = render_markdown(&outcome);

        assert!(md.contains("# Content Evaluation Report"));
        assert!(md.contains("**Verdict:**"));
        assert!(md.contains("keyword_risk"));
        assert!(md.contains("## Audit Chain"));
        for link in outcome.chain.links() {
            assert!(md.contains(&link.link_id));
        }
    }

    #[test]
    fn test_summary_line() {
        let outcome = sample_outcome();
        let line = summary_line(&outcome.result);
        assert!(line.contains("risk"));
        assert!(line.contains("2 rule(s)"));
    }
}
