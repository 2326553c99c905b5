//! Reasoning synthesis.
//!
//! Turns rule findings into structured qualitative reasoning: intent,
//! risks, compliance notes, and recommendations. This is a deterministic
//! transform of rule outputs into text - it has no numeric logic of its
//! own and never alters a score.

use serde::{Deserialize, Serialize};

use crate::features::{FeatureSet, Modality};
use crate::rules::RuleFinding;

/// Structured qualitative reasoning for one evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reasoning {
    /// Short phrase classifying the content's apparent purpose.
    pub intent: String,
    /// One entry per rule that scored above the noise floor.
    pub risks: Vec<String>,
    /// Policy-relevant notes.
    pub compliance: Vec<String>,
    /// Actionable remediation hints, one per active risk.
    pub recommendations: Vec<String>,
}

/// Build reasoning from a completed evaluation's findings.
///
/// `noise_floor` is the score below which a finding is treated as noise
/// and excluded from the risks list.
pub fn synthesize(features: &FeatureSet, findings: &[RuleFinding], noise_floor: f64) -> Reasoning {
    let active: Vec<&RuleFinding> = findings.iter().filter(|f| f.score > noise_floor).collect();

    let intent = intent_summary(features.modality, &active);

    let risks: Vec<String> = active
        .iter()
        .map(|f| format!("{}: {}", f.rule, f.explanation))
        .collect();

    let compliance = if active.is_empty() {
        vec!["content is within configured policy limits".to_string()]
    } else {
        active
            .iter()
            .map(|f| format!("policy signal from {} (score {:.1})", f.rule, f.score))
            .collect()
    };

    let recommendations = active
        .iter()
        .map(|f| match &f.remediation {
            Some(hint) => hint.clone(),
            None => format!("manually review the finding reported by {}", f.rule),
        })
        .collect();

    Reasoning {
        intent,
        risks,
        compliance,
        recommendations,
    }
}

/// Classify apparent purpose from the modality and the top-scoring rule.
fn intent_summary(modality: Modality, active: &[&RuleFinding]) -> String {
    let subject = match modality {
        Modality::Text => "text document",
        Modality::Code => "source code",
        Modality::Image => "image",
        Modality::Pdf => "pdf document",
        Modality::Ui => "ui mockup",
    };

    // Ties break toward the earlier finding, i.e. registration order.
    let mut top: Option<&RuleFinding> = None;
    for f in active {
        match top {
            Some(t) if f.score <= t.score => {}
            _ => top = Some(f),
        }
    }

    match top {
        Some(f) => format!("{} flagged primarily by {}", subject, f.rule),
        None => format!("{} with no notable risk signals", subject),
    }
}
