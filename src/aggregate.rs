//! Score aggregation and verdict derivation.
//!
//! Rules self-weight before aggregation, so the aggregator sums the
//! breakdown and clamps at 100. Verdict bands are configuration carried in
//! the policy file, not hard-coded constants.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::rules::RuleScore;

/// Maximum possible standard deviation of values in [0, 100], used to
/// normalize the agreement factor.
const MAX_STDDEV: f64 = 50.0;

/// Categorical outcome of aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Pass,
    Review,
    Fail,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Pass => write!(f, "pass"),
            Verdict::Review => write!(f, "review"),
            Verdict::Fail => write!(f, "fail"),
        }
    }
}

impl std::str::FromStr for Verdict {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pass" => Ok(Verdict::Pass),
            "review" => Ok(Verdict::Review),
            "fail" => Ok(Verdict::Fail),
            _ => Err(format!("unknown verdict: {}", s)),
        }
    }
}

/// Threshold bands mapping a risk score to a verdict.
///
/// `risk < pass_below` passes, `risk > fail_above` fails, everything in
/// between goes to review.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct VerdictBands {
    pub pass_below: f64,
    pub fail_above: f64,
}

impl Default for VerdictBands {
    fn default() -> Self {
        Self {
            pass_below: 30.0,
            fail_above: 70.0,
        }
    }
}

impl VerdictBands {
    /// Validate band ordering and range.
    pub fn validate(&self) -> Result<()> {
        let ordered = self.pass_below.is_finite()
            && self.fail_above.is_finite()
            && 0.0 <= self.pass_below
            && self.pass_below <= self.fail_above
            && self.fail_above <= 100.0;
        if !ordered {
            return Err(EngineError::Configuration(format!(
                "verdict bands must satisfy 0 <= pass_below <= fail_above <= 100, \
                 got pass_below={} fail_above={}",
                self.pass_below, self.fail_above
            )));
        }
        Ok(())
    }

    /// Map a risk score to its verdict band.
    pub fn verdict(&self, risk_score: f64) -> Verdict {
        if risk_score < self.pass_below {
            Verdict::Pass
        } else if risk_score > self.fail_above {
            Verdict::Fail
        } else {
            Verdict::Review
        }
    }
}

/// The aggregated outcome for one evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Aggregate {
    /// Risk score in [0, 100].
    pub risk_score: f64,
    pub verdict: Verdict,
    /// True iff the verdict is not the failing band.
    pub compliance_pass: bool,
    /// Confidence in [0.0, 1.0].
    pub confidence: f64,
}

/// Combine per-rule scores into a risk score, verdict, and confidence.
///
/// `expected` is the number of applicable rules for the invocation; a
/// breakdown with fewer entries means the evaluation barrier was not
/// satisfied and aggregation must not proceed.
///
/// An empty breakdown (no applicable rules) yields risk 0, verdict pass,
/// confidence 0.0 - no evidence is not high confidence of safety.
pub fn aggregate(breakdown: &[RuleScore], expected: usize, bands: &VerdictBands) -> Result<Aggregate> {
    if breakdown.len() != expected {
        return Err(EngineError::IncompleteEvaluation {
            expected,
            got: breakdown.len(),
        });
    }

    let risk_score = breakdown
        .iter()
        .map(|rs| rs.score)
        .sum::<f64>()
        .min(100.0)
        .max(0.0);

    let verdict = bands.verdict(risk_score);

    Ok(Aggregate {
        risk_score,
        verdict,
        compliance_pass: verdict != Verdict::Fail,
        confidence: confidence(breakdown),
    })
}

/// Confidence in the aggregated score, in [0.0, 1.0].
///
/// Two factors, both over the rules that fired (scored above zero):
/// corroboration `f / (f + 1)` grows with the number of independent
/// signals, and agreement `1 - stddev/50` shrinks as fired scores
/// disagree. Deterministic given the same breakdown.
pub fn confidence(breakdown: &[RuleScore]) -> f64 {
    let fired: Vec<f64> = breakdown
        .iter()
        .map(|rs| rs.score)
        .filter(|s| *s > 0.0)
        .collect();
    if fired.is_empty() {
        return 0.0;
    }

    let f = fired.len() as f64;
    let corroboration = f / (f + 1.0);

    let mean = fired.iter().sum::<f64>() / f;
    let variance = fired.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / f;
    let agreement = (1.0 - variance.sqrt() / MAX_STDDEV).clamp(0.0, 1.0);

    (corroboration * agreement).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(values: &[(&str, f64)]) -> Vec<RuleScore> {
        values
            .iter()
            .map(|(rule, score)| RuleScore {
                rule: rule.to_string(),
                score: *score,
            })
            .collect()
    }

    #[test]
    fn test_empty_breakdown_passes_with_zero_confidence() {
        let agg = aggregate(&[], 0, &VerdictBands::default()).unwrap();
        assert_eq!(agg.risk_score, 0.0);
        assert_eq!(agg.verdict, Verdict::Pass);
        assert!(agg.compliance_pass);
        assert_eq!(agg.confidence, 0.0);
    }

    #[test]
    fn test_sum_is_clamped_at_100() {
        let agg = aggregate(
            &scores(&[("a", 80.0), ("b", 60.0)]),
            2,
            &VerdictBands::default(),
        )
        .unwrap();
        assert_eq!(agg.risk_score, 100.0);
        assert_eq!(agg.verdict, Verdict::Fail);
        assert!(!agg.compliance_pass);
    }

    #[test]
    fn test_band_boundaries() {
        let bands = VerdictBands::default();
        assert_eq!(bands.verdict(0.0), Verdict::Pass);
        assert_eq!(bands.verdict(29.9), Verdict::Pass);
        assert_eq!(bands.verdict(30.0), Verdict::Review);
        assert_eq!(bands.verdict(70.0), Verdict::Review);
        assert_eq!(bands.verdict(70.1), Verdict::Fail);
        assert_eq!(bands.verdict(100.0), Verdict::Fail);
    }

    #[test]
    fn test_incomplete_breakdown_rejected() {
        let err = aggregate(&scores(&[("a", 10.0)]), 2, &VerdictBands::default()).unwrap_err();
        assert!(matches!(
            err,
            EngineError::IncompleteEvaluation {
                expected: 2,
                got: 1
            }
        ));
    }

    #[test]
    fn test_disagreement_lowers_confidence() {
        // One loud rule plus one silent rule is weaker evidence than two
        // rules in agreement.
        let split = confidence(&scores(&[("a", 100.0), ("b", 0.0)]));
        let agreed = confidence(&scores(&[("a", 50.0), ("b", 50.0)]));
        assert!(split < agreed, "split={} agreed={}", split, agreed);
    }

    #[test]
    fn test_more_corroboration_raises_confidence() {
        let one = confidence(&scores(&[("a", 40.0)]));
        let three = confidence(&scores(&[("a", 40.0), ("b", 40.0), ("c", 40.0)]));
        assert!(three > one);
    }

    #[test]
    fn test_all_zero_scores_have_zero_confidence() {
        assert_eq!(confidence(&scores(&[("a", 0.0), ("b", 0.0)])), 0.0);
    }

    #[test]
    fn test_confidence_in_unit_range() {
        let c = confidence(&scores(&[("a", 100.0), ("b", 1.0), ("c", 55.0)]));
        assert!((0.0..=1.0).contains(&c));
    }

    #[test]
    fn test_bands_validation() {
        assert!(VerdictBands::default().validate().is_ok());
        let bad = VerdictBands {
            pass_below: 80.0,
            fail_above: 20.0,
        };
        assert!(bad.validate().is_err());
        let out_of_range = VerdictBands {
            pass_below: -5.0,
            fail_above: 70.0,
        };
        assert!(out_of_range.validate().is_err());
    }

    #[test]
    fn test_verdict_round_trip() {
        for v in [Verdict::Pass, Verdict::Review, Verdict::Fail] {
            let parsed: Verdict = v.to_string().parse().unwrap();
            assert_eq!(parsed, v);
        }
    }
}
