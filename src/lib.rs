//! Scoregate - content risk scoring with a verifiable audit trail.
//!
//! Scoregate evaluates extracted content features (text, code, images,
//! PDFs, UI mockups) against a set of pluggable scoring rules, aggregates
//! their scores into a verdict with a confidence measure, and records
//! every pipeline stage in a cryptographically chained audit record.
//!
//! # Architecture
//!
//! - `features`: modality-tagged feature set consumed by scoring
//! - `rules`: the `ScoringRule` contract and built-in rules
//! - `registry`: ordered, uniquely-keyed rule collection behind a lock
//! - `aggregate`: risk score, verdict bands, confidence
//! - `reasoning`: structured qualitative reasoning from rule findings
//! - `audit`: hash-chained per-stage audit records
//! - `engine`: evaluation fan-out and pipeline orchestration
//! - `policy`: YAML policy schema (deployed thresholds and rule configs)
//! - `report`: output formatting (pretty, JSON, Markdown)
//!
//! # Adding a Rule
//!
//! Implement [`rules::ScoringRule`] and register it with
//! [`engine::ScoreEngine::register_plugin`]. Rules must be pure: the same
//! feature set and configuration always produce the same outcome.

pub mod aggregate;
pub mod audit;
pub mod cli;
pub mod engine;
pub mod error;
pub mod features;
pub mod policy;
pub mod reasoning;
pub mod registry;
pub mod report;
pub mod rules;

pub use aggregate::{Verdict, VerdictBands};
pub use audit::{AuditChain, AuditLink, Stage, GENESIS};
pub use engine::{EvaluationResult, PipelineOutcome, ScoreEngine};
pub use error::EngineError;
pub use features::{FeatureSet, FeatureValue, Modality, RouteDecision};
pub use policy::Policy;
pub use reasoning::Reasoning;
pub use registry::RuleRegistry;
pub use rules::{KeywordRiskRule, LengthComplexityRule, RuleOutcome, RuleScore, ScoringRule};
