//! Error taxonomy for the scoring engine.
//!
//! Every failure the engine can surface maps to exactly one variant here.
//! A failing rule aborts the whole evaluation - partial risk assessment is
//! more dangerous than a visible failure, so there is no best-effort path.

use thiserror::Error;

/// Errors produced by the scoring engine and audit chain.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Bad rule or policy configuration (invalid weight, malformed bands).
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// A rule with the same name is already registered.
    #[error("duplicate rule name: {0:?}")]
    DuplicateRule(String),

    /// No rule registered under the given name.
    #[error("no rule registered under name: {0:?}")]
    RuleNotFound(String),

    /// A rule's evaluate call failed.
    #[error("rule {rule:?} failed to evaluate: {message}")]
    Evaluation { rule: String, message: String },

    /// The evaluation barrier was not satisfied (e.g. cancellation).
    #[error("evaluation incomplete: expected {expected} rule scores, got {got}")]
    IncompleteEvaluation { expected: usize, got: usize },

    /// A stage output could not be canonically serialized for the audit chain.
    #[error("audit serialization failed for stage {stage}: {message}")]
    AuditSerialization { stage: String, message: String },

    /// Append attempted on a chain that already reached REPORTED.
    #[error("audit chain is closed: cannot append stage {0}")]
    ChainClosed(String),

    /// Append attempted out of stage order.
    #[error("audit stage out of order: expected {expected}, got {got}")]
    StageOrder { expected: String, got: String },

    /// Inbound payload lacked the required modality tag.
    #[error("payload is missing the required modality tag")]
    MissingModality,
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, EngineError>;
