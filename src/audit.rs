//! Hash-chained audit trail.
//!
//! Each pipeline stage's output is canonically serialized and hashed
//! together with the previous link's identifier, producing an append-only
//! chain that proves the run's integrity. A chain is terminal once the
//! REPORTED link lands; a broken chain must never look complete, so any
//! serialization failure is fatal to the invocation.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::error::{EngineError, Result};

/// Sentinel previous-id for the chain's first link.
pub const GENESIS: &str = "0000000000000000000000000000000000000000000000000000000000000000";

/// Pipeline stages, in the only order they may be appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Routed,
    Extracted,
    Scored,
    Reported,
}

/// All stages in append order.
pub const STAGES: [Stage; 4] = [Stage::Routed, Stage::Extracted, Stage::Scored, Stage::Reported];

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Routed => "routed",
            Stage::Extracted => "extracted",
            Stage::Scored => "scored",
            Stage::Reported => "reported",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One stage's entry in the chain.
///
/// `payload` is the canonical serialization the id was computed over; it is
/// recorded so the id can be recomputed during verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLink {
    pub stage: Stage,
    pub link_id: String,
    pub prev: String,
    pub payload: String,
}

/// Append-only, hash-linked sequence of per-stage records.
///
/// Links live in a Vec (arena append, no pointer nodes). Appending returns
/// a new chain; a chain already handed to a caller is never mutated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditChain {
    links: Vec<AuditLink>,
}

impl AuditChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// The stage the next append must carry, or `None` once the chain is
    /// terminal.
    pub fn next_stage(&self) -> Option<Stage> {
        STAGES.get(self.links.len()).copied()
    }

    /// Whether all four stages have been appended.
    pub fn is_complete(&self) -> bool {
        self.links.len() == STAGES.len()
    }

    pub fn links(&self) -> &[AuditLink] {
        &self.links
    }

    /// Ordered link identifiers; the last element is the externally
    /// visible proof of the full run.
    pub fn ids(&self) -> Vec<String> {
        self.links.iter().map(|l| l.link_id.clone()).collect()
    }

    /// Append a stage output, returning the extended chain and the new
    /// link id.
    ///
    /// Fails with [`EngineError::ChainClosed`] once REPORTED has landed,
    /// [`EngineError::StageOrder`] when `stage` is not the next expected
    /// stage, and [`EngineError::AuditSerialization`] when the output
    /// cannot be canonically serialized.
    pub fn append<T: Serialize>(&self, stage: Stage, output: &T) -> Result<(AuditChain, String)> {
        let expected = match self.next_stage() {
            Some(s) => s,
            None => return Err(EngineError::ChainClosed(stage.to_string())),
        };
        if stage != expected {
            return Err(EngineError::StageOrder {
                expected: expected.to_string(),
                got: stage.to_string(),
            });
        }

        let payload = canonical_payload(stage, output)?;
        let prev = match self.links.last() {
            Some(l) => l.link_id.clone(),
            None => GENESIS.to_string(),
        };
        let link_id = hash_link(&payload, &prev);

        let mut links = self.links.clone();
        links.push(AuditLink {
            stage,
            link_id: link_id.clone(),
            prev,
            payload,
        });

        Ok((AuditChain { links }, link_id))
    }

    /// Verify the whole chain: every link's id must be reproducible from
    /// its recorded payload and previous id, stages must be in order, and
    /// every previous-reference must resolve.
    pub fn verify(&self) -> Result<()> {
        let mut prev = GENESIS.to_string();
        for (i, link) in self.links.iter().enumerate() {
            let expected_stage = STAGES.get(i).copied().ok_or_else(|| {
                EngineError::StageOrder {
                    expected: "end of chain".to_string(),
                    got: link.stage.to_string(),
                }
            })?;
            if link.stage != expected_stage {
                return Err(EngineError::StageOrder {
                    expected: expected_stage.to_string(),
                    got: link.stage.to_string(),
                });
            }
            if link.prev != prev {
                return Err(EngineError::AuditSerialization {
                    stage: link.stage.to_string(),
                    message: format!(
                        "previous-link reference does not resolve: expected {}, recorded {}",
                        prev, link.prev
                    ),
                });
            }
            let recomputed = hash_link(&link.payload, &link.prev);
            if recomputed != link.link_id {
                return Err(EngineError::AuditSerialization {
                    stage: link.stage.to_string(),
                    message: "recorded link id does not match recomputed hash".to_string(),
                });
            }
            prev = link.link_id.clone();
        }
        Ok(())
    }
}

/// Canonically serialize a stage output.
///
/// The stage name is folded into the payload so two stages with identical
/// outputs still hash differently.
fn canonical_payload<T: Serialize>(stage: Stage, output: &T) -> Result<String> {
    let value = serde_json::to_value(output).map_err(|e| EngineError::AuditSerialization {
        stage: stage.to_string(),
        message: e.to_string(),
    })?;
    let mut out = String::new();
    out.push_str(stage.as_str());
    out.push(':');
    write_canonical(&value, &mut out);
    Ok(out)
}

/// Deterministic JSON writer: object keys sorted, no whitespace.
fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            // serde_json's default Map is ordered by key already, but the
            // canonical form must not depend on a feature flag.
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String((*key).clone()).to_string());
                out.push(':');
                write_canonical(&map[*key], out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        other => out.push_str(&other.to_string()),
    }
}

/// Content hash of a canonical payload chained to the previous link id.
fn hash_link(payload: &str, prev: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(payload.as_bytes());
    hasher.update(b"|");
    hasher.update(prev.as_bytes());
    hex::encode(hasher.finalize())
}
