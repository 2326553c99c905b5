//! Feature set data model.
//!
//! A `FeatureSet` is what the extraction collaborator hands to the engine:
//! a modality tag plus a flat mapping of named feature values. It is
//! immutable once produced and owned by the pipeline invocation.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::EngineError;

/// Content modality tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    Text,
    Code,
    Image,
    Pdf,
    Ui,
}

impl std::fmt::Display for Modality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Modality::Text => write!(f, "text"),
            Modality::Code => write!(f, "code"),
            Modality::Image => write!(f, "image"),
            Modality::Pdf => write!(f, "pdf"),
            Modality::Ui => write!(f, "ui"),
        }
    }
}

impl std::str::FromStr for Modality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Modality::Text),
            "code" => Ok(Modality::Code),
            "image" => Ok(Modality::Image),
            "pdf" => Ok(Modality::Pdf),
            "ui" => Ok(Modality::Ui),
            _ => Err(format!("unknown modality: {}", s)),
        }
    }
}

/// A single extracted feature value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Text(String),
    Number(f64),
    List(Vec<String>),
}

impl FeatureValue {
    /// The value as text, if it is text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FeatureValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Extracted content features for one pipeline invocation.
///
/// BTreeMap keys keep serialization order deterministic, which the audit
/// chain depends on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureSet {
    pub modality: Modality,
    #[serde(default)]
    pub features: BTreeMap<String, FeatureValue>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl FeatureSet {
    /// Create an empty feature set for a modality.
    pub fn new(modality: Modality) -> Self {
        Self {
            modality,
            features: BTreeMap::new(),
            metadata: BTreeMap::new(),
        }
    }

    /// Add a feature, builder-style.
    pub fn with_feature(mut self, name: &str, value: FeatureValue) -> Self {
        self.features.insert(name.to_string(), value);
        self
    }

    /// Add a metadata entry, builder-style.
    pub fn with_metadata(mut self, key: &str, value: &str) -> Self {
        self.metadata.insert(key.to_string(), value.to_string());
        self
    }

    /// Parse a feature set from an inbound JSON payload.
    ///
    /// The payload must carry a `modality` tag; a payload without one fails
    /// with [`EngineError::MissingModality`] rather than defaulting.
    pub fn from_json(value: Value) -> Result<Self, EngineError> {
        match value.get("modality") {
            Some(Value::String(_)) => {}
            _ => return Err(EngineError::MissingModality),
        }
        serde_json::from_value(value)
            .map_err(|e| EngineError::Configuration(format!("malformed feature payload: {}", e)))
    }

    /// The `text` feature, if present.
    pub fn text(&self) -> Option<&str> {
        self.features.get("text").and_then(FeatureValue::as_text)
    }
}

/// Routing decision produced by the routing collaborator.
///
/// The engine does not interpret it; it is only hashed into the ROUTED
/// audit link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteDecision {
    pub model: String,
    pub route_hash: String,
}

impl RouteDecision {
    pub fn new(model: &str, route_hash: &str) -> Self {
        Self {
            model: model.to_string(),
            route_hash: route_hash.to_string(),
        }
    }
}
