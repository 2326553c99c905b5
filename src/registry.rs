//! Ordered rule registry.
//!
//! Registration order is an external contract: it determines breakdown
//! iteration order and tie-break behavior downstream, so the registry keeps
//! rules in a Vec rather than a map.

use std::sync::{Arc, RwLock};

use crate::error::{EngineError, Result};
use crate::features::Modality;
use crate::rules::{applies_to, ScoringRule};

/// Shared, read-mostly collection of registered scoring rules.
///
/// Mutation takes the write lock; `applicable` and `names` clone handles
/// under the read lock, so concurrent readers observe either the pre- or
/// post-mutation registry, never a partial one.
pub struct RuleRegistry {
    rules: RwLock<Vec<Arc<dyn ScoringRule>>>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self {
            rules: RwLock::new(Vec::new()),
        }
    }

    /// Register a rule at the end of the ordered collection.
    ///
    /// Fails with [`EngineError::DuplicateRule`] if a rule with the same
    /// name is already registered.
    pub fn register(&self, rule: Arc<dyn ScoringRule>) -> Result<()> {
        let mut rules = self.rules.write().map_err(lock_poisoned)?;
        if rules.iter().any(|r| r.name() == rule.name()) {
            return Err(EngineError::DuplicateRule(rule.name().to_string()));
        }
        rules.push(rule);
        Ok(())
    }

    /// Remove a rule by name.
    ///
    /// Fails with [`EngineError::RuleNotFound`] for an unknown name; a
    /// silent no-op would let callers believe they removed a live rule.
    pub fn unregister(&self, name: &str) -> Result<()> {
        let mut rules = self.rules.write().map_err(lock_poisoned)?;
        let before = rules.len();
        rules.retain(|r| r.name() != name);
        if rules.len() == before {
            return Err(EngineError::RuleNotFound(name.to_string()));
        }
        Ok(())
    }

    /// Snapshot of the rules applicable to a modality, in registration
    /// order. A rule with no modality restriction is applicable to all.
    pub fn applicable(&self, modality: Modality) -> Result<Vec<Arc<dyn ScoringRule>>> {
        let rules = self.rules.read().map_err(lock_poisoned)?;
        Ok(rules
            .iter()
            .filter(|r| applies_to(r.as_ref(), modality))
            .cloned()
            .collect())
    }

    /// Names of all registered rules, in registration order.
    pub fn names(&self) -> Result<Vec<String>> {
        let rules = self.rules.read().map_err(lock_poisoned)?;
        Ok(rules.iter().map(|r| r.name().to_string()).collect())
    }

    /// Number of registered rules.
    pub fn len(&self) -> usize {
        self.rules.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn lock_poisoned<T>(_: std::sync::PoisonError<T>) -> EngineError {
    EngineError::Configuration("rule registry lock poisoned".to_string())
}
