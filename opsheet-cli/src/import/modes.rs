//! Operator-adjustable create/update decisions, one per candidate key

use std::collections::HashMap;

use super::reconcile::ReconciliationResult;
use super::types::{CandidateKey, ImportMode};

/// Mode per candidate key for the current import session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModeMap {
    modes: HashMap<CandidateKey, ImportMode>,
}

impl ModeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map seeded from a reconciliation
    pub fn seeded(reconciliation: &ReconciliationResult) -> Self {
        let mut map = Self::new();
        map.seed(reconciliation);
        map
    }

    /// Replace every entry: matched keys default to update, new keys to create
    pub fn seed(&mut self, reconciliation: &ReconciliationResult) {
        self.modes.clear();
        for candidate in &reconciliation.new_records {
            self.modes.insert(candidate.key(), ImportMode::Create);
        }
        for matched in &reconciliation.matched_records {
            self.modes.insert(matched.imported.key(), ImportMode::Update);
        }
    }

    /// Flip one key. Unknown keys are left alone and `None` is returned.
    pub fn toggle(&mut self, key: &CandidateKey) -> Option<ImportMode> {
        let mode = self.modes.get_mut(key)?;
        *mode = mode.toggled();
        Some(*mode)
    }

    /// Set one tracked key. Returns false when the key is unknown.
    pub fn set(&mut self, key: &CandidateKey, mode: ImportMode) -> bool {
        match self.modes.get_mut(key) {
            Some(current) => {
                *current = mode;
                true
            }
            None => false,
        }
    }

    /// Set every tracked key to `mode`
    pub fn set_all(&mut self, mode: ImportMode) {
        for current in self.modes.values_mut() {
            *current = mode;
        }
    }

    pub fn get(&self, key: &CandidateKey) -> Option<ImportMode> {
        self.modes.get(key).copied()
    }

    /// Number of tracked keys currently set to `mode`
    pub fn count(&self, mode: ImportMode) -> usize {
        self.modes.values().filter(|m| **m == mode).count()
    }

    pub fn len(&self) -> usize {
        self.modes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modes.is_empty()
    }

    pub fn clear(&mut self) {
        self.modes.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CandidateKey, &ImportMode)> {
        self.modes.iter()
    }
}
