//! Import wizard state
//!
//! The caller owns an `ImportSession` and moves it through
//! paste → validate → (errors → paste again) → reconcile + seed → preview → commit.
//! Every transition takes the session by value and returns the next one.

use std::time::Duration;

use super::commit::{commit, CommitSummary, ImportPlan, OperationStore};
use super::error::ImportError;
use super::modes::ModeMap;
use super::reconcile::{reconcile, ReconciliationResult};
use super::report::{build_preview, PreviewReport};
use super::types::{CandidateKey, ImportMode, Snapshot, ValidationResult};
use super::validate::validate_text;

/// Wizard step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ImportStep {
    #[default]
    Paste,
    Errors,
    Validated,
    Preview,
    Committed,
}

impl ImportStep {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Paste => "Paste Data",
            Self::Errors => "Fix Errors",
            Self::Validated => "Validated",
            Self::Preview => "Review Changes",
            Self::Committed => "Imported",
        }
    }
}

/// State of one import, owned by the caller for the wizard's lifetime
#[derive(Debug, Clone, Default)]
pub struct ImportSession {
    pub step: ImportStep,
    pub validation: Option<ValidationResult>,
    pub reconciliation: Option<ReconciliationResult>,
    pub modes: ModeMap,
    pub summary: Option<CommitSummary>,
}

impl ImportSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start over, e.g. when the dialog is closed
    pub fn reset(self) -> Self {
        Self::default()
    }

    /// Parse and validate pasted text. Discards any earlier reconciliation.
    pub fn validate(self, text: &str) -> Self {
        let validation = validate_text(text);
        let step = if validation.all_valid() {
            ImportStep::Validated
        } else {
            ImportStep::Errors
        };

        ImportSession {
            step,
            validation: Some(validation),
            reconciliation: None,
            modes: ModeMap::new(),
            summary: None,
        }
    }

    /// Diff against the store and seed default modes.
    ///
    /// Only moves forward from `Validated` or `Preview`; otherwise the
    /// session is returned unchanged.
    pub fn reconcile(self, snapshot: &Snapshot) -> Self {
        let validation = match (&self.step, &self.validation) {
            (ImportStep::Validated | ImportStep::Preview, Some(v)) if v.all_valid() => v,
            _ => {
                log::warn!("Ignoring reconcile in step {:?}", self.step);
                return self;
            }
        };

        let reconciliation = reconcile(validation, snapshot);
        let modes = ModeMap::seeded(&reconciliation);

        ImportSession {
            step: ImportStep::Preview,
            reconciliation: Some(reconciliation),
            modes,
            ..self
        }
    }

    /// Set the mode of one candidate key
    pub fn set_mode(mut self, key: &CandidateKey, mode: ImportMode) -> Self {
        if !self.modes.set(key, mode) {
            log::debug!("No candidate with key {}", key);
        }
        self
    }

    /// Flip the mode of one candidate key
    pub fn toggle_mode(mut self, key: &CandidateKey) -> Self {
        self.modes.toggle(key);
        self
    }

    /// "Update All Existing" / "Create All as New"
    pub fn set_all_modes(mut self, mode: ImportMode) -> Self {
        self.modes.set_all(mode);
        self
    }

    /// Writes the current modes would produce
    pub fn plan(&self) -> Option<ImportPlan> {
        self.reconciliation
            .as_ref()
            .map(|r| ImportPlan::build(r, &self.modes))
    }

    /// Preview of the current modes
    pub fn preview(&self) -> Option<PreviewReport> {
        self.reconciliation
            .as_ref()
            .map(|r| build_preview(r, &self.modes))
    }

    pub fn can_commit(&self) -> bool {
        self.step == ImportStep::Preview && self.reconciliation.is_some()
    }

    /// Apply the plan. On failure the session stays in `Preview` so the
    /// operator can retry or go back.
    pub async fn commit(
        self,
        store: &dyn OperationStore,
        timeout: Duration,
    ) -> (Self, Result<CommitSummary, ImportError>) {
        let plan = match self.plan() {
            Some(plan) if self.can_commit() => plan,
            _ => {
                let step = self.step;
                return (
                    self,
                    Err(ImportError::NotReady(step.label().to_string())),
                );
            }
        };

        match commit(store, &plan, timeout).await {
            Ok(summary) => (
                ImportSession {
                    step: ImportStep::Committed,
                    summary: Some(summary),
                    ..self
                },
                Ok(summary),
            ),
            Err(err) => (self, Err(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::commit::tests::RecordingStore;
    use crate::import::types::{OperationKind, Record, StoredRecord};
    use uuid::Uuid;

    const TEXT: &str = "group\tname\toperation_type\tprompt\tdescription\n\
Intro\tCheck1\trating\tNew prompt\t\n\
NewArea\tCheck2\tgeneric\tHello\tdesc\n";

    fn store() -> RecordingStore {
        RecordingStore {
            snapshot: Snapshot {
                records: vec![StoredRecord {
                    id: Uuid::new_v4(),
                    record: Record::new("Intro", "Check1", OperationKind::Rating, "Old prompt", ""),
                }],
                group_order: vec!["Intro".to_string()],
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_invalid_text_stops_at_errors() {
        let session = ImportSession::new().validate("group\tname\toperation_type\tprompt\nA\t\tbogus\t\n");
        assert_eq!(session.step, ImportStep::Errors);

        let store = store();
        let session = session.reconcile(&store.snapshot);
        assert_eq!(session.step, ImportStep::Errors);
        assert!(session.reconciliation.is_none());
    }

    #[test]
    fn test_reconcile_seeds_modes() {
        let store = store();
        let session = ImportSession::new().validate(TEXT).reconcile(&store.snapshot);

        assert_eq!(session.step, ImportStep::Preview);
        assert_eq!(
            session.modes.get(&CandidateKey::new("Intro", "Check1")),
            Some(ImportMode::Update)
        );
        assert_eq!(
            session.modes.get(&CandidateKey::new("NewArea", "Check2")),
            Some(ImportMode::Create)
        );
    }

    #[test]
    fn test_revalidate_drops_modes() {
        let store = store();
        let session = ImportSession::new()
            .validate(TEXT)
            .reconcile(&store.snapshot)
            .set_all_modes(ImportMode::Create)
            .validate(TEXT);

        assert_eq!(session.step, ImportStep::Validated);
        assert!(session.modes.is_empty());
        assert!(session.reconciliation.is_none());
    }

    #[test]
    fn test_transitions_are_repeatable() {
        let store = store();
        let a = ImportSession::new().validate(TEXT).reconcile(&store.snapshot);
        let b = a.clone().reconcile(&store.snapshot);
        assert_eq!(a.modes, b.modes);
        assert_eq!(a.reconciliation, b.reconciliation);
    }

    #[tokio::test]
    async fn test_commit_moves_to_committed() {
        let store = store();
        let session = ImportSession::new()
            .validate(TEXT)
            .reconcile(&store.snapshot)
            .toggle_mode(&CandidateKey::new("Intro", "Check1"));

        let (session, result) = session.commit(&store, Duration::from_secs(5)).await;
        let summary = result.unwrap();

        assert_eq!(session.step, ImportStep::Committed);
        assert_eq!(summary.created_count, 2);
        assert_eq!(summary.updated_count, 0);
    }

    #[tokio::test]
    async fn test_commit_before_preview_is_rejected() {
        let store = store();
        let session = ImportSession::new().validate(TEXT);

        let (session, result) = session.commit(&store, Duration::from_secs(5)).await;
        assert!(matches!(result, Err(ImportError::NotReady(_))));
        assert_eq!(session.step, ImportStep::Validated);
        assert!(store.writes.lock().unwrap().is_empty());
    }
}
