//! Turn a reconciled import into writes and hand them to the store
//!
//! Every candidate produces exactly one write:
//! - create when its mode is create or it has no stored match
//! - update of the matched operation when its mode is update
//!
//! New areas are part of the same plan and must be created before any
//! operation that references them.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Serialize;

use super::error::ImportError;
use super::modes::ModeMap;
use super::reconcile::ReconciliationResult;
use super::types::{ImportMode, Record, RecordId, Snapshot};

/// Operation to insert
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedCreate {
    pub row_number: usize,
    pub record: Record,
}

/// Stored operation to overwrite
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedUpdate {
    pub row_number: usize,
    /// Id captured at reconciliation time
    pub id: RecordId,
    pub record: Record,
}

/// All writes of one import, in the order they must be applied
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportPlan {
    pub new_groups: Vec<String>,
    pub creates: Vec<PlannedCreate>,
    pub updates: Vec<PlannedUpdate>,
}

impl ImportPlan {
    /// Resolve every candidate against its mode.
    ///
    /// Matched keys missing from `modes` fall back to update.
    pub fn build(reconciliation: &ReconciliationResult, modes: &ModeMap) -> Self {
        let mut creates: Vec<PlannedCreate> = reconciliation
            .new_records
            .iter()
            .map(|c| PlannedCreate {
                row_number: c.row_number,
                record: c.record.clone(),
            })
            .collect();
        let mut updates = Vec::new();

        for matched in &reconciliation.matched_records {
            let mode = modes
                .get(&matched.imported.key())
                .unwrap_or(ImportMode::Update);

            match mode {
                ImportMode::Create => creates.push(PlannedCreate {
                    row_number: matched.imported.row_number,
                    record: matched.imported.record.clone(),
                }),
                ImportMode::Update => updates.push(PlannedUpdate {
                    row_number: matched.imported.row_number,
                    id: matched.existing.id,
                    record: matched.imported.record.clone(),
                }),
            }
        }

        // Keep the order the operator pasted them in
        creates.sort_by_key(|c| c.row_number);

        ImportPlan {
            new_groups: reconciliation.new_groups.clone(),
            creates,
            updates,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.new_groups.is_empty() && self.creates.is_empty() && self.updates.is_empty()
    }

    /// Number of operation writes (areas not included)
    pub fn write_count(&self) -> usize {
        self.creates.len() + self.updates.len()
    }
}

/// Counts reported after a successful commit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CommitSummary {
    pub created_count: usize,
    pub updated_count: usize,
    pub groups_created: usize,
}

/// Persistence collaborator for one processor's operations.
///
/// Implementations should apply `commit` atomically. A store that cannot
/// must return `ImportError::Partial` with the counts it did apply, and must
/// never drop a failed write silently.
#[async_trait]
pub trait OperationStore: Send + Sync {
    /// Current operations and area order
    async fn load_snapshot(&self) -> Result<Snapshot, ImportError>;

    /// Apply a plan: areas first, then creates, then updates
    async fn commit(&self, plan: &ImportPlan) -> Result<CommitSummary, ImportError>;
}

/// Apply `plan` through `store`, giving up after `timeout`.
///
/// The result is not the new record set; callers reload the snapshot.
pub async fn commit(
    store: &dyn OperationStore,
    plan: &ImportPlan,
    timeout: Duration,
) -> Result<CommitSummary, ImportError> {
    if plan.is_empty() {
        log::info!("Nothing to import");
        return Ok(CommitSummary::default());
    }

    let start = Instant::now();
    log::info!(
        "Committing {} create(s), {} update(s), {} new area(s)",
        plan.creates.len(),
        plan.updates.len(),
        plan.new_groups.len()
    );

    let summary = match tokio::time::timeout(timeout, store.commit(plan)).await {
        Ok(Ok(summary)) => summary,
        Ok(Err(err)) => {
            log::error!("Import commit failed: {}", err);
            return Err(err);
        }
        Err(_) => {
            log::error!("Import commit timed out after {:?}", timeout);
            return Err(ImportError::Timeout(timeout));
        }
    };

    log::info!(
        "Import committed in {:?}: {} created, {} updated",
        start.elapsed(),
        summary.created_count,
        summary.updated_count
    );

    Ok(summary)
}
