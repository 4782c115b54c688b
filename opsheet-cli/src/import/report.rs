//! Preview of what an import will do, for the operator to confirm

use serde::Serialize;

use super::modes::ModeMap;
use super::reconcile::ReconciliationResult;
use super::types::{CandidateKey, ImportMode};

/// How a candidate relates to the stored collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowStatus {
    /// New operation in an area that does not exist yet
    NewArea,
    /// New operation in an existing area
    New,
    /// Shares its key with a stored operation
    Matched,
}

impl RowStatus {
    pub fn label(&self) -> &'static str {
        match self {
            RowStatus::NewArea => "new area",
            RowStatus::New => "new",
            RowStatus::Matched => "matched",
        }
    }
}

/// One line of the preview
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewRow {
    pub row_number: usize,
    pub key: CandidateKey,
    pub status: RowStatus,
    /// Write this row will produce
    pub mode: ImportMode,
    /// Fields an update would change; empty for new rows
    pub changed_fields: Vec<&'static str>,
}

impl PreviewRow {
    /// Matched row whose update would not change anything
    pub fn is_unchanged_update(&self) -> bool {
        self.status == RowStatus::Matched
            && self.mode == ImportMode::Update
            && self.changed_fields.is_empty()
    }
}

/// Everything the preview step shows
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PreviewReport {
    pub new_groups: Vec<String>,
    pub rows: Vec<PreviewRow>,
    pub create_count: usize,
    pub update_count: usize,
    pub duplicate_keys: Vec<CandidateKey>,
}

/// Build the preview in candidate input order
pub fn build_preview(reconciliation: &ReconciliationResult, modes: &ModeMap) -> PreviewReport {
    let mut rows = Vec::with_capacity(reconciliation.candidate_count());

    for candidate in &reconciliation.new_records {
        let status = if reconciliation.is_new_group(&candidate.record.group) {
            RowStatus::NewArea
        } else {
            RowStatus::New
        };
        rows.push(PreviewRow {
            row_number: candidate.row_number,
            key: candidate.key(),
            status,
            // Without a match there is nothing to update
            mode: ImportMode::Create,
            changed_fields: Vec::new(),
        });
    }

    for matched in &reconciliation.matched_records {
        let key = matched.imported.key();
        let mode = modes.get(&key).unwrap_or(ImportMode::Update);
        rows.push(PreviewRow {
            row_number: matched.imported.row_number,
            key,
            status: RowStatus::Matched,
            mode,
            changed_fields: matched.changed_fields(),
        });
    }

    rows.sort_by_key(|r| r.row_number);

    let create_count = rows.iter().filter(|r| r.mode == ImportMode::Create).count();

    PreviewReport {
        new_groups: reconciliation.new_groups.clone(),
        update_count: rows.len() - create_count,
        create_count,
        rows,
        duplicate_keys: reconciliation.duplicate_keys.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::reconcile::reconcile;
    use crate::import::types::{OperationKind, Snapshot, StoredRecord};
    use crate::import::validate::validate_text;
    use uuid::Uuid;

    fn snapshot() -> Snapshot {
        let stored = |name: &str, prompt: &str| StoredRecord {
            id: Uuid::new_v4(),
            record: crate::import::types::Record::new("Intro", name, OperationKind::Generic, prompt, ""),
        };
        Snapshot {
            records: vec![stored("Same", "p"), stored("Edited", "old")],
            group_order: vec!["Intro".to_string()],
        }
    }

    const TEXT: &str = "group\tname\toperation_type\tprompt\n\
Intro\tSame\tgeneric\tp\n\
Fresh\tOne\tgeneric\tp\n\
Intro\tEdited\tgeneric\tnew\n\
Intro\tTwo\tgeneric\tp\n";

    #[test]
    fn test_preview_rows_and_counts() {
        let reconciliation = reconcile(&validate_text(TEXT), &snapshot());
        let mut modes = ModeMap::seeded(&reconciliation);
        modes.set(&CandidateKey::new("Intro", "Edited"), ImportMode::Create);

        let report = build_preview(&reconciliation, &modes);
        let statuses: Vec<RowStatus> = report.rows.iter().map(|r| r.status).collect();

        assert_eq!(
            statuses,
            vec![RowStatus::Matched, RowStatus::NewArea, RowStatus::Matched, RowStatus::New]
        );
        assert_eq!(report.create_count, 3);
        assert_eq!(report.update_count, 1);
        assert!(report.rows[0].is_unchanged_update());
        assert_eq!(report.rows[2].changed_fields, vec!["prompt"]);
    }

    #[test]
    fn test_preview_serializes() {
        let reconciliation = reconcile(&validate_text(TEXT), &snapshot());
        let report = build_preview(&reconciliation, &ModeMap::seeded(&reconciliation));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["rows"][1]["status"], "new_area");
        assert_eq!(json["rows"][0]["mode"], "update");
    }
}
