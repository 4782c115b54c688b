//! Diff validated candidates against the stored collection
//!
//! Matching is by exact `(group, name)`. Whitespace or case differences
//! make a candidate "new"; no normalisation happens here because it would
//! change which rows become creates and which become updates.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use super::types::{CandidateKey, Record, Snapshot, StoredRecord, ValidationResult};

/// A valid row awaiting reconciliation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    pub row_number: usize,
    pub record: Record,
}

impl Candidate {
    pub fn key(&self) -> CandidateKey {
        self.record.key()
    }
}

/// A candidate sharing its key with a stored operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchedRecord {
    pub imported: Candidate,
    pub existing: StoredRecord,
}

impl MatchedRecord {
    /// Fields an update would overwrite
    pub fn changed_fields(&self) -> Vec<&'static str> {
        self.existing.record.changed_fields(&self.imported.record)
    }
}

/// Partition of the candidate set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconciliationResult {
    /// Areas referenced by candidates but absent from the store, first-seen order
    pub new_groups: Vec<String>,
    /// Candidates without a stored match, input order
    pub new_records: Vec<Candidate>,
    /// Candidates with a stored match, input order
    pub matched_records: Vec<MatchedRecord>,
    /// Keys used by more than one candidate
    pub duplicate_keys: Vec<CandidateKey>,
}

impl ReconciliationResult {
    /// Total number of candidates
    pub fn candidate_count(&self) -> usize {
        self.new_records.len() + self.matched_records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidate_count() == 0
    }

    /// Check whether a group will be created by this import
    pub fn is_new_group(&self, group: &str) -> bool {
        self.new_groups.iter().any(|g| g == group)
    }

    /// Find the stored operation a key matched
    pub fn find_match(&self, key: &CandidateKey) -> Option<&MatchedRecord> {
        self.matched_records.iter().find(|m| m.imported.key() == *key)
    }
}

/// Partition valid candidates into new and matched records.
///
/// Callers should only pass a result where `all_valid()` holds. Invalid rows
/// are a caller bug: debug builds panic, release builds skip them.
/// When the store holds several operations with one key, the first in
/// snapshot order is the match.
pub fn reconcile(validation: &ValidationResult, snapshot: &Snapshot) -> ReconciliationResult {
    debug_assert!(
        validation.all_valid(),
        "reconcile called with {} invalid row(s)",
        validation.invalid_rows
    );

    let mut existing: HashMap<CandidateKey, &StoredRecord> =
        HashMap::with_capacity(snapshot.records.len());
    for stored in &snapshot.records {
        existing.entry(stored.record.key()).or_insert(stored);
    }

    let known_groups: HashSet<&str> = snapshot
        .group_order
        .iter()
        .map(|g| g.as_str())
        .chain(snapshot.records.iter().map(|r| r.record.group.as_str()))
        .collect();

    let mut result = ReconciliationResult::default();
    let mut seen_groups = HashSet::new();
    let mut seen_keys = HashSet::new();
    let mut duplicates = HashSet::new();

    for (row_number, record) in validation.valid_records() {
        let key = record.key();

        if !known_groups.contains(record.group.as_str()) && seen_groups.insert(record.group.clone()) {
            result.new_groups.push(record.group.clone());
        }

        if !seen_keys.insert(key.clone()) && duplicates.insert(key.clone()) {
            result.duplicate_keys.push(key.clone());
        }

        let candidate = Candidate {
            row_number,
            record: record.clone(),
        };

        match existing.get(&key) {
            Some(stored) => result.matched_records.push(MatchedRecord {
                imported: candidate,
                existing: (*stored).clone(),
            }),
            None => result.new_records.push(candidate),
        }
    }

    log::info!(
        "Reconciled {} candidate(s): {} new, {} matched, {} new area(s)",
        result.candidate_count(),
        result.new_records.len(),
        result.matched_records.len(),
        result.new_groups.len()
    );

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::types::{CandidateRow, OperationKind};
    use crate::import::validate::validate_text;
    use uuid::Uuid;

    fn record(group: &str, name: &str, prompt: &str) -> Record {
        Record::new(group, name, OperationKind::Generic, prompt, "")
    }

    fn stored(group: &str, name: &str, prompt: &str) -> StoredRecord {
        StoredRecord {
            id: Uuid::new_v4(),
            record: record(group, name, prompt),
        }
    }

    fn validation(records: Vec<Record>) -> ValidationResult {
        ValidationResult::from_rows(
            records
                .into_iter()
                .enumerate()
                .map(|(i, r)| CandidateRow::accepted(i + 2, r))
                .collect(),
        )
    }

    fn snapshot(records: Vec<StoredRecord>, groups: &[&str]) -> Snapshot {
        Snapshot {
            records,
            group_order: groups.iter().map(|g| g.to_string()).collect(),
        }
    }

    #[test]
    fn test_header_only_reconciles_to_nothing() {
        let validation = validate_text("group\tname\toperation_type\tprompt\tdescription\n");
        let existing = snapshot(vec![stored("Intro", "Check1", "p")], &["Intro"]);

        let result = reconcile(&validation, &existing);
        assert!(result.new_records.is_empty());
        assert!(result.matched_records.is_empty());
        assert!(result.new_groups.is_empty());
    }

    #[test]
    fn test_same_key_different_prompt_is_matched() {
        let existing_record = stored("Intro", "Check1", "old prompt");
        let existing = snapshot(vec![existing_record.clone()], &["Intro"]);
        let validation = validation(vec![record("Intro", "Check1", "new prompt")]);

        let result = reconcile(&validation, &existing);
        assert!(result.new_records.is_empty());
        assert_eq!(result.matched_records.len(), 1);
        assert_eq!(result.matched_records[0].existing.id, existing_record.id);
        assert_eq!(result.matched_records[0].changed_fields(), vec!["prompt"]);
    }

    #[test]
    fn test_new_group_listed_once() {
        let existing = snapshot(vec![], &["Intro"]);
        let validation = validation(vec![
            record("NewArea", "a", "p"),
            record("Intro", "b", "p"),
            record("NewArea", "c", "p"),
            record("Other", "d", "p"),
        ]);

        let result = reconcile(&validation, &existing);
        assert_eq!(result.new_groups, vec!["NewArea".to_string(), "Other".to_string()]);
        assert!(result.is_new_group("NewArea"));
        assert!(!result.is_new_group("Intro"));
    }

    #[test]
    fn test_partition_is_exact_and_ordered() {
        let existing = snapshot(
            vec![stored("Intro", "Check1", "p"), stored("Body", "Check2", "p")],
            &["Intro", "Body"],
        );
        let validation = validation(vec![
            record("Intro", "Check1", "p"),
            record("Intro", "Fresh", "p"),
            record("Body", "Check2", "p"),
            record("Intro", "Check1 ", "p"),
            record("intro", "Check1", "p"),
        ]);

        let result = reconcile(&validation, &existing);
        assert_eq!(result.candidate_count(), validation.valid_rows);

        let matched: Vec<usize> = result.matched_records.iter().map(|m| m.imported.row_number).collect();
        let new: Vec<usize> = result.new_records.iter().map(|c| c.row_number).collect();
        assert_eq!(matched, vec![2, 4]);
        assert_eq!(new, vec![3, 5, 6]);

        // Case differences in the group name still count as a new area
        assert_eq!(result.new_groups, vec!["intro".to_string()]);
    }

    #[test]
    fn test_duplicate_candidate_keys_reported() {
        let existing = snapshot(vec![], &["Intro"]);
        let validation = validation(vec![
            record("Intro", "a", "p1"),
            record("Intro", "a", "p2"),
            record("Intro", "a", "p3"),
        ]);

        let result = reconcile(&validation, &existing);
        assert_eq!(result.duplicate_keys, vec![CandidateKey::new("Intro", "a")]);
        assert_eq!(result.new_records.len(), 3);
    }

    #[test]
    fn test_first_stored_duplicate_wins() {
        let first = stored("Intro", "a", "one");
        let second = stored("Intro", "a", "two");
        let existing = snapshot(vec![first.clone(), second], &["Intro"]);
        let validation = validation(vec![record("Intro", "a", "three")]);

        let result = reconcile(&validation, &existing);
        assert_eq!(result.matched_records[0].existing.id, first.id);
    }

    #[test]
    fn test_group_of_stored_record_is_known() {
        // Group order may lag behind the records it lists
        let existing = snapshot(vec![stored("Hidden", "a", "p")], &[]);
        let validation = validation(vec![record("Hidden", "b", "p")]);

        let result = reconcile(&validation, &existing);
        assert!(result.new_groups.is_empty());
    }
}
