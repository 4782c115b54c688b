//! Row validation: the only place untyped cells become typed records

use super::error::ImportError;
use super::tsv::parse_tsv;
use super::types::{CandidateRow, Column, OperationKind, RawRow, Record, ValidationResult};

/// Parse and validate pasted text in one step.
///
/// A header problem becomes a single synthetic error row; row problems are
/// collected per row. This never fails.
pub fn validate_text(text: &str) -> ValidationResult {
    match parse_tsv(text) {
        Ok(sheet) => validate_rows(&sheet.rows),
        Err(ImportError::Structural { line, message }) => {
            log::debug!("Structural parse failure on line {}: {}", line, message);
            ValidationResult::structural(line, message)
        }
        Err(other) => ValidationResult::structural(1, other.to_string()),
    }
}

/// Validate every row, never stopping at the first bad one
pub fn validate_rows(rows: &[RawRow]) -> ValidationResult {
    let result = ValidationResult::from_rows(rows.iter().map(validate_row).collect());

    log::debug!(
        "Validated {} row(s): {} valid, {} invalid",
        result.total_rows,
        result.valid_rows,
        result.invalid_rows
    );

    result
}

/// Check one row, reporting every failing rule
pub fn validate_row(row: &RawRow) -> CandidateRow {
    let mut errors = Vec::new();

    let group = row.get(Column::Group);
    if group.trim().is_empty() {
        errors.push("group is required".to_string());
    }

    let name = row.get(Column::Name);
    if name.trim().is_empty() {
        errors.push("name is required".to_string());
    }

    let kind_raw = row.get(Column::Kind).trim();
    let kind = OperationKind::parse(kind_raw);
    if kind.is_none() {
        if kind_raw.is_empty() {
            errors.push(format!(
                "operation_type is required (allowed: {})",
                OperationKind::allowed_list()
            ));
        } else {
            errors.push(format!(
                "Invalid operation_type '{}' (allowed: {})",
                kind_raw,
                OperationKind::allowed_list()
            ));
        }
    }

    let prompt = row.get(Column::Prompt);
    if prompt.trim().is_empty() {
        errors.push("prompt is required".to_string());
    }

    match kind {
        Some(kind) if errors.is_empty() => CandidateRow::accepted(
            row.row_number,
            // Key fields are kept exactly as typed
            Record::new(group, name, kind, prompt, row.get(Column::Description)),
        ),
        _ => CandidateRow::rejected(row.row_number, errors),
    }
}
