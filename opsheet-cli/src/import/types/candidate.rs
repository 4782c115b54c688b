//! Parsed rows and validation results

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use super::Record;

/// Columns of the tabular format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Column {
    Group,
    Name,
    Kind,
    Prompt,
    Description,
}

impl Column {
    /// Columns in export order
    pub fn all_variants() -> &'static [Column] {
        &[
            Column::Group,
            Column::Name,
            Column::Kind,
            Column::Prompt,
            Column::Description,
        ]
    }

    /// Header token written on export
    pub fn header(&self) -> &'static str {
        match self {
            Column::Group => "group",
            Column::Name => "name",
            Column::Kind => "operation_type",
            Column::Prompt => "prompt",
            Column::Description => "description",
        }
    }

    /// Whether a header without this column is rejected
    pub fn is_required(&self) -> bool {
        !matches!(self, Column::Description)
    }

    /// Resolve an already normalised header token (lowercase, `_` for spaces)
    pub fn from_header(token: &str) -> Option<Self> {
        match token {
            "group" | "area" => Some(Column::Group),
            "name" => Some(Column::Name),
            "operation_type" | "kind" | "type" => Some(Column::Kind),
            "prompt" => Some(Column::Prompt),
            "description" => Some(Column::Description),
            _ => None,
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

/// One untyped data line, keyed by column. Only the validator reads these.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    /// 1-based line number in the pasted text
    pub row_number: usize,
    pub cells: HashMap<Column, String>,
}

impl RawRow {
    pub fn new(row_number: usize) -> Self {
        RawRow {
            row_number,
            cells: HashMap::new(),
        }
    }

    /// Cell value, empty when the column is absent or the line was short
    pub fn get(&self, column: Column) -> &str {
        self.cells.get(&column).map(|s| s.as_str()).unwrap_or("")
    }

    pub fn set(&mut self, column: Column, value: impl Into<String>) {
        self.cells.insert(column, value.into());
    }
}

/// Outcome of validating one data line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateRow {
    /// 1-based line number in the pasted text
    pub row_number: usize,
    /// Typed record, present only when the row is valid
    pub record: Option<Record>,
    pub valid: bool,
    /// Human readable problems, empty iff `valid`
    pub errors: Vec<String>,
}

impl CandidateRow {
    /// A row that passed every check
    pub fn accepted(row_number: usize, record: Record) -> Self {
        CandidateRow {
            row_number,
            record: Some(record),
            valid: true,
            errors: Vec::new(),
        }
    }

    /// A row with at least one problem
    pub fn rejected(row_number: usize, errors: Vec<String>) -> Self {
        debug_assert!(!errors.is_empty(), "rejected rows need an error");
        CandidateRow {
            row_number,
            record: None,
            valid: false,
            errors,
        }
    }
}

/// Aggregate over every row of one parse
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub total_rows: usize,
    pub valid_rows: usize,
    pub invalid_rows: usize,
    pub rows: Vec<CandidateRow>,
    /// Set when the header could not be understood. `rows` then holds a
    /// single synthetic error row.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structural_error: Option<String>,
}

impl ValidationResult {
    /// Build the aggregate from validated rows
    pub fn from_rows(rows: Vec<CandidateRow>) -> Self {
        let valid_rows = rows.iter().filter(|r| r.valid).count();
        ValidationResult {
            total_rows: rows.len(),
            valid_rows,
            invalid_rows: rows.len() - valid_rows,
            rows,
            structural_error: None,
        }
    }

    /// Global parse failure reported as one synthetic row
    pub fn structural(row_number: usize, message: impl Into<String>) -> Self {
        let message = message.into();
        let mut result =
            Self::from_rows(vec![CandidateRow::rejected(row_number, vec![message.clone()])]);
        result.structural_error = Some(message);
        result
    }

    /// True iff no row failed
    pub fn all_valid(&self) -> bool {
        self.invalid_rows == 0 && self.structural_error.is_none()
    }

    /// Valid rows with their records, in input order
    pub fn valid_records(&self) -> impl Iterator<Item = (usize, &Record)> {
        self.rows
            .iter()
            .filter(|r| r.valid)
            .filter_map(|r| r.record.as_ref().map(|record| (r.row_number, record)))
    }

    /// Rows that failed, in input order
    pub fn invalid(&self) -> impl Iterator<Item = &CandidateRow> {
        self.rows.iter().filter(|r| !r.valid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::types::OperationKind;

    #[test]
    fn test_header_aliases() {
        assert_eq!(Column::from_header("operation_type"), Some(Column::Kind));
        assert_eq!(Column::from_header("kind"), Some(Column::Kind));
        assert_eq!(Column::from_header("area"), Some(Column::Group));
        assert_eq!(Column::from_header("prompts"), None);
    }

    #[test]
    fn test_counts_add_up() {
        let record = Record::new("A", "x", OperationKind::Generic, "p", "");
        let result = ValidationResult::from_rows(vec![
            CandidateRow::accepted(2, record),
            CandidateRow::rejected(3, vec!["name is required".into()]),
        ]);

        assert_eq!(result.total_rows, 2);
        assert_eq!(result.valid_rows + result.invalid_rows, result.total_rows);
        assert!(!result.all_valid());
        assert_eq!(result.valid_records().count(), 1);
    }

    #[test]
    fn test_structural_is_never_valid() {
        let result = ValidationResult::structural(1, "Missing column(s): prompt");
        assert!(!result.all_valid());
        assert_eq!(result.rows.len(), 1);
        assert_eq!(result.invalid_rows, 1);
    }

    #[test]
    fn test_empty_result_is_valid() {
        assert!(ValidationResult::from_rows(Vec::new()).all_valid());
    }
}
