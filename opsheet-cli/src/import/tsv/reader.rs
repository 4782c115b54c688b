//! Parse pasted tab-separated text into untyped rows

use std::collections::HashSet;

use csv::{ReaderBuilder, StringRecord, Terminator};

use super::unescape_field;
use crate::import::error::ImportError;
use crate::import::types::{Column, RawRow};

/// Header layout plus every non-blank data line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSheet {
    /// Line number of the header row
    pub header_line: usize,
    /// Column for each header position (`None` for empty header cells)
    pub columns: Vec<Option<Column>>,
    pub rows: Vec<RawRow>,
}

/// Parse pasted text.
///
/// The first non-blank line is the header. Header tokens are matched
/// ignoring case and surrounding whitespace, in any order. Data lines are
/// split on tabs; extra cells are ignored and missing trailing cells read
/// as empty. Blank lines are skipped.
///
/// Lines end at `\n` with an optional preceding `\r`. A lone `\r` is cell
/// content. Row numbers are 1-based lines of `text`.
pub fn parse_tsv(text: &str) -> Result<ParsedSheet, ImportError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut builder = ReaderBuilder::new();
    builder
        .delimiter(b'\t')
        .quoting(false)
        .has_headers(false)
        .flexible(true)
        .terminator(Terminator::Any(b'\n'));

    let mut layout: Option<(usize, Vec<Option<Column>>)> = None;
    let mut rows = Vec::new();

    for (idx, line) in text.split('\n').enumerate() {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.trim().is_empty() {
            continue;
        }

        let line_number = idx + 1;
        let record = split_line(&builder, line).map_err(|e| {
            ImportError::structural(line_number, format!("Unreadable input: {}", e))
        })?;

        match &layout {
            None => layout = Some((line_number, parse_header(&record, line_number)?)),
            Some((_, columns)) => rows.push(to_raw_row(&record, columns, line_number)),
        }
    }

    let (header_line, columns) = layout.ok_or_else(|| {
        ImportError::structural(
            1,
            format!("No header row found; expected {}", expected_header()),
        )
    })?;

    log::debug!("Parsed {} data row(s) after header on line {}", rows.len(), header_line);

    Ok(ParsedSheet {
        header_line,
        columns,
        rows,
    })
}

/// Split one line (without its terminator) into cells
fn split_line(builder: &ReaderBuilder, line: &str) -> Result<StringRecord, csv::Error> {
    let mut reader = builder.from_reader(line.as_bytes());
    let mut record = StringRecord::new();
    reader.read_record(&mut record)?;
    Ok(record)
}

/// "Operation Type " -> "operation_type"
fn normalize_header(token: &str) -> String {
    token
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase()
}

fn expected_header() -> String {
    Column::all_variants()
        .iter()
        .map(|c| c.header())
        .collect::<Vec<_>>()
        .join(", ")
}

fn parse_header(record: &StringRecord, line: usize) -> Result<Vec<Option<Column>>, ImportError> {
    let mut columns = Vec::with_capacity(record.len());
    let mut seen = HashSet::new();
    let mut unknown = Vec::new();

    for token in record.iter() {
        let normalized = normalize_header(token);
        if normalized.is_empty() {
            columns.push(None);
            continue;
        }

        match Column::from_header(&normalized) {
            Some(column) => {
                if !seen.insert(column) {
                    return Err(ImportError::structural(
                        line,
                        format!("Duplicate column '{}' in header", column),
                    ));
                }
                columns.push(Some(column));
            }
            None => {
                unknown.push(format!("'{}'", token.trim()));
                columns.push(None);
            }
        }
    }

    if !unknown.is_empty() {
        return Err(ImportError::structural(
            line,
            format!(
                "Unknown column(s) {} in header; expected {}",
                unknown.join(", "),
                expected_header()
            ),
        ));
    }

    let missing: Vec<&str> = Column::all_variants()
        .iter()
        .filter(|c| c.is_required() && !seen.contains(*c))
        .map(|c| c.header())
        .collect();

    if !missing.is_empty() {
        return Err(ImportError::structural(
            line,
            format!("Missing column(s) {} in header", missing.join(", ")),
        ));
    }

    Ok(columns)
}

fn to_raw_row(record: &StringRecord, columns: &[Option<Column>], line: usize) -> RawRow {
    let mut row = RawRow::new(line);
    for (idx, column) in columns.iter().enumerate() {
        if let Some(column) = column {
            row.set(*column, unescape_field(record.get(idx).unwrap_or("")));
        }
    }
    row
}

#[cfg(test)]
mod tests {
    use super::*;

    fn structural_message(err: ImportError) -> String {
        match err {
            ImportError::Structural { message, .. } => message,
            other => panic!("expected structural error, got {:?}", other),
        }
    }

    #[test]
    fn test_header_only() {
        let sheet = parse_tsv("group\tname\toperation_type\tprompt\tdescription\n").unwrap();
        assert_eq!(sheet.header_line, 1);
        assert!(sheet.rows.is_empty());
    }

    #[test]
    fn test_header_is_case_and_order_insensitive() {
        let text = " Prompt \tNAME\tOperation Type\tGroup\nSay hi\tgreet\tgeneric\tIntro\n";
        let sheet = parse_tsv(text).unwrap();

        let row = &sheet.rows[0];
        assert_eq!(row.get(Column::Group), "Intro");
        assert_eq!(row.get(Column::Name), "greet");
        assert_eq!(row.get(Column::Kind), "generic");
        assert_eq!(row.get(Column::Prompt), "Say hi");
        assert_eq!(row.get(Column::Description), "");
    }

    #[test]
    fn test_crlf_blank_lines_and_line_numbers() {
        let text = "\r\ngroup\tname\toperation_type\tprompt\r\n\r\nA\ta\tgeneric\tp\r\n   \r\nB\tb\trating\tq\r\n";
        let sheet = parse_tsv(text).unwrap();

        assert_eq!(sheet.header_line, 2);
        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(sheet.rows[0].row_number, 4);
        assert_eq!(sheet.rows[1].row_number, 6);
        assert_eq!(sheet.rows[1].get(Column::Prompt), "q");
    }

    #[test]
    fn test_crlf_rows_follow_header() {
        let text = "group\tname\toperation_type\tprompt\r\nA\ta\tgeneric\tp\r\nB\tb\trating\tq\r\n";
        let sheet = parse_tsv(text).unwrap();

        let lines: Vec<usize> = sheet.rows.iter().map(|r| r.row_number).collect();
        assert_eq!(sheet.header_line, 1);
        assert_eq!(lines, vec![2, 3]);
        assert_eq!(sheet.rows[0].get(Column::Prompt), "p");
    }

    #[test]
    fn test_blank_lines_keep_line_numbers() {
        let text = "group\tname\toperation_type\tprompt\n\nA\ta\tgeneric\tp\n\n\nB\tb\trating\tq\n";
        let sheet = parse_tsv(text).unwrap();

        let lines: Vec<usize> = sheet.rows.iter().map(|r| r.row_number).collect();
        assert_eq!(lines, vec![3, 6]);

        let sheet = parse_tsv("\n\ngroup\tname\toperation_type\tprompt\nA\ta\tgeneric\tp\n").unwrap();
        assert_eq!(sheet.header_line, 3);
        assert_eq!(sheet.rows[0].row_number, 4);
    }

    #[test]
    fn test_lone_carriage_return_stays_in_cell() {
        let text = "group\tname\toperation_type\tprompt\nA\ta\tgeneric\tp1\rp2\n";
        let sheet = parse_tsv(text).unwrap();

        assert_eq!(sheet.rows.len(), 1);
        assert_eq!(sheet.rows[0].row_number, 2);
        assert_eq!(sheet.rows[0].get(Column::Prompt), "p1\rp2");
    }

    #[test]
    fn test_short_and_long_lines() {
        let text = "group\tname\toperation_type\tprompt\tdescription\nA\ta\nB\tb\tgeneric\tp\td\textra\tmore\n";
        let sheet = parse_tsv(text).unwrap();

        assert_eq!(sheet.rows[0].get(Column::Kind), "");
        assert_eq!(sheet.rows[0].get(Column::Prompt), "");
        assert_eq!(sheet.rows[1].get(Column::Description), "d");
    }

    #[test]
    fn test_values_are_unescaped() {
        let text = "group\tname\toperation_type\tprompt\nA\ta\tgeneric\tline\\nnext\\tcol\n";
        let sheet = parse_tsv(text).unwrap();
        assert_eq!(sheet.rows[0].get(Column::Prompt), "line\nnext\tcol");
    }

    #[test]
    fn test_empty_input_is_structural() {
        let message = structural_message(parse_tsv("  \n\n").unwrap_err());
        assert!(message.contains("No header row"));
    }

    #[test]
    fn test_unknown_column_is_structural() {
        let message =
            structural_message(parse_tsv("group\tname\toperation_type\tprompt\towner\n").unwrap_err());
        assert!(message.contains("'owner'"));
    }

    #[test]
    fn test_missing_column_is_structural() {
        let message = structural_message(parse_tsv("group\tname\tprompt\n").unwrap_err());
        assert!(message.contains("operation_type"));
    }

    #[test]
    fn test_data_without_header_is_structural() {
        assert!(parse_tsv("Intro\tCheck1\tgeneric\tDo it\n").is_err());
    }

    #[test]
    fn test_duplicate_column_is_structural() {
        let message =
            structural_message(parse_tsv("group\tname\tkind\toperation_type\tprompt\n").unwrap_err());
        assert!(message.contains("Duplicate"));
    }
}
