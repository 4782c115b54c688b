//! Write operation collections as tab-separated text

use std::collections::HashMap;

use anyhow::{Context, Result};
use csv::{QuoteStyle, Terminator, WriterBuilder};

use super::escape_field;
use crate::import::types::{Column, Record, Snapshot};

/// Serialize records to TSV.
///
/// Rows are ordered by the area's index in `group_order`, then by their
/// position in `records`. Areas missing from `group_order` go last, sorted
/// by name.
pub fn export_tsv(records: &[Record], group_order: &[String]) -> Result<String> {
    let mut rank: HashMap<&str, usize> = HashMap::new();
    for (idx, group) in group_order.iter().enumerate() {
        rank.entry(group.as_str()).or_insert(idx);
    }

    let mut ordered: Vec<(usize, &Record)> = records.iter().enumerate().collect();
    ordered.sort_by(|(idx_a, a), (idx_b, b)| {
        group_rank(&rank, &a.group)
            .cmp(&group_rank(&rank, &b.group))
            .then(idx_a.cmp(idx_b))
    });

    let mut wtr = WriterBuilder::new()
        .delimiter(b'\t')
        .quote_style(QuoteStyle::Never)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    wtr.write_record(Column::all_variants().iter().map(|c| c.header()))
        .context("Failed to write TSV header")?;

    for (_, record) in ordered {
        wtr.write_record([
            escape_field(&record.group),
            escape_field(&record.name),
            record.kind.as_str().to_string(),
            escape_field(&record.prompt),
            escape_field(&record.description),
        ])
        .with_context(|| format!("Failed to write operation '{}'", record.key()))?;
    }

    let bytes = wtr
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush TSV writer: {}", e.error()))?;

    String::from_utf8(bytes).context("TSV output is not valid UTF-8")
}

/// Serialize a stored snapshot in its own display order
pub fn export_snapshot(snapshot: &Snapshot) -> Result<String> {
    export_tsv(&snapshot.plain_records(), &snapshot.group_order)
}

fn group_rank<'a>(rank: &HashMap<&str, usize>, group: &'a str) -> (usize, &'a str) {
    match rank.get(group) {
        Some(idx) => (*idx, ""),
        None => (usize::MAX, group),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::types::OperationKind;

    fn record(group: &str, name: &str) -> Record {
        Record::new(group, name, OperationKind::Generic, format!("{} prompt", name), "")
    }

    #[test]
    fn test_header_row() {
        let out = export_tsv(&[], &[]).unwrap();
        assert_eq!(out, "group\tname\toperation_type\tprompt\tdescription\n");
    }

    #[test]
    fn test_rows_follow_group_order_then_position() {
        let records = vec![
            record("Zeta", "z1"),
            record("Intro", "i1"),
            record("Body", "b1"),
            record("Intro", "i2"),
            record("Alpha", "a1"),
        ];
        let order = vec!["Intro".to_string(), "Body".to_string()];

        let out = export_tsv(&records, &order).unwrap();
        let names: Vec<&str> = out
            .lines()
            .skip(1)
            .map(|l| l.split('\t').nth(1).unwrap())
            .collect();

        // Unordered areas trail, alphabetically
        assert_eq!(names, vec!["i1", "i2", "b1", "a1", "z1"]);
    }

    #[test]
    fn test_no_raw_separators_in_fields() {
        let mut r = record("Intro", "multi");
        r.prompt = "line one\nline two\tindented".to_string();
        r.description = "windows\r\nbreak".to_string();

        let out = export_tsv(&[r], &[]).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].split('\t').count(), 5);
    }

    #[test]
    fn test_quotes_are_written_verbatim() {
        let mut r = record("Intro", "quoted");
        r.prompt = "Say \"hello\"".to_string();

        let out = export_tsv(&[r], &[]).unwrap();
        assert!(out.contains("\tSay \"hello\"\t"));
    }
}
