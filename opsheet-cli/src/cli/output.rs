//! Terminal and JSON rendering of command results

use anyhow::{Context, Result};
use colored::*;
use serde::Serialize;

use crate::import::types::{ImportMode, ValidationResult};
use crate::import::{CommitSummary, PreviewReport, RowStatus};

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}

pub fn print_validation(result: &ValidationResult) {
    if let Some(error) = &result.structural_error {
        println!("{} {}", "✗".bright_red(), error.bright_red());
        return;
    }

    for row in result.invalid() {
        println!(
            "{} row {}: {}",
            "✗".bright_red(),
            row.row_number.to_string().bold(),
            row.errors.join("; ")
        );
    }

    let counts = format!(
        "{} rows, {} valid, {} invalid",
        result.total_rows, result.valid_rows, result.invalid_rows
    );
    if result.all_valid() {
        println!("{} {}", "✓".bright_green(), counts);
    } else {
        println!("{} {}", "✗".bright_red(), counts);
    }
}

pub fn print_preview(report: &PreviewReport) {
    if !report.new_groups.is_empty() {
        println!("{}", "New areas".bold());
        for group in &report.new_groups {
            println!("  {} {}", "+".bright_green(), group);
        }
        println!();
    }

    println!("{}", "Operations".bold());
    for row in &report.rows {
        let status = match row.status {
            RowStatus::NewArea => row.status.label().bright_green(),
            RowStatus::New => row.status.label().green(),
            RowStatus::Matched => row.status.label().yellow(),
        };
        let mode = match row.mode {
            ImportMode::Create => row.mode.label().cyan(),
            ImportMode::Update => row.mode.label().magenta(),
        };
        let detail = if row.is_unchanged_update() {
            "no changes".dimmed().to_string()
        } else if row.mode == ImportMode::Update {
            format!("changes: {}", row.changed_fields.join(", "))
        } else {
            String::new()
        };

        println!(
            "  {:>4}  {:<10} {:<8} {} {}",
            row.row_number.to_string().dimmed(),
            status,
            mode,
            row.key,
            detail
        );
    }

    for key in &report.duplicate_keys {
        println!(
            "{} '{}' appears more than once in the input",
            "!".bright_yellow(),
            key
        );
    }

    println!();
    println!(
        "{} to create, {} to update",
        report.create_count.to_string().bright_green(),
        report.update_count.to_string().magenta()
    );
}

pub fn print_summary(summary: &CommitSummary) {
    println!(
        "{} Created {} operations, updated {}, added {} areas",
        "✓".bright_green(),
        summary.created_count,
        summary.updated_count,
        summary.groups_created
    );
}
