//! `opsheet export`

use anyhow::{Context, Result};
use colored::*;

use crate::cli::{ExportArgs, resolve_processor};
use crate::config::repository::{get_processor_id, load_snapshot};
use crate::config::{Config, connect};
use crate::import::export_snapshot;

pub async fn handle(config: &Config, args: ExportArgs) -> Result<()> {
    let processor = resolve_processor(args.processor, config)?;
    let pool = connect(&config.database_path).await?;

    let processor_id = get_processor_id(&pool, &processor)
        .await?
        .with_context(|| format!("Unknown processor '{}'", processor))?;

    let snapshot = load_snapshot(&pool, processor_id).await?;
    let text = export_snapshot(&snapshot)?;

    match args.output {
        Some(path) => {
            std::fs::write(&path, &text)
                .with_context(|| format!("Failed to write file: {}", path.display()))?;
            eprintln!(
                "{} Exported {} operations to {}",
                "✓".bright_green(),
                snapshot.records.len(),
                path.display().to_string().cyan()
            );
        }
        None => print!("{}", text),
    }

    Ok(())
}
