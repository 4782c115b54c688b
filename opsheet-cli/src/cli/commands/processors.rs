//! `opsheet processors`

use anyhow::Result;
use colored::*;

use crate::config::repository::list_processors;
use crate::config::{Config, connect};

pub async fn handle(config: &Config) -> Result<()> {
    let pool = connect(&config.database_path).await?;
    let processors = list_processors(&pool).await?;

    if processors.is_empty() {
        println!("No processors yet. Import a TSV file with --processor to create one.");
        return Ok(());
    }

    println!("{:<32} {:>6} {:>10}", "Processor".bold(), "Areas".bold(), "Operations".bold());
    for processor in processors {
        println!(
            "{:<32} {:>6} {:>10}",
            processor.name.bright_white(),
            processor.area_count,
            processor.operation_count
        );
    }

    Ok(())
}
