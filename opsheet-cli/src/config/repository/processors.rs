//! Repository for processors

use anyhow::{Context, Result};
use sqlx::{Row, SqlitePool};

/// Summary of a processor (for listing)
#[derive(Debug, Clone)]
pub struct ProcessorSummary {
    pub id: i64,
    pub name: String,
    pub area_count: usize,
    pub operation_count: usize,
}

/// List all processors with their area and operation counts
pub async fn list_processors(pool: &SqlitePool) -> Result<Vec<ProcessorSummary>> {
    let rows = sqlx::query(
        r#"
        SELECT
            p.id,
            p.name,
            (SELECT COUNT(*) FROM areas a WHERE a.processor_id = p.id) AS area_count,
            (SELECT COUNT(*)
               FROM operations o
               JOIN areas a ON a.id = o.area_id
              WHERE a.processor_id = p.id) AS operation_count
        FROM processors p
        ORDER BY p.name
        "#,
    )
    .fetch_all(pool)
    .await
    .context("Failed to list processors")?;

    let mut processors = Vec::new();
    for row in rows {
        processors.push(ProcessorSummary {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            area_count: row.try_get::<i64, _>("area_count")? as usize,
            operation_count: row.try_get::<i64, _>("operation_count")? as usize,
        });
    }

    Ok(processors)
}

/// Look up a processor id by name
pub async fn get_processor_id(pool: &SqlitePool, name: &str) -> Result<Option<i64>> {
    let id: Option<i64> = sqlx::query_scalar("SELECT id FROM processors WHERE name = ?")
        .bind(name)
        .fetch_optional(pool)
        .await
        .with_context(|| format!("Failed to look up processor '{}'", name))?;
    Ok(id)
}

/// Get the id of a processor, creating it if it does not exist yet
pub async fn ensure_processor(pool: &SqlitePool, name: &str) -> Result<i64> {
    let result = sqlx::query("INSERT INTO processors (name) VALUES (?) ON CONFLICT(name) DO NOTHING")
        .bind(name)
        .execute(pool)
        .await
        .with_context(|| format!("Failed to create processor '{}'", name))?;

    if result.rows_affected() > 0 {
        log::info!("Created processor '{}'", name);
    }

    get_processor_id(pool, name)
        .await?
        .with_context(|| format!("Processor '{}' missing after insert", name))
}
