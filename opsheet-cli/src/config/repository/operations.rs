//! Reading a processor's operations

use anyhow::{Context, Result};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::import::types::{OperationKind, Record, Snapshot, StoredRecord};

/// Area names of a processor in display order
pub async fn list_area_names(pool: &SqlitePool, processor_id: i64) -> Result<Vec<String>> {
    let names: Vec<String> =
        sqlx::query_scalar("SELECT name FROM areas WHERE processor_id = ? ORDER BY position, name")
            .bind(processor_id)
            .fetch_all(pool)
            .await
            .context("Failed to list areas")?;
    Ok(names)
}

/// Load every operation of a processor, ordered by area then position
pub async fn load_snapshot(pool: &SqlitePool, processor_id: i64) -> Result<Snapshot> {
    let group_order = list_area_names(pool, processor_id).await?;

    let rows = sqlx::query(
        r#"
        SELECT o.id, a.name AS area_name, o.name, o.operation_type, o.prompt, o.description
        FROM operations o
        JOIN areas a ON a.id = o.area_id
        WHERE a.processor_id = ?
        ORDER BY a.position, a.name, o.position, o.created_at
        "#,
    )
    .bind(processor_id)
    .fetch_all(pool)
    .await
    .context("Failed to load operations")?;

    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        let id: String = row.try_get("id")?;
        let name: String = row.try_get("name")?;
        let kind: String = row.try_get("operation_type")?;

        let id = Uuid::parse_str(&id)
            .with_context(|| format!("Invalid id '{}' stored for operation '{}'", id, name))?;
        let kind = OperationKind::parse(&kind)
            .with_context(|| format!("Unknown operation_type '{}' stored for '{}'", kind, name))?;

        records.push(StoredRecord {
            id,
            record: Record::new(
                row.try_get::<String, _>("area_name")?,
                name,
                kind,
                row.try_get::<String, _>("prompt")?,
                row.try_get::<String, _>("description")?,
            ),
        });
    }

    log::debug!(
        "Loaded {} operations in {} areas for processor {}",
        records.len(),
        group_order.len(),
        processor_id
    );

    Ok(Snapshot {
        records,
        group_order,
    })
}
