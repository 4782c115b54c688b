//! SQLite-backed store used by imports

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use uuid::Uuid;

use super::operations::load_snapshot;
use super::processors::ensure_processor;
use crate::import::types::Snapshot;
use crate::import::{CommitSummary, ImportError, ImportPlan, OperationStore};

/// Operations of one processor, stored in SQLite.
///
/// A commit runs in a single transaction, so it either lands completely or
/// not at all.
#[derive(Debug, Clone)]
pub struct SqliteOperationStore {
    pool: SqlitePool,
    processor_id: i64,
}

impl SqliteOperationStore {
    /// Create a new store for an existing processor
    pub fn new(pool: SqlitePool, processor_id: i64) -> Self {
        SqliteOperationStore { pool, processor_id }
    }

    /// Store for the named processor, creating the processor if needed
    pub async fn for_processor(pool: SqlitePool, name: &str) -> Result<Self> {
        let processor_id = ensure_processor(&pool, name).await?;
        Ok(Self::new(pool, processor_id))
    }
}

#[async_trait]
impl OperationStore for SqliteOperationStore {
    async fn load_snapshot(&self) -> Result<Snapshot, ImportError> {
        load_snapshot(&self.pool, self.processor_id)
            .await
            .map_err(ImportError::store)
    }

    async fn commit(&self, plan: &ImportPlan) -> Result<CommitSummary, ImportError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(store_err("Failed to start transaction"))?;

        // Dropping the transaction on error rolls it back
        let summary = apply_plan(&mut tx, self.processor_id, plan).await?;

        tx.commit()
            .await
            .map_err(store_err("Failed to commit transaction"))?;

        log::debug!(
            "Committed {} creates and {} updates for processor {}",
            summary.created_count,
            summary.updated_count,
            self.processor_id
        );
        Ok(summary)
    }
}

fn store_err(context: &'static str) -> impl FnOnce(sqlx::Error) -> ImportError {
    move |e| ImportError::Store(format!("{}: {}", context, e))
}

async fn apply_plan(
    conn: &mut SqliteConnection,
    processor_id: i64,
    plan: &ImportPlan,
) -> Result<CommitSummary, ImportError> {
    let mut summary = CommitSummary::default();
    let mut areas: HashMap<String, Uuid> = HashMap::new();
    let now = Utc::now().to_rfc3339();

    for group in &plan.new_groups {
        let (id, created) = ensure_area(conn, processor_id, group).await?;
        if created {
            summary.groups_created += 1;
        }
        areas.insert(group.clone(), id);
    }

    for create in &plan.creates {
        let record = &create.record;
        let area_id = match areas.get(&record.group) {
            Some(id) => *id,
            None => {
                let (id, created) = ensure_area(conn, processor_id, &record.group).await?;
                if created {
                    summary.groups_created += 1;
                }
                areas.insert(record.group.clone(), id);
                id
            }
        };

        let position: i64 = sqlx::query_scalar(
            "SELECT COALESCE(MAX(position), -1) + 1 FROM operations WHERE area_id = ?",
        )
        .bind(area_id.to_string())
        .fetch_one(&mut *conn)
        .await
        .map_err(store_err("Failed to read operation positions"))?;

        sqlx::query(
            r#"
            INSERT INTO operations
                (id, area_id, name, operation_type, prompt, description, position, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(area_id.to_string())
        .bind(&record.name)
        .bind(record.kind.as_str())
        .bind(&record.prompt)
        .bind(&record.description)
        .bind(position)
        .bind(&now)
        .bind(&now)
        .execute(&mut *conn)
        .await
        .map_err(|e| ImportError::Store(format!("Failed to create '{}': {}", record.key(), e)))?;

        summary.created_count += 1;
    }

    for update in &plan.updates {
        let record = &update.record;
        let result = sqlx::query(
            r#"
            UPDATE operations
            SET operation_type = ?, prompt = ?, description = ?, updated_at = ?
            WHERE id = ?
              AND area_id IN (SELECT id FROM areas WHERE processor_id = ?)
            "#,
        )
        .bind(record.kind.as_str())
        .bind(&record.prompt)
        .bind(&record.description)
        .bind(&now)
        .bind(update.id.to_string())
        .bind(processor_id)
        .execute(&mut *conn)
        .await
        .map_err(|e| ImportError::Store(format!("Failed to update '{}': {}", record.key(), e)))?;

        if result.rows_affected() == 0 {
            return Err(ImportError::Conflict {
                key: record.key(),
                id: update.id,
            });
        }
        summary.updated_count += 1;
    }

    Ok(summary)
}

/// Id of the named area, creating it at the end of the area list if missing
async fn ensure_area(
    conn: &mut SqliteConnection,
    processor_id: i64,
    name: &str,
) -> Result<(Uuid, bool), ImportError> {
    let existing: Option<String> =
        sqlx::query_scalar("SELECT id FROM areas WHERE processor_id = ? AND name = ?")
            .bind(processor_id)
            .bind(name)
            .fetch_optional(&mut *conn)
            .await
            .map_err(store_err("Failed to look up area"))?;

    if let Some(id) = existing {
        let id = Uuid::parse_str(&id)
            .map_err(|e| ImportError::Store(format!("Invalid id stored for area '{}': {}", name, e)))?;
        return Ok((id, false));
    }

    let position: i64 = sqlx::query_scalar(
        "SELECT COALESCE(MAX(position), -1) + 1 FROM areas WHERE processor_id = ?",
    )
    .bind(processor_id)
    .fetch_one(&mut *conn)
    .await
    .map_err(store_err("Failed to read area positions"))?;

    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO areas (id, processor_id, name, position) VALUES (?, ?, ?, ?)")
        .bind(id.to_string())
        .bind(processor_id)
        .bind(name)
        .bind(position)
        .execute(&mut *conn)
        .await
        .map_err(|e| ImportError::Store(format!("Failed to create area '{}': {}", name, e)))?;

    log::info!("Created area '{}'", name);
    Ok((id, true))
}
