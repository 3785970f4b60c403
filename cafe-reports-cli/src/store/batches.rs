//! Import batch repository
//!
//! Every import run gets a batch; reports point at the batch that last wrote
//! them, so a bad import can be rolled back by deleting its batch.

use anyhow::{Context, Result, bail};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// A recorded import run
#[derive(Debug, Clone)]
pub struct ImportBatch {
    pub id: String,
    pub file_name: String,
    pub record_count: i64,
    pub created_at: String,
    /// Reports currently attributed to this batch
    pub report_count: i64,
}

/// All batches plus the number of reports no batch owns
#[derive(Debug, Clone)]
pub struct BatchListing {
    pub batches: Vec<ImportBatch>,
    pub orphaned_count: i64,
}

/// Create a batch for an import of `file_name`, returning its id
pub async fn create_batch(pool: &SqlitePool, file_name: &str) -> Result<String> {
    let id = Uuid::new_v4().to_string();

    sqlx::query("INSERT INTO import_batches (id, file_name) VALUES (?, ?)")
        .bind(&id)
        .bind(file_name)
        .execute(pool)
        .await
        .context("Failed to create import batch")?;

    Ok(id)
}

/// Record how many reports the batch imported
pub async fn set_batch_record_count(pool: &SqlitePool, id: &str, record_count: i64) -> Result<()> {
    sqlx::query("UPDATE import_batches SET record_count = ? WHERE id = ?")
        .bind(record_count)
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to update import batch")?;

    Ok(())
}

/// List batches, newest first
pub async fn list_batches(pool: &SqlitePool) -> Result<BatchListing> {
    let rows = sqlx::query(
        r#"
        SELECT
            b.id,
            b.file_name,
            b.record_count,
            b.created_at,
            COUNT(r.id) AS report_count
        FROM import_batches b
        LEFT JOIN daily_reports r ON r.import_batch_id = b.id
        GROUP BY b.id
        ORDER BY b.created_at DESC, b.rowid DESC
        "#,
    )
    .fetch_all(pool)
    .await
    .context("Failed to list import batches")?;

    let mut batches = Vec::new();
    for row in rows {
        batches.push(ImportBatch {
            id: row.try_get("id")?,
            file_name: row.try_get("file_name")?,
            record_count: row.try_get("record_count")?,
            created_at: row.try_get("created_at")?,
            report_count: row.try_get("report_count")?,
        });
    }

    let orphaned: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM daily_reports WHERE import_batch_id IS NULL")
            .fetch_one(pool)
            .await
            .context("Failed to count orphaned reports")?;

    Ok(BatchListing {
        batches,
        orphaned_count: orphaned.0,
    })
}

/// Delete a batch and every report attributed to it.
///
/// Returns the number of deleted reports.
pub async fn delete_batch(pool: &SqlitePool, id: &str) -> Result<u64> {
    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    let exists: Option<(String,)> = sqlx::query_as("SELECT id FROM import_batches WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .context("Failed to look up import batch")?;
    if exists.is_none() {
        bail!("Import batch not found: {}", id);
    }

    let deleted = sqlx::query("DELETE FROM daily_reports WHERE import_batch_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await
        .context("Failed to delete batch reports")?
        .rows_affected();

    sqlx::query("DELETE FROM import_batches WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await
        .context("Failed to delete import batch")?;

    tx.commit().await.context("Failed to commit batch deletion")?;

    Ok(deleted)
}

/// Delete reports that no batch owns (imported before batches existed)
pub async fn delete_orphaned_reports(pool: &SqlitePool) -> Result<u64> {
    let result = sqlx::query("DELETE FROM daily_reports WHERE import_batch_id IS NULL")
        .execute(pool)
        .await
        .context("Failed to delete orphaned reports")?;

    Ok(result.rows_affected())
}
