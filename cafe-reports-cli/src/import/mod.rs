//! Workbook import: parse, then persist rows per location
//!
//! Each sheet maps to a location (created on first sight). Every parsed row
//! is upserted by (location, date); a row that fails to persist is recorded
//! against its sheet and the import carries on.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::store::{batches, locations, reports};
use crate::workbook::{ParseOptions, parse_workbook};

const ACCEPTED_EXTENSIONS: [&str; 2] = ["xlsx", "xls"];

/// Outcome of importing one sheet
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetResult {
    pub sheet_name: String,
    pub imported: usize,
    pub skipped: usize,
    /// `YYYY-MM-DD: message` per row that failed to persist
    pub errors: Vec<String>,
}

/// Outcome of a whole import
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub batch_id: String,
    pub sheets: Vec<SheetResult>,
    pub total_imported: usize,
    pub total_skipped: usize,
    pub total_errors: usize,
    pub sheet_names: Vec<String>,
}

/// Check the upload name and size before reading it
pub fn validate_upload(file_name: &str, size: u64, max_size: u64) -> Result<()> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());

    match extension {
        Some(ext) if ACCEPTED_EXTENSIONS.contains(&ext.as_str()) => {}
        _ => bail!("File must be an Excel workbook (.xlsx or .xls): {}", file_name),
    }

    if size > max_size {
        bail!(
            "File is too large: {} bytes (max {} MB)",
            size,
            max_size / (1024 * 1024)
        );
    }

    Ok(())
}

/// Parse `buffer` and store its rows under a new import batch
pub async fn import_workbook(
    pool: &SqlitePool,
    file_name: &str,
    buffer: &[u8],
    options: &ParseOptions,
) -> Result<ImportSummary> {
    let started_at = Instant::now();
    let mut parsed = parse_workbook(buffer, options)
        .with_context(|| format!("Failed to parse workbook: {}", file_name))?;

    log::info!(
        "Parsed {}: sheets [{}], window {}",
        file_name,
        parsed.sheet_names.join(", "),
        options.year_window
    );

    let batch_id = batches::create_batch(pool, file_name).await?;
    let mut summary = ImportSummary {
        batch_id: batch_id.clone(),
        sheet_names: parsed.sheet_names.clone(),
        ..ImportSummary::default()
    };

    for sheet_name in &parsed.sheet_names {
        let rows = parsed.rows_by_sheet.remove(sheet_name).unwrap_or_default();
        let mut result = SheetResult {
            sheet_name: sheet_name.clone(),
            skipped: parsed.skipped(sheet_name),
            ..SheetResult::default()
        };

        let location = locations::find_or_create_location(pool, sheet_name).await?;

        for row in &rows {
            match reports::upsert_daily_report(pool, location.id, Some(&batch_id), row).await {
                Ok(()) => result.imported += 1,
                Err(e) => {
                    log::warn!("Sheet '{}', {}: {:#}", sheet_name, row.date, e);
                    result.errors.push(format!("{}: {:#}", row.date.format("%Y-%m-%d"), e));
                }
            }
        }

        log::info!(
            "Sheet '{}': imported {}, skipped {}, errors {}",
            sheet_name,
            result.imported,
            result.skipped,
            result.errors.len()
        );
        summary.sheets.push(result);
    }

    summary.total_imported = summary.sheets.iter().map(|s| s.imported).sum();
    summary.total_skipped = summary.sheets.iter().map(|s| s.skipped).sum();
    summary.total_errors = summary.sheets.iter().map(|s| s.errors.len()).sum();

    batches::set_batch_record_count(pool, &batch_id, summary.total_imported as i64).await?;

    log::info!(
        "Import of {} finished: imported={}, skipped={}, errors={}, elapsed_ms={}",
        file_name,
        summary.total_imported,
        summary.total_skipped,
        summary.total_errors,
        started_at.elapsed().as_millis()
    );

    Ok(summary)
}
