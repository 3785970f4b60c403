//! Command handlers

pub mod batches;
pub mod import;
pub mod locations;
pub mod parse;

use std::path::Path;

use anyhow::{Context, Result};
use sqlx::SqlitePool;

use crate::config::Config;

pub use batches::handle_batch_command;
pub use import::handle_import_command;
pub use locations::handle_location_command;
pub use parse::handle_parse_command;

/// Read a workbook file into memory
pub(crate) fn read_workbook_file(path: &Path) -> Result<Vec<u8>> {
    if !path.exists() {
        anyhow::bail!("File does not exist: {}", path.display());
    }
    std::fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))
}

/// Open the configured database
pub(crate) async fn open_database(config: &Config) -> Result<SqlitePool> {
    crate::store::connect(&config.database.path).await
}

/// Format seconds as `m:ss`
pub(crate) fn format_seconds(seconds: i64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_seconds() {
        assert_eq!(format_seconds(191), "3:11");
        assert_eq!(format_seconds(0), "0:00");
        assert_eq!(format_seconds(1640), "27:20");
    }

    #[test]
    fn test_missing_file() {
        assert!(read_workbook_file(Path::new("/nonexistent/report.xlsx")).is_err());
    }
}
