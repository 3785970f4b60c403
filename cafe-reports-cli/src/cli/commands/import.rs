//! `import` command

use anyhow::{Context, Result};
use colored::*;

use super::{open_database, read_workbook_file};
use crate::cli::ImportArgs;
use crate::config::Config;
use crate::import::{ImportSummary, import_workbook, validate_upload};

pub async fn handle_import_command(args: ImportArgs, config: &Config) -> Result<()> {
    let file_name = args
        .file
        .file_name()
        .and_then(|n| n.to_str())
        .context("File path has no file name")?
        .to_string();

    let size = std::fs::metadata(&args.file)
        .with_context(|| format!("Failed to read file: {}", args.file.display()))?
        .len();
    validate_upload(&file_name, size, config.import.max_file_size)?;

    let buffer = read_workbook_file(&args.file)?;
    let pool = open_database(config).await?;
    let options = config.parser.parse_options();

    let summary = import_workbook(&pool, &file_name, &buffer, &options).await?;

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("Failed to serialize summary")?
        );
    } else {
        print_summary(&summary);
    }

    Ok(())
}

fn print_summary(summary: &ImportSummary) {
    println!("Batch: {}", summary.batch_id.cyan());
    println!();

    for sheet in &summary.sheets {
        let status = if !sheet.errors.is_empty() {
            "!".red().bold()
        } else if sheet.imported == 0 {
            "-".yellow()
        } else {
            "✓".green()
        };
        println!(
            "{} {}: imported {}, skipped {}, errors {}",
            status,
            sheet.sheet_name.bright_white().bold(),
            sheet.imported.to_string().green(),
            sheet.skipped.to_string().yellow(),
            sheet.errors.len().to_string().red()
        );
        for error in &sheet.errors {
            println!("    {}", error.red());
        }
    }

    println!();
    println!(
        "Total: imported {}, skipped {}, errors {}",
        summary.total_imported.to_string().green().bold(),
        summary.total_skipped.to_string().yellow(),
        summary.total_errors.to_string().red()
    );
}
