//! `parse` command: show what a workbook would import

use std::io::Write;

use anyhow::{Context, Result, bail};
use colored::*;

use super::{format_seconds, read_workbook_file};
use crate::cli::{OutputFormat, ParseArgs};
use crate::config::Config;
use crate::workbook::{ParsedRow, ParsedWorkbook, parse_workbook};

pub fn handle_parse_command(args: ParseArgs, config: &Config) -> Result<()> {
    let buffer = read_workbook_file(&args.file)?;
    let options = config.parser.parse_options();
    let mut parsed = parse_workbook(&buffer, &options)
        .with_context(|| format!("Failed to parse workbook: {}", args.file.display()))?;

    if let Some(ref sheet) = args.sheet {
        retain_sheet(&mut parsed, sheet)?;
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match args.format {
        OutputFormat::Table => print_table(&parsed, &options.year_window.to_string()),
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, &parsed).context("Failed to write JSON")?;
            writeln!(out)?;
        }
        OutputFormat::Csv => {
            let sheet = single_sheet(&parsed)?;
            write_csv(&mut out, parsed.rows(&sheet))?;
        }
    }

    Ok(())
}

/// Keep only `sheet` in the parse result
fn retain_sheet(parsed: &mut ParsedWorkbook, sheet: &str) -> Result<()> {
    if !parsed.sheet_names.iter().any(|s| s == sheet) {
        bail!(
            "Sheet '{}' not found. Available sheets: {}",
            sheet,
            parsed.sheet_names.join(", ")
        );
    }
    parsed.sheet_names.retain(|s| s == sheet);
    parsed.rows_by_sheet.retain(|s, _| s == sheet);
    parsed.skipped_by_sheet.retain(|s, _| s == sheet);
    Ok(())
}

fn single_sheet(parsed: &ParsedWorkbook) -> Result<String> {
    match parsed.sheet_names.as_slice() {
        [only] => Ok(only.clone()),
        [] => bail!("Workbook has no sheets"),
        _ => bail!(
            "CSV output covers one sheet; pick one with --sheet ({})",
            parsed.sheet_names.join(", ")
        ),
    }
}

/// Write rows as CSV with a header line
pub fn write_csv<W: Write>(writer: W, rows: &[ParsedRow]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in rows {
        wtr.serialize(row).context("Failed to write CSV row")?;
    }
    wtr.flush().context("Failed to flush CSV output")?;
    Ok(())
}

fn print_table(parsed: &ParsedWorkbook, window: &str) {
    println!("Year window: {}", window.cyan());

    for sheet in &parsed.sheet_names {
        let rows = parsed.rows(sheet);
        println!();
        println!(
            "{} {} rows, {} skipped",
            sheet.bright_white().bold(),
            rows.len().to_string().green(),
            parsed.skipped(sheet).to_string().yellow()
        );

        if rows.is_empty() {
            continue;
        }

        println!(
            "  {:<10}  {:>12}  {:>12}  {:>7}  {:>9}  {:>8}",
            "date".dimmed(),
            "sales plan".dimmed(),
            "sales fact".dimmed(),
            "orders".dimmed(),
            "avg check".dimmed(),
            "delivery".dimmed()
        );
        for row in rows {
            println!(
                "  {:<10}  {:>12.2}  {:>12.2}  {:>7}  {:>9.2}  {:>8}",
                row.date.to_string(),
                row.sales_plan,
                row.sales_fact,
                row.orders_fact,
                row.avg_check_fact,
                format_seconds(row.order_delivery_time)
            );
        }
    }

    println!();
    println!(
        "Total: {} rows, {} skipped",
        parsed.total_rows().to_string().green().bold(),
        parsed.total_skipped().to_string().yellow()
    );
}
