//! `batches` command

use anyhow::Result;
use colored::*;

use super::open_database;
use crate::cli::BatchCommands;
use crate::config::Config;
use crate::store::batches;

pub async fn handle_batch_command(command: BatchCommands, config: &Config) -> Result<()> {
    let pool = open_database(config).await?;

    match command {
        BatchCommands::List => {
            let listing = batches::list_batches(&pool).await?;
            if listing.batches.is_empty() {
                println!("{}", "No import batches".dimmed());
            }
            for batch in &listing.batches {
                println!(
                    "{}  {}  {}  imported {}, current {}",
                    batch.id.cyan(),
                    batch.created_at.dimmed(),
                    batch.file_name.bright_white(),
                    batch.record_count,
                    batch.report_count
                );
            }
            if listing.orphaned_count > 0 {
                println!();
                println!(
                    "{} reports belong to no batch (remove with 'batches purge-orphaned')",
                    listing.orphaned_count.to_string().yellow()
                );
            }
        }
        BatchCommands::Delete { id } => {
            let deleted = batches::delete_batch(&pool, &id).await?;
            println!(
                "Deleted batch {} and {} reports",
                id.cyan(),
                deleted.to_string().red()
            );
        }
        BatchCommands::PurgeOrphaned => {
            let deleted = batches::delete_orphaned_reports(&pool).await?;
            println!("Deleted {} orphaned reports", deleted.to_string().red());
        }
    }

    Ok(())
}
