//! `locations` command

use anyhow::Result;
use colored::*;

use super::open_database;
use crate::cli::LocationCommands;
use crate::config::Config;
use crate::store::locations;

pub async fn handle_location_command(command: LocationCommands, config: &Config) -> Result<()> {
    let pool = open_database(config).await?;

    match command {
        LocationCommands::List => {
            let all = locations::list_locations(&pool).await?;
            if all.is_empty() {
                println!("{}", "No locations yet; import a workbook first".dimmed());
            }
            for summary in all {
                let span = match (summary.first_date, summary.last_date) {
                    (Some(first), Some(last)) => format!("{} .. {}", first, last),
                    _ => "no reports".to_string(),
                };
                println!(
                    "{:>4}  {}  {} reports  {}",
                    summary.location.id,
                    summary.location.name.bright_white().bold(),
                    summary.report_count.to_string().green(),
                    span.dimmed()
                );
            }
        }
    }

    Ok(())
}
