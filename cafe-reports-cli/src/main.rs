use anyhow::Result;
use clap::Parser;

use cafe_reports::cli::commands::{
    handle_batch_command, handle_import_command, handle_location_command, handle_parse_command,
};
use cafe_reports::cli::{Cli, Commands};
use cafe_reports::config::Config;

fn log_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn,sqlx=warn",
        1 => "info,sqlx=warn",
        2 => "debug,sqlx=info",
        _ => "trace",
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // RUST_LOG wins over -v
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_filter(cli.verbose)))
        .format_timestamp_millis()
        .init();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(path) = cli.database {
        config.database.path = path;
    }
    log::debug!("Using database {}", config.database.path.display());

    match cli.command {
        Commands::Parse(args) => handle_parse_command(args, &config),
        Commands::Import(args) => handle_import_command(args, &config).await,
        Commands::Batches(cmd) => handle_batch_command(cmd, &config).await,
        Commands::Locations(cmd) => handle_location_command(cmd, &config).await,
    }
}
