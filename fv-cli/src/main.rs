mod cli;
mod serve;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use fv_store::Database;
use fv_telemetry::info;

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine; the environment and flags still apply.
    let dotenv = dotenvy::dotenv().ok();

    let cli = Cli::parse();

    if let Err(e) = fv_telemetry::init_telemetry("futurevalidate", cli.log_format) {
        eprintln!("Failed to initialize telemetry: {}", e);
    }
    if let Some(path) = dotenv {
        info!(path = %path.display(), "loaded environment file");
    }

    let database = Database::connect(&cli.database_url)
        .await
        .with_context(|| format!("failed to open database {}", cli.database_url))?;

    match cli.command {
        Commands::Serve(args) => serve::run_serve(database, args).await,
        Commands::InitDb => {
            database.migrate().await.context("failed to create the database schema")?;
            info!("database initialized");
            Ok(())
        }
    }
}
