#![allow(clippy::result_large_err)]

use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use gojo::{
    api,
    config::{self, AppConfig},
    core::maintenance::{self, SeedOutcome},
    errors::Result,
};
use sea_orm::DatabaseConnection;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "gojo", version, about = "Real-estate listing service")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP API
    Serve,
    /// Check that the store is reachable and print a few listings
    Check,
    /// Insert the demo listings from the configuration
    Seed {
        /// Seed even if the store already has listings
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    dotenv().ok();
    let cli = Cli::parse();

    let app_config = config::load_config_or_default(&cli.config)
        .inspect_err(|e| error!("Failed to load configuration: {}", e))?;

    let read_only = matches!(cli.command, Command::Check);
    let db = open_store(&app_config.database.url, read_only).await?;

    match cli.command {
        Command::Serve => api::serve(db, app_config).await,
        Command::Check => run_check(&db).await,
        Command::Seed { force } => run_seed(&db, &app_config, force).await,
    }
}

/// Opens the store. `check` connects read-only; `serve` and `seed` ensure the schema.
async fn open_store(url: &str, read_only: bool) -> Result<DatabaseConnection> {
    let db = if read_only {
        config::connect_read_only(url).await
    } else {
        config::init_database(url).await
    };
    db.inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to open database: {}", e))
}

async fn run_check(db: &DatabaseConnection) -> Result<()> {
    let report = maintenance::check_database(db)
        .await
        .inspect_err(|e| error!("Store check failed: {}", e))?;

    println!("Connected. {} listing(s) in the store.", report.property_count);
    for property in &report.samples {
        println!(
            "  {}  {} ({}, {}) {:.2} [{}]",
            property.id,
            property.title,
            property.city,
            property.listing_type,
            property.price,
            property.status
        );
    }
    Ok(())
}

async fn run_seed(db: &DatabaseConnection, app_config: &AppConfig, force: bool) -> Result<()> {
    if app_config.properties.is_empty() {
        println!("No [[properties]] entries configured, nothing to seed.");
        return Ok(());
    }

    match maintenance::seed_demo_data(db, &app_config.properties, force)
        .await
        .inspect_err(|e| error!("Seeding failed: {}", e))?
    {
        SeedOutcome::Skipped { existing } => println!(
            "The store already has {existing} listing(s). Re-run with --force to seed anyway."
        ),
        SeedOutcome::Inserted { count } => println!("Inserted {count} demo listing(s)."),
    }
    Ok(())
}
