use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use census_data_importer::config::Config;
use census_data_importer::db::CbsaRepository;
use census_data_importer::services::CensusImportService;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if it exists (ignore errors if not found)
    dotenvy::dotenv().ok();

    // Initialize tracing with environment filter support
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,census_data_importer=debug")),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_line_number(true),
        )
        .init();

    let config = Config::parse();
    info!(
        classification_file = %config.classification_file.display(),
        population_file = %config.population_file.display(),
        "Starting census data import"
    );

    info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await?;
    info!("Database connection established");

    let service = CensusImportService::new(CbsaRepository::new(pool));

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?,
    );
    spinner.set_message("Importing census data...");
    spinner.enable_steady_tick(Duration::from_millis(120));

    let result = service.run(&config.sources()).await;
    spinner.finish_and_clear();
    let summary = result?;

    info!(
        "Loaded {} county classifications and {} statistical areas ({} stored) in {:.2}s",
        summary.classification_entries,
        summary.statistical_areas,
        summary.stored_records,
        summary.elapsed.as_secs_f64()
    );

    Ok(())
}
