use clap::Parser;
use std::path::PathBuf;

use crate::services::ImportSources;

/// Loads the OMB county delineation list and the Census Bureau CBSA
/// population estimates into Postgres
#[derive(Debug, Clone, Parser)]
#[command(name = "census-data-importer", long_about = None)]
pub struct Config {
    /// Database connection string
    #[arg(long, env)]
    pub database_url: String,

    /// County delineation spreadsheet (list1_Sep_2018.xls)
    #[arg(long, env, default_value = "data/list1_Sep_2018.xls")]
    pub classification_file: PathBuf,

    /// CBSA population estimates (cbsa-est2019-alldata.csv)
    #[arg(long, env, default_value = "data/cbsa-est2019-alldata.csv")]
    pub population_file: PathBuf,

    /// Maximum database connections
    #[arg(long, env, default_value = "5")]
    pub db_max_connections: u32,
}

impl Config {
    pub fn sources(&self) -> ImportSources {
        ImportSources {
            classification_file: self.classification_file.clone(),
            population_file: self.population_file.clone(),
        }
    }
}
