use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{info, instrument};

use crate::census::{build_statistical_areas, CensusError};
use crate::db::{CbsaRepository, DbError};
use crate::importers::{
    read_population_rows, ClassificationImportError, ClassificationImporter, PopulationCsvError,
};
use crate::models::CoreBasedStatisticalArea;

/// Error types for census import operations
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("Classification import failed: {0}")]
    Classification(#[from] ClassificationImportError),

    #[error("Population file failed: {0}")]
    PopulationFile(#[from] PopulationCsvError),

    #[error("Decoding failed: {0}")]
    Decode(#[from] CensusError),

    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Import task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Locations of the two source datasets
#[derive(Debug, Clone)]
pub struct ImportSources {
    pub classification_file: PathBuf,
    pub population_file: PathBuf,
}

/// Everything decoded from the sources, ready to persist
#[derive(Debug, Clone)]
pub struct DecodedCensusData {
    pub classification_entries: usize,
    pub statistical_areas: Vec<CoreBasedStatisticalArea>,
}

#[derive(Debug, Clone)]
pub struct ImportSummary {
    pub classification_entries: usize,
    pub statistical_areas: usize,
    pub stored_records: i64,
    pub elapsed: Duration,
}

/// Decode both datasets into statistical areas.
///
/// The classification table must be complete before any county is assembled,
/// so it is built first and passed by reference into assembly.
pub fn decode_sources(sources: &ImportSources) -> Result<DecodedCensusData, ImportError> {
    let start = Instant::now();
    let classifications = ClassificationImporter::new(&sources.classification_file).import()?;
    info!(
        "Seeded county map with {} records in {} ms",
        classifications.len(),
        start.elapsed().as_millis()
    );

    let start = Instant::now();
    let rows = read_population_rows(&sources.population_file)?;
    let statistical_areas = build_statistical_areas(&rows, &classifications)?;
    info!(
        "Decoded {} statistical areas from {} rows in {} ms",
        statistical_areas.len(),
        rows.len(),
        start.elapsed().as_millis()
    );

    Ok(DecodedCensusData {
        classification_entries: classifications.len(),
        statistical_areas,
    })
}

/// Service that loads the census datasets into the statistical area store
#[derive(Clone)]
pub struct CensusImportService {
    repo: CbsaRepository,
}

impl CensusImportService {
    pub fn new(repo: CbsaRepository) -> Self {
        Self { repo }
    }

    /// Run the full import:
    /// 1. Build the county classification table
    /// 2. Decode the population file and assemble all statistical areas
    /// 3. Replace the stored areas with the new batch
    ///
    /// Any decode error aborts before the store is touched.
    #[instrument(skip(self, sources))]
    pub async fn run(&self, sources: &ImportSources) -> Result<ImportSummary, ImportError> {
        let start_time = Instant::now();
        info!("Started loading census data");

        // calamine and the CSV decode are synchronous
        let blocking_sources = sources.clone();
        let decoded = tokio::task::spawn_blocking(move || decode_sources(&blocking_sources)).await??;

        let inserted = self.repo.replace_all(&decoded.statistical_areas).await?;
        let stored_records = self.repo.count().await?;

        let elapsed = start_time.elapsed();
        info!(
            inserted,
            "Finished seeding database with {} records in {} ms",
            stored_records,
            elapsed.as_millis()
        );

        Ok(ImportSummary {
            classification_entries: decoded.classification_entries,
            statistical_areas: decoded.statistical_areas.len(),
            stored_records,
            elapsed,
        })
    }
}
