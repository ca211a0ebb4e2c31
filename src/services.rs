pub mod census_import_service;

pub use census_import_service::{
    decode_sources, CensusImportService, DecodedCensusData, ImportError, ImportSources,
    ImportSummary,
};
