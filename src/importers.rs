// ! Source dataset readers: the county delineation spreadsheet and the CBSA population CSV

pub mod classification_importer;
pub mod population_csv;

// Re-export commonly used items
pub use classification_importer::{
    ClassificationImportError, ClassificationImporter, CountyClassificationTable,
};
pub use population_csv::{
    parse_population_rows, read_population_rows, split_fields, PopulationCsvError, PopulationRow,
};
