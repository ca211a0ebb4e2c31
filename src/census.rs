// Census module
//
// Turns decoded population rows into nested statistical-area documents:
// - row_groups: splits rows into areas, divisions and counties
// - time_series: decodes the 2010-2019 estimate columns of one row
// - assembler: joins divisions and counties back to their area

pub mod assembler;
pub mod row_groups;
pub mod time_series;

pub use assembler::{assemble_statistical_areas, build_statistical_areas};
pub use row_groups::RowGroups;
pub use time_series::{decode_annual_estimate, decode_population_estimates, YearColumns};

/// Decode and assembly errors. All of them abort the import.
#[derive(Debug, thiserror::Error)]
pub enum CensusError {
    #[error("Line {line}: missing column {col}")]
    MissingColumn { line: usize, col: usize },

    #[error("Line {line}, column {col}: cannot parse count {value:?}")]
    InvalidNumber {
        line: usize,
        col: usize,
        value: String,
    },

    #[error("Year {0} is outside the 2010-2019 estimates")]
    YearOutOfRange(i32),

    #[error("Line {line}: no classification for county {key}")]
    UnknownCounty { line: usize, key: String },

    #[error("Line {line}: county division {division} matches no division of CBSA {cbsa}")]
    UnmatchedDivision {
        line: usize,
        cbsa: String,
        division: String,
    },

    #[error("Line {line}: CBSA {cbsa} has neither divisions nor counties")]
    EmptyArea { line: usize, cbsa: String },
}
