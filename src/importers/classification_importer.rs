use calamine::{open_workbook_auto, Data, Range, Reader};
use std::collections::HashMap;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::models::CountyType;

#[derive(Error, Debug)]
pub enum ClassificationImportError {
    #[error("Failed to open workbook: {0}")]
    WorkbookOpen(String),

    #[error("Workbook has no worksheets")]
    SheetNotFound,

    #[error("Missing expected row {0}")]
    MissingRow(usize),

    #[error("Invalid data at row {row}, col {col}: {msg}")]
    InvalidData { row: usize, col: usize, msg: String },

    #[error("Unknown classification at row {row}: {value:?}")]
    UnknownClassification { row: usize, value: String },
}

/// Immutable lookup from a five-digit county key (two-digit state FIPS code
/// followed by the three-digit county FIPS code) to its classification.
#[derive(Debug, Clone, Default)]
pub struct CountyClassificationTable {
    entries: HashMap<String, CountyType>,
}

impl CountyClassificationTable {
    pub fn from_entries<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, CountyType)>,
    {
        Self {
            entries: entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<CountyType> {
        self.entries.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Reads county classifications from the OMB delineation list
/// (format: list1_Sep_2018.xls)
///
/// # Expected Sheet Structure:
/// ```text
/// Rows 0-2: Title, release note, column headers
/// Rows 3-1917: One county per row
///   col 9:  FIPS State Code ("48")
///   col 10: FIPS County Code ("441")
///   col 11: Central/Outlying County ("Central")
/// ```
pub struct ClassificationImporter {
    workbook_path: PathBuf,
    rows: RangeInclusive<usize>,
    state_col: usize,
    county_col: usize,
    classification_col: usize,
}

impl ClassificationImporter {
    pub const DEFAULT_ROWS: RangeInclusive<usize> = 3..=1917;

    pub fn new(workbook_path: impl Into<PathBuf>) -> Self {
        Self {
            workbook_path: workbook_path.into(),
            rows: Self::DEFAULT_ROWS,
            state_col: 9,
            county_col: 10,
            classification_col: 11,
        }
    }

    pub fn with_rows(mut self, rows: RangeInclusive<usize>) -> Self {
        self.rows = rows;
        self
    }

    pub fn with_columns(mut self, state: usize, county: usize, classification: usize) -> Self {
        self.state_col = state;
        self.county_col = county;
        self.classification_col = classification;
        self
    }

    pub fn workbook_path(&self) -> &Path {
        &self.workbook_path
    }

    /// Open the workbook and build the table from its first worksheet.
    ///
    /// This is synchronous, caller should use spawn_blocking. The workbook is
    /// owned by this call and closed on return, whether parsing succeeds or not.
    pub fn import(&self) -> Result<CountyClassificationTable, ClassificationImportError> {
        info!(
            "Started loading county classifications from {}",
            self.workbook_path.display()
        );

        let mut workbook = open_workbook_auto(&self.workbook_path)
            .map_err(|e| ClassificationImportError::WorkbookOpen(e.to_string()))?;

        let range = match workbook.worksheet_range_at(0) {
            Some(Ok(range)) => range,
            Some(Err(e)) => return Err(ClassificationImportError::WorkbookOpen(e.to_string())),
            None => return Err(ClassificationImportError::SheetNotFound),
        };
        drop(workbook);

        self.parse_range(&range)
    }

    /// Build the table from an already loaded worksheet range
    pub fn parse_range(
        &self,
        range: &Range<Data>,
    ) -> Result<CountyClassificationTable, ClassificationImportError> {
        let mut entries = HashMap::with_capacity(self.rows.clone().count());

        for row in self.rows.clone() {
            if !row_in_range(range, row) {
                return Err(ClassificationImportError::MissingRow(row));
            }

            let state_code = self.code_cell(range, row, self.state_col, 2)?;
            let county_code = self.code_cell(range, row, self.county_col, 3)?;
            let raw_type = self.text_cell(range, row, self.classification_col)?;
            let county_type = raw_type.parse::<CountyType>().map_err(|_| {
                ClassificationImportError::UnknownClassification {
                    row,
                    value: raw_type.clone(),
                }
            })?;

            debug!("Adding {}{} -> {}", state_code, county_code, county_type);
            entries.insert(format!("{state_code}{county_code}"), county_type);
        }

        info!("Seeded county classification table with {} records", entries.len());
        Ok(CountyClassificationTable { entries })
    }

    /// FIPS codes are text in the delineation list; numeric cells lost their
    /// leading zeros and are padded back to `width`.
    fn code_cell(
        &self,
        range: &Range<Data>,
        row: usize,
        col: usize,
        width: usize,
    ) -> Result<String, ClassificationImportError> {
        match cell(range, row, col) {
            Some(Data::String(s)) if !s.trim().is_empty() => Ok(s.trim().to_string()),
            Some(Data::Int(i)) => Ok(format!("{i:0width$}")),
            Some(Data::Float(f)) if f.fract() == 0.0 => Ok(format!("{:0width$}", *f as i64)),
            other => Err(ClassificationImportError::InvalidData {
                row,
                col,
                msg: format!("Expected FIPS code, got: {other:?}"),
            }),
        }
    }

    fn text_cell(
        &self,
        range: &Range<Data>,
        row: usize,
        col: usize,
    ) -> Result<String, ClassificationImportError> {
        match cell(range, row, col) {
            Some(Data::String(s)) if !s.trim().is_empty() => Ok(s.clone()),
            other => Err(ClassificationImportError::InvalidData {
                row,
                col,
                msg: format!("Expected text, got: {other:?}"),
            }),
        }
    }
}

/// Cell by absolute sheet position; calamine ranges start at the first used cell.
fn cell(range: &Range<Data>, row: usize, col: usize) -> Option<&Data> {
    range.get_value((row as u32, col as u32))
}

fn row_in_range(range: &Range<Data>, row: usize) -> bool {
    match (range.start(), range.end()) {
        (Some((first, _)), Some((last, _))) => (first as usize..=last as usize).contains(&row),
        _ => false,
    }
}
