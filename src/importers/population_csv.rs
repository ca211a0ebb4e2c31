use std::borrow::Cow;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum PopulationCsvError {
    #[error("Failed to read population file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Population file is empty")]
    EmptyFile,
}

/// One data line of the CBSA population estimates file (cbsa-est2019-alldata.csv)
///
/// `line` is the 1-based line number in the source file, kept for error messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopulationRow {
    pub line: usize,
    pub fields: Vec<String>,
}

impl PopulationRow {
    pub const CBSA_COL: usize = 0;
    pub const DIVISION_COL: usize = 1;
    pub const COUNTY_COL: usize = 2;
    pub const TITLE_COL: usize = 3;
    pub const AREA_DESCRIPTION_COL: usize = 4;
    pub const CENSUS_COL: usize = 5;
    pub const BASE_COL: usize = 6;

    pub fn new(line: usize, fields: Vec<String>) -> Self {
        Self { line, fields }
    }

    pub fn field(&self, col: usize) -> Option<&str> {
        self.fields.get(col).map(String::as_str)
    }

    /// Missing columns read as blank so that short rows classify as area rows
    /// and fail later on the first column they actually need.
    fn marker(&self, col: usize) -> &str {
        self.field(col).unwrap_or("")
    }

    pub fn cbsa_code(&self) -> &str {
        self.marker(Self::CBSA_COL)
    }

    pub fn division_code(&self) -> &str {
        self.marker(Self::DIVISION_COL)
    }

    pub fn county_code(&self) -> &str {
        self.marker(Self::COUNTY_COL)
    }

    pub fn has_division_code(&self) -> bool {
        !self.division_code().trim().is_empty()
    }

    pub fn has_county_code(&self) -> bool {
        !self.county_code().trim().is_empty()
    }
}

/// Read and split every data line of the population estimates file.
///
/// The Census Bureau publishes this file in a Windows-1252 / Latin-1 encoding
/// ("Cañon City, CO"), so content that isn't valid UTF-8 is decoded as
/// Windows-1252.
pub fn read_population_rows(path: impl AsRef<Path>) -> Result<Vec<PopulationRow>, PopulationCsvError> {
    let path = path.as_ref();
    info!("Reading population estimates from {}", path.display());

    let bytes = std::fs::read(path)?;
    let text = decode_content(&bytes);
    parse_population_rows(&text)
}

/// UTF-8 when valid, otherwise Windows-1252 (the WHATWG superset of Latin-1)
pub fn decode_content(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => {
            warn!("Population file is not valid UTF-8, decoding as windows-1252");
            let (text, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            text
        }
    }
}

/// Split population CSV text into rows, discarding the header line.
pub fn parse_population_rows(text: &str) -> Result<Vec<PopulationRow>, PopulationCsvError> {
    let mut lines = text.lines().enumerate();
    if lines.next().is_none() {
        return Err(PopulationCsvError::EmptyFile);
    }

    let rows: Vec<PopulationRow> = lines
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| PopulationRow::new(idx + 1, split_fields(&line.replace('"', ""))))
        .collect();

    debug!("Split {} population rows", rows.len());
    Ok(rows)
}

/// Split a line on every comma that is not immediately followed by a space.
///
/// Quote characters are expected to be stripped already. Titles such as
/// "Urban Honolulu, HI" keep their comma because it is followed by a space; a
/// quoted value containing ",X" is split, which the Census file never does.
pub fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if c == ',' && chars.peek() != Some(&' ') {
            fields.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
    }
    fields.push(current);

    fields
}
