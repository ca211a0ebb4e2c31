use chrono::{Days, Months, NaiveDate};
use std::ops::RangeInclusive;

use super::CensusError;
use crate::importers::PopulationRow;
use crate::models::{EstimateKind, NaturalIncrease, NetMigration, PopulationEstimate, Residual};

pub const ESTIMATE_YEARS: RangeInclusive<i32> = 2010..=2019;

/// First column of the 2010 block (POPESTIMATE2010)
const BASE_OFFSET: usize = 7;

/// Each measure occupies ten adjacent columns, one per year
const YEARS_PER_MEASURE: usize = 10;

/// Column layout of one year's measures, as offsets from the year's first column.
///
/// The file is grouped by measure (POPESTIMATE2010..2019, NPOPCHG2010..2019,
/// BIRTHS..., ...), so within a year consecutive measures are ten columns apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearColumns {
    pub value: usize,
    pub numeric_change: usize,
    pub births: usize,
    pub deaths: usize,
    pub natural_increase: usize,
    pub international_migration: usize,
    pub domestic_migration: usize,
    pub net_migration: usize,
    pub residual: usize,
}

impl YearColumns {
    pub const LAYOUT: YearColumns = YearColumns {
        value: 0,
        numeric_change: YEARS_PER_MEASURE,
        births: 2 * YEARS_PER_MEASURE,
        deaths: 3 * YEARS_PER_MEASURE,
        natural_increase: 4 * YEARS_PER_MEASURE,
        international_migration: 5 * YEARS_PER_MEASURE,
        domestic_migration: 6 * YEARS_PER_MEASURE,
        net_migration: 7 * YEARS_PER_MEASURE,
        residual: 8 * YEARS_PER_MEASURE,
    };

    /// Absolute columns for `year`
    pub fn for_year(year: i32) -> Result<Self, CensusError> {
        let start = column_block_start(year)?;
        let l = Self::LAYOUT;
        Ok(YearColumns {
            value: start + l.value,
            numeric_change: start + l.numeric_change,
            births: start + l.births,
            deaths: start + l.deaths,
            natural_increase: start + l.natural_increase,
            international_migration: start + l.international_migration,
            domestic_migration: start + l.domestic_migration,
            net_migration: start + l.net_migration,
            residual: start + l.residual,
        })
    }
}

pub fn column_block_start(year: i32) -> Result<usize, CensusError> {
    if !ESTIMATE_YEARS.contains(&year) {
        return Err(CensusError::YearOutOfRange(year));
    }
    Ok(BASE_OFFSET + (year - ESTIMATE_YEARS.start()) as usize)
}

/// Census day, the anchor of both the census count and the estimates base
pub fn census_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2010, 4, 1).expect("2010-04-01 is a valid date")
}

/// Start and end of the period an annual estimate's components cover.
///
/// The 2010 estimate covers census day to June 30 (three months); every later
/// estimate covers the preceding July 1 to June 30.
pub fn estimate_period(anchor: NaiveDate, year: i32) -> (NaiveDate, NaiveDate) {
    let months_back = if year == *ESTIMATE_YEARS.start() { 3 } else { 12 };
    let start = anchor - Months::new(months_back);
    let end = anchor - Days::new(1);
    (start, end)
}

fn count(row: &PopulationRow, col: usize) -> Result<i64, CensusError> {
    let token = row.field(col).ok_or(CensusError::MissingColumn {
        line: row.line,
        col,
    })?;
    token
        .trim()
        .parse::<i64>()
        .map_err(|_| CensusError::InvalidNumber {
            line: row.line,
            col,
            value: token.to_string(),
        })
}

/// Decode the July 1 estimate of `year` with its components of change
pub fn decode_annual_estimate(
    row: &PopulationRow,
    year: i32,
) -> Result<PopulationEstimate, CensusError> {
    let cols = YearColumns::for_year(year)?;
    let anchor = NaiveDate::from_ymd_opt(year, 7, 1).ok_or(CensusError::YearOutOfRange(year))?;
    let (period_start, period_end) = estimate_period(anchor, year);

    Ok(PopulationEstimate {
        date: anchor,
        value: count(row, cols.value)?,
        kind: EstimateKind::Annual,
        numeric_change_from_last: Some(count(row, cols.numeric_change)?),
        natural_increase: Some(NaturalIncrease {
            period_start,
            period_end,
            births: count(row, cols.births)?,
            deaths: count(row, cols.deaths)?,
            natural_increase: count(row, cols.natural_increase)?,
        }),
        net_migration: Some(NetMigration {
            period_start,
            period_end,
            international: count(row, cols.international_migration)?,
            domestic: count(row, cols.domestic_migration)?,
            net_migration: count(row, cols.net_migration)?,
        }),
        residual: Some(Residual {
            period_start,
            period_end,
            value: count(row, cols.residual)?,
        }),
    })
}

/// All twelve estimates of a row: census count, estimates base, then 2010-2019.
pub fn decode_population_estimates(
    row: &PopulationRow,
) -> Result<Vec<PopulationEstimate>, CensusError> {
    let mut estimates = Vec::with_capacity(2 + ESTIMATE_YEARS.count());
    estimates.push(PopulationEstimate::point(
        census_date(),
        count(row, PopulationRow::CENSUS_COL)?,
        EstimateKind::Census,
    ));
    estimates.push(PopulationEstimate::point(
        census_date(),
        count(row, PopulationRow::BASE_COL)?,
        EstimateKind::Base,
    ));

    for year in ESTIMATE_YEARS {
        estimates.push(decode_annual_estimate(row, year)?);
    }

    Ok(estimates)
}
