use tracing::{debug, info};

use super::row_groups::RowGroups;
use super::time_series::decode_population_estimates;
use super::CensusError;
use crate::importers::{CountyClassificationTable, PopulationRow};
use crate::models::{
    AreaComponents, CoreBasedStatisticalArea, CountyOrEquivalent, MetropolitanDivision,
    StatisticalAreaType,
};

/// Partition `rows` and assemble every statistical area, in input order.
pub fn build_statistical_areas(
    rows: &[PopulationRow],
    classifications: &CountyClassificationTable,
) -> Result<Vec<CoreBasedStatisticalArea>, CensusError> {
    let groups = RowGroups::partition(rows);
    assemble_statistical_areas(&groups, classifications)
}

pub fn assemble_statistical_areas(
    groups: &RowGroups<'_>,
    classifications: &CountyClassificationTable,
) -> Result<Vec<CoreBasedStatisticalArea>, CensusError> {
    let areas = groups
        .areas
        .iter()
        .map(|row| assemble_area(row, groups, classifications))
        .collect::<Result<Vec<_>, _>>()?;

    info!("Assembled {} core based statistical areas", areas.len());
    Ok(areas)
}

fn text(row: &PopulationRow, col: usize) -> Result<String, CensusError> {
    row.field(col)
        .map(str::to_string)
        .ok_or(CensusError::MissingColumn {
            line: row.line,
            col,
        })
}

pub fn area_type(row: &PopulationRow) -> Result<StatisticalAreaType, CensusError> {
    let description = text(row, PopulationRow::AREA_DESCRIPTION_COL)?;
    Ok(if description.contains("Metropolitan") {
        StatisticalAreaType::Metropolitan
    } else {
        StatisticalAreaType::Micropolitan
    })
}

fn assemble_area(
    row: &PopulationRow,
    groups: &RowGroups<'_>,
    classifications: &CountyClassificationTable,
) -> Result<CoreBasedStatisticalArea, CensusError> {
    let code = row.cbsa_code().to_string();
    let divisions = groups.divisions_of(&code);
    let counties = groups.counties_of(&code);

    let components = if !divisions.is_empty() {
        for county in counties {
            if !divisions
                .iter()
                .any(|d| d.division_code() == county.division_code())
            {
                return Err(CensusError::UnmatchedDivision {
                    line: county.line,
                    cbsa: code,
                    division: county.division_code().to_string(),
                });
            }
        }

        AreaComponents::Divisions(
            divisions
                .iter()
                .map(|division| assemble_division(division, counties, classifications))
                .collect::<Result<_, _>>()?,
        )
    } else if !counties.is_empty() {
        AreaComponents::Counties(
            counties
                .iter()
                .map(|county| assemble_county(county, classifications))
                .collect::<Result<_, _>>()?,
        )
    } else {
        return Err(CensusError::EmptyArea {
            line: row.line,
            cbsa: code,
        });
    };

    debug!(cbsa = %code, "Assembled statistical area");

    Ok(CoreBasedStatisticalArea {
        title: text(row, PopulationRow::TITLE_COL)?,
        population_estimates: decode_population_estimates(row)?,
        area_type: area_type(row)?,
        components,
        code,
    })
}

/// Attaches the counties whose division code equals this division's own code
fn assemble_division(
    row: &PopulationRow,
    area_counties: &[&PopulationRow],
    classifications: &CountyClassificationTable,
) -> Result<MetropolitanDivision, CensusError> {
    let counties = area_counties
        .iter()
        .filter(|county| county.division_code() == row.division_code())
        .map(|county| assemble_county(county, classifications))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(MetropolitanDivision {
        code: row.division_code().to_string(),
        title: text(row, PopulationRow::TITLE_COL)?,
        population_estimates: decode_population_estimates(row)?,
        counties,
    })
}

fn assemble_county(
    row: &PopulationRow,
    classifications: &CountyClassificationTable,
) -> Result<CountyOrEquivalent, CensusError> {
    let code = row.county_code().to_string();
    let county_type = classifications
        .get(&code)
        .ok_or_else(|| CensusError::UnknownCounty {
            line: row.line,
            key: code.clone(),
        })?;

    Ok(CountyOrEquivalent {
        title: text(row, PopulationRow::TITLE_COL)?,
        population_estimates: decode_population_estimates(row)?,
        county_type,
        code,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CountyType;

    fn row(line: usize, cbsa: &str, division: &str, county: &str, lsad: &str) -> PopulationRow {
        let mut fields = vec![
            cbsa.to_string(),
            division.to_string(),
            county.to_string(),
            format!("Row {line}"),
            lsad.to_string(),
        ];
        fields.extend((5..97).map(|i| (i * 100 + line).to_string()));
        PopulationRow::new(line, fields)
    }

    fn table() -> CountyClassificationTable {
        CountyClassificationTable::from_entries([
            ("48059", CountyType::Outlying),
            ("48441", CountyType::Central),
        ])
    }

    #[test]
    fn test_area_type_from_description() {
        let metro = row(2, "10180", "", "", "Metropolitan Statistical Area");
        let micro = row(3, "10220", "", "", "Micropolitan Statistical Area");
        assert_eq!(area_type(&metro).unwrap(), StatisticalAreaType::Metropolitan);
        assert_eq!(area_type(&micro).unwrap(), StatisticalAreaType::Micropolitan);
    }

    #[test]
    fn test_area_with_counties() {
        let rows = vec![
            row(2, "10180", "", "", "Metropolitan Statistical Area"),
            row(3, "10180", "", "48059", "County or equivalent"),
            row(4, "10180", "", "48441", "County or equivalent"),
        ];
        let areas = build_statistical_areas(&rows, &table()).unwrap();

        assert_eq!(areas.len(), 1);
        let area = &areas[0];
        assert_eq!(area.code, "10180");
        assert_eq!(area.title, "Row 2");
        assert_eq!(area.population_estimates[0].value, 502);
        assert!(area.divisions().is_empty());

        let codes: Vec<&str> = area.counties().iter().map(|c| c.code.as_str()).collect();
        assert_eq!(codes, vec!["48059", "48441"]);
        assert_eq!(area.counties()[0].county_type, CountyType::Outlying);
        assert_eq!(area.counties()[1].population_estimates.len(), 12);
    }

    #[test]
    fn test_missing_classification_is_fatal() {
        let rows = vec![
            row(2, "10180", "", "", "Metropolitan Statistical Area"),
            row(3, "10180", "", "48253", "County or equivalent"),
        ];
        let err = build_statistical_areas(&rows, &table()).unwrap_err();
        match err {
            CensusError::UnknownCounty { line, key } => {
                assert_eq!(line, 3);
                assert_eq!(key, "48253");
            }
            other => panic!("Expected UnknownCounty, got {other:?}"),
        }
    }

    #[test]
    fn test_county_with_unmatched_division_is_fatal() {
        let rows = vec![
            row(2, "14460", "", "", "Metropolitan Statistical Area"),
            row(3, "14460", "14454", "", "Metropolitan Division"),
            row(4, "14460", "99999", "48059", "County or equivalent"),
        ];
        assert!(matches!(
            build_statistical_areas(&rows, &table()),
            Err(CensusError::UnmatchedDivision { line: 4, .. })
        ));
    }

    #[test]
    fn test_area_without_members_is_fatal() {
        let rows = vec![row(2, "10180", "", "", "Metropolitan Statistical Area")];
        assert!(matches!(
            build_statistical_areas(&rows, &table()),
            Err(CensusError::EmptyArea { line: 2, .. })
        ));
    }
}
