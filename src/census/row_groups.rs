use std::collections::HashMap;
use tracing::debug;

use crate::importers::PopulationRow;

/// Population rows split by what they describe.
///
/// - county row: county code present
/// - division row: division code present, county code blank
/// - area row: both blank
///
/// Counties inside a divided CBSA carry their division code too, so the
/// division test also requires a blank county code to keep the groups disjoint.
/// Testing the division code alone would turn every such county into an extra
/// division holding a copy of its siblings; do not relax this check.
#[derive(Debug, Default)]
pub struct RowGroups<'a> {
    pub areas: Vec<&'a PopulationRow>,
    pub divisions_by_cbsa: HashMap<String, Vec<&'a PopulationRow>>,
    pub counties_by_cbsa: HashMap<String, Vec<&'a PopulationRow>>,
}

impl<'a> RowGroups<'a> {
    pub fn partition(rows: &'a [PopulationRow]) -> Self {
        let mut groups = RowGroups::default();

        for row in rows {
            if row.has_county_code() {
                groups
                    .counties_by_cbsa
                    .entry(row.cbsa_code().to_string())
                    .or_default()
                    .push(row);
            } else if row.has_division_code() {
                groups
                    .divisions_by_cbsa
                    .entry(row.cbsa_code().to_string())
                    .or_default()
                    .push(row);
            } else {
                groups.areas.push(row);
            }
        }

        debug!(
            areas = groups.areas.len(),
            divided_areas = groups.divisions_by_cbsa.len(),
            areas_with_counties = groups.counties_by_cbsa.len(),
            "Partitioned population rows"
        );
        groups
    }

    pub fn divisions_of(&self, cbsa: &str) -> &[&'a PopulationRow] {
        self.divisions_by_cbsa
            .get(cbsa)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn counties_of(&self, cbsa: &str) -> &[&'a PopulationRow] {
        self.counties_by_cbsa
            .get(cbsa)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}
