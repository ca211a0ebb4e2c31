use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Classification of a county or county-equivalent, as listed in the
/// delineation spreadsheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountyType {
    Central,
    Outlying,
    County,
    Parish,
    Borough,
    CensusArea,
    CityAndBorough,
    Municipality,
    IndependentCity,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown county classification: {0:?}")]
pub struct UnknownCountyType(pub String);

impl FromStr for CountyType {
    type Err = UnknownCountyType;

    /// Accepts the spreadsheet's free text in any case ("Central",
    /// "census area", "City-and-Borough").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let canonical: String = s
            .trim()
            .chars()
            .map(|c| match c {
                ' ' | '-' => '_',
                c => c.to_ascii_uppercase(),
            })
            .collect();

        match canonical.as_str() {
            "CENTRAL" => Ok(CountyType::Central),
            "OUTLYING" => Ok(CountyType::Outlying),
            "COUNTY" => Ok(CountyType::County),
            "PARISH" => Ok(CountyType::Parish),
            "BOROUGH" => Ok(CountyType::Borough),
            "CENSUS_AREA" => Ok(CountyType::CensusArea),
            "CITY_AND_BOROUGH" => Ok(CountyType::CityAndBorough),
            "MUNICIPALITY" => Ok(CountyType::Municipality),
            "INDEPENDENT_CITY" => Ok(CountyType::IndependentCity),
            _ => Err(UnknownCountyType(s.to_string())),
        }
    }
}

impl fmt::Display for CountyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CountyType::Central => "central",
            CountyType::Outlying => "outlying",
            CountyType::County => "county",
            CountyType::Parish => "parish",
            CountyType::Borough => "borough",
            CountyType::CensusArea => "census_area",
            CountyType::CityAndBorough => "city_and_borough",
            CountyType::Municipality => "municipality",
            CountyType::IndependentCity => "independent_city",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatisticalAreaType {
    Metropolitan,
    Micropolitan,
}

impl StatisticalAreaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatisticalAreaType::Metropolitan => "metropolitan",
            StatisticalAreaType::Micropolitan => "micropolitan",
        }
    }
}

/// Which kind of point in the series an estimate is.
///
/// `Census` and `Base` are both anchored on census day (2010-04-01) and carry
/// only a value; `Annual` estimates are the July 1 figures with components of
/// change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimateKind {
    Census,
    Base,
    Annual,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NaturalIncrease {
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub births: i64,
    pub deaths: i64,
    pub natural_increase: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetMigration {
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub international: i64,
    pub domestic: i64,
    pub net_migration: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Residual {
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub value: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationEstimate {
    pub date: NaiveDate,
    pub value: i64,
    pub kind: EstimateKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numeric_change_from_last: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub natural_increase: Option<NaturalIncrease>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub net_migration: Option<NetMigration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub residual: Option<Residual>,
}

impl PopulationEstimate {
    /// Estimate with only a value, used for the census and base counts.
    pub fn point(date: NaiveDate, value: i64, kind: EstimateKind) -> Self {
        Self {
            date,
            value,
            kind,
            numeric_change_from_last: None,
            natural_increase: None,
            net_migration: None,
            residual: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountyOrEquivalent {
    pub code: String,
    pub title: String,
    pub population_estimates: Vec<PopulationEstimate>,
    pub county_type: CountyType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetropolitanDivision {
    pub code: String,
    pub title: String,
    pub population_estimates: Vec<PopulationEstimate>,
    pub counties: Vec<CountyOrEquivalent>,
}

/// What a statistical area is made of: either metropolitan divisions (which
/// hold the counties) or counties directly, never both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "items", rename_all = "snake_case")]
pub enum AreaComponents {
    Divisions(Vec<MetropolitanDivision>),
    Counties(Vec<CountyOrEquivalent>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreBasedStatisticalArea {
    pub code: String,
    pub title: String,
    pub population_estimates: Vec<PopulationEstimate>,
    pub area_type: StatisticalAreaType,
    pub components: AreaComponents,
}

impl CoreBasedStatisticalArea {
    pub fn divisions(&self) -> &[MetropolitanDivision] {
        match &self.components {
            AreaComponents::Divisions(divisions) => divisions,
            AreaComponents::Counties(_) => &[],
        }
    }

    /// Counties attached directly to the area (empty when it has divisions)
    pub fn counties(&self) -> &[CountyOrEquivalent] {
        match &self.components {
            AreaComponents::Counties(counties) => counties,
            AreaComponents::Divisions(_) => &[],
        }
    }

    /// Every county in the area, whether attached directly or via a division
    pub fn all_counties(&self) -> Vec<&CountyOrEquivalent> {
        match &self.components {
            AreaComponents::Counties(counties) => counties.iter().collect(),
            AreaComponents::Divisions(divisions) => {
                divisions.iter().flat_map(|d| d.counties.iter()).collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_county_type_from_str_is_case_insensitive() {
        assert_eq!("Central".parse::<CountyType>().unwrap(), CountyType::Central);
        assert_eq!("OUTLYING".parse::<CountyType>().unwrap(), CountyType::Outlying);
        assert_eq!(
            " municipality ".parse::<CountyType>().unwrap(),
            CountyType::Municipality
        );
        assert_eq!(
            "Census Area".parse::<CountyType>().unwrap(),
            CountyType::CensusArea
        );
        assert_eq!(
            "city-and-borough".parse::<CountyType>().unwrap(),
            CountyType::CityAndBorough
        );
    }

    #[test]
    fn test_county_type_unknown() {
        let err = "Township".parse::<CountyType>().unwrap_err();
        assert_eq!(err, UnknownCountyType("Township".to_string()));
    }

    #[test]
    fn test_county_type_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&CountyType::IndependentCity).unwrap(),
            "\"independent_city\""
        );
        assert_eq!(CountyType::IndependentCity.to_string(), "independent_city");
    }

    #[test]
    fn test_area_components_accessors() {
        let county = CountyOrEquivalent {
            code: "48441".to_string(),
            title: "Taylor County, TX".to_string(),
            population_estimates: vec![],
            county_type: CountyType::Central,
        };
        let area = CoreBasedStatisticalArea {
            code: "10180".to_string(),
            title: "Abilene, TX".to_string(),
            population_estimates: vec![],
            area_type: StatisticalAreaType::Metropolitan,
            components: AreaComponents::Counties(vec![county.clone()]),
        };

        assert!(area.divisions().is_empty());
        assert_eq!(area.counties(), &[county.clone()]);
        assert_eq!(area.all_counties(), vec![&county]);
    }
}
