// Tests for CbsaRepository against a live Postgres (DATABASE_URL).
// Run with: cargo test -- --ignored

use census_data_importer::db::CbsaRepository;
use census_data_importer::importers::{parse_population_rows, CountyClassificationTable};
use census_data_importer::census::build_statistical_areas;
use census_data_importer::models::{CoreBasedStatisticalArea, CountyType};
use serial_test::serial;

mod common;

fn sample_areas() -> Vec<CoreBasedStatisticalArea> {
    let values: Vec<String> = (0..90).map(|i| (i * 3).to_string()).collect();
    let values = values.join(",");
    let text = format!(
        "CBSA,MDIV,STCOU,NAME,LSAD,CENSUS2010POP,ESTIMATESBASE2010\n\
         10180,,,\"Abilene, TX\",Metropolitan Statistical Area,165252,165252,{values}\n\
         10180,,48441,\"Taylor County, TX\",County or equivalent,131506,131506,{values}\n\
         10220,,,\"Ada, OK\",Micropolitan Statistical Area,37492,37492,{values}\n\
         10220,,40123,\"Pontotoc County, OK\",County or equivalent,37492,37492,{values}\n"
    );
    let table = CountyClassificationTable::from_entries([
        ("48441", CountyType::Central),
        ("40123", CountyType::Central),
    ]);

    build_statistical_areas(&parse_population_rows(&text).unwrap(), &table).unwrap()
}

#[tokio::test]
#[serial]
#[ignore = "requires a Postgres database"]
async fn test_replace_all_inserts_in_order() {
    let repo = CbsaRepository::new(common::test_pool().await.clone());
    let areas = sample_areas();

    let inserted = repo.replace_all(&areas).await.unwrap();
    assert_eq!(inserted, 2);
    assert_eq!(repo.count().await.unwrap(), 2);

    let stored = repo.find_all().await.unwrap();
    assert_eq!(stored, areas);
}

#[tokio::test]
#[serial]
#[ignore = "requires a Postgres database"]
async fn test_replace_all_drops_previous_batch() {
    let repo = CbsaRepository::new(common::test_pool().await.clone());
    let areas = sample_areas();

    repo.replace_all(&areas).await.unwrap();
    repo.replace_all(&areas[..1]).await.unwrap();

    assert_eq!(repo.count().await.unwrap(), 1);
    assert!(repo.find_by_code("10220").await.unwrap().is_none());

    let abilene = repo.find_by_code("10180").await.unwrap().unwrap();
    assert_eq!(abilene, areas[0]);
}

#[tokio::test]
#[serial]
#[ignore = "requires a Postgres database"]
async fn test_replace_all_with_empty_batch() {
    let repo = CbsaRepository::new(common::test_pool().await.clone());

    assert_eq!(repo.replace_all(&[]).await.unwrap(), 0);
    assert_eq!(repo.count().await.unwrap(), 0);
}
