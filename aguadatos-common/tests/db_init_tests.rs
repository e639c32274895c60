//! Database initialization against an on-disk SQLite file

use aguadatos_common::db::init::init_database;
use aguadatos_common::db::plants::count_plants;
use aguadatos_common::registry::NewPlant;
use aguadatos_common::{ChemicalType, PlantRegistry};

fn sample_plant() -> NewPlant {
    NewPlant {
        name: "AguaClara".to_string(),
        phone_number: "111-111-1111".to_string(),
        chemical_type: ChemicalType::Pac,
        chemical_concentration: 0.1,
        num_filters: 1,
        num_clarifiers: 1,
    }
}

#[tokio::test]
async fn test_database_creation_when_missing() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("nested").join("aguadatos.db");

    let result = init_database(db_path.to_str().unwrap()).await;

    assert!(result.is_ok(), "Database initialization failed: {:?}", result.err());
    assert!(db_path.exists(), "Database file was not created");
}

#[tokio::test]
async fn test_data_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("aguadatos.db").display());

    let pool = init_database(&url).await.unwrap();
    PlantRegistry::new(pool.clone())
        .create_plant(sample_plant())
        .await
        .unwrap();
    pool.close().await;

    // Second open must not recreate or wipe tables
    let reopened = init_database(&url).await.unwrap();
    assert_eq!(count_plants(&reopened).await.unwrap(), 1);
}
