//! Plant persistence

use super::models::Plant;
use crate::Result;
use sqlx::{Executor, Sqlite};

const PLANT_COLUMNS: &str = "id, name, phone_number, config_id";

/// Load plant by id
pub async fn find_plant<'e, E>(executor: E, id: i64) -> Result<Option<Plant>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let plant = sqlx::query_as::<_, Plant>(&format!(
        "SELECT {} FROM plants WHERE id = ?",
        PLANT_COLUMNS
    ))
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(plant)
}

/// Load plant by its unique name
pub async fn find_plant_by_name<'e, E>(executor: E, name: &str) -> Result<Option<Plant>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let plant = sqlx::query_as::<_, Plant>(&format!(
        "SELECT {} FROM plants WHERE name = ?",
        PLANT_COLUMNS
    ))
    .bind(name)
    .fetch_optional(executor)
    .await?;

    Ok(plant)
}

/// First plant whose name OR phone number matches
pub async fn find_conflicting_plant<'e, E>(
    executor: E,
    name: &str,
    phone_number: &str,
) -> Result<Option<Plant>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let plant = sqlx::query_as::<_, Plant>(&format!(
        "SELECT {} FROM plants WHERE name = ? OR phone_number = ? ORDER BY id LIMIT 1",
        PLANT_COLUMNS
    ))
    .bind(name)
    .bind(phone_number)
    .fetch_optional(executor)
    .await?;

    Ok(plant)
}

/// All plants in insertion order
pub async fn list_plants<'e, E>(executor: E) -> Result<Vec<Plant>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let plants = sqlx::query_as::<_, Plant>(&format!(
        "SELECT {} FROM plants ORDER BY id",
        PLANT_COLUMNS
    ))
    .fetch_all(executor)
    .await?;

    Ok(plants)
}

/// Insert a plant row and return it with its generated id
pub async fn insert_plant<'e, E>(
    executor: E,
    name: &str,
    phone_number: &str,
    config_id: i64,
) -> Result<Plant>
where
    E: Executor<'e, Database = Sqlite>,
{
    let plant = sqlx::query_as::<_, Plant>(&format!(
        "INSERT INTO plants (name, phone_number, config_id) VALUES (?, ?, ?) RETURNING {}",
        PLANT_COLUMNS
    ))
    .bind(name)
    .bind(phone_number)
    .bind(config_id)
    .fetch_one(executor)
    .await?;

    Ok(plant)
}

/// Delete plant row; returns whether a row was removed
pub async fn delete_plant<'e, E>(executor: E, id: i64) -> Result<bool>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("DELETE FROM plants WHERE id = ?")
        .bind(id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn count_plants<'e, E>(executor: E) -> Result<i64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM plants")
        .fetch_one(executor)
        .await?;

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::configurations::insert_configuration;
    use crate::db::init::init_memory_database;
    use crate::db::models::ChemicalType;

    #[tokio::test]
    async fn test_insert_and_find_plant() {
        let pool = init_memory_database().await.unwrap();
        let config = insert_configuration(&pool, ChemicalType::Pac, 0.1, 1, 1)
            .await
            .unwrap();

        let plant = insert_plant(&pool, "AguaClara", "111-111-1111", config.id)
            .await
            .unwrap();
        assert_eq!(plant.config_id, config.id);

        let by_id = find_plant(&pool, plant.id).await.unwrap();
        assert_eq!(by_id.as_ref(), Some(&plant));

        let by_name = find_plant_by_name(&pool, "AguaClara").await.unwrap();
        assert_eq!(by_name, Some(plant));

        assert!(find_plant(&pool, 999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_conflicting_plant_matches_either_column() {
        let pool = init_memory_database().await.unwrap();
        let config = insert_configuration(&pool, ChemicalType::Pac, 0.1, 1, 1)
            .await
            .unwrap();
        insert_plant(&pool, "AguaClara", "111-111-1111", config.id)
            .await
            .unwrap();

        assert!(find_conflicting_plant(&pool, "AguaClara", "000")
            .await
            .unwrap()
            .is_some());
        assert!(find_conflicting_plant(&pool, "Other", "111-111-1111")
            .await
            .unwrap()
            .is_some());
        assert!(find_conflicting_plant(&pool, "Other", "000")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_configuration_cannot_be_shared() {
        let pool = init_memory_database().await.unwrap();
        let config = insert_configuration(&pool, ChemicalType::Pac, 0.1, 1, 1)
            .await
            .unwrap();
        insert_plant(&pool, "A", "1", config.id).await.unwrap();

        let err = insert_plant(&pool, "B", "2", config.id).await.unwrap_err();
        assert!(err.is_unique_violation());
    }
}
