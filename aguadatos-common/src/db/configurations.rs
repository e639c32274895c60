//! Configuration persistence

use super::models::{ChemicalType, Configuration};
use crate::Result;
use sqlx::{Executor, Sqlite};

const CONFIGURATION_COLUMNS: &str =
    "id, chemical_type, chemical_concentration, num_filters, num_clarifiers";

/// Load configuration by id
pub async fn find_configuration<'e, E>(executor: E, id: i64) -> Result<Option<Configuration>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let config = sqlx::query_as::<_, Configuration>(&format!(
        "SELECT {} FROM configurations WHERE id = ?",
        CONFIGURATION_COLUMNS
    ))
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(config)
}

/// Insert a configuration row and return it with its generated id
pub async fn insert_configuration<'e, E>(
    executor: E,
    chemical_type: ChemicalType,
    chemical_concentration: f64,
    num_filters: i64,
    num_clarifiers: i64,
) -> Result<Configuration>
where
    E: Executor<'e, Database = Sqlite>,
{
    let config = sqlx::query_as::<_, Configuration>(&format!(
        r#"
        INSERT INTO configurations (chemical_type, chemical_concentration, num_filters, num_clarifiers)
        VALUES (?, ?, ?, ?)
        RETURNING {}
        "#,
        CONFIGURATION_COLUMNS
    ))
    .bind(chemical_type.as_str())
    .bind(chemical_concentration)
    .bind(num_filters)
    .bind(num_clarifiers)
    .fetch_one(executor)
    .await?;

    Ok(config)
}

/// Delete configuration row; returns whether a row was removed
pub async fn delete_configuration<'e, E>(executor: E, id: i64) -> Result<bool>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("DELETE FROM configurations WHERE id = ?")
        .bind(id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn count_configurations<'e, E>(executor: E) -> Result<i64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM configurations")
        .fetch_one(executor)
        .await?;

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init::init_memory_database;

    #[tokio::test]
    async fn test_configuration_round_trip() {
        let pool = init_memory_database().await.unwrap();

        let config = insert_configuration(&pool, ChemicalType::Al2So43, 12.75, 3, 2)
            .await
            .unwrap();
        let loaded = find_configuration(&pool, config.id).await.unwrap().unwrap();

        assert_eq!(loaded.chemical_type, ChemicalType::Al2So43);
        assert_eq!(loaded.chemical_concentration, 12.75);
        assert_eq!(loaded.num_filters, 3);
        assert_eq!(loaded.num_clarifiers, 2);
    }

    #[tokio::test]
    async fn test_delete_configuration() {
        let pool = init_memory_database().await.unwrap();
        let config = insert_configuration(&pool, ChemicalType::Pac, 1.0, 0, 0)
            .await
            .unwrap();

        assert!(delete_configuration(&pool, config.id).await.unwrap());
        assert!(!delete_configuration(&pool, config.id).await.unwrap());
        assert_eq!(count_configurations(&pool).await.unwrap(), 0);
    }
}
