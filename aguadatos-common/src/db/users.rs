//! User (plant operator) persistence

use super::models::User;
use crate::Result;
use sqlx::{Executor, Sqlite};

const USER_COLUMNS: &str = "id, name, email, phone_number, plant_id";

/// Load user by id
pub async fn find_user<'e, E>(executor: E, id: i64) -> Result<Option<User>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {} FROM users WHERE id = ?",
        USER_COLUMNS
    ))
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(user)
}

/// First user whose email OR phone number matches
pub async fn find_conflicting_user<'e, E>(
    executor: E,
    email: &str,
    phone_number: &str,
) -> Result<Option<User>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {} FROM users WHERE email = ? OR phone_number = ? ORDER BY id LIMIT 1",
        USER_COLUMNS
    ))
    .bind(email)
    .bind(phone_number)
    .fetch_optional(executor)
    .await?;

    Ok(user)
}

/// All users in insertion order
pub async fn list_users<'e, E>(executor: E) -> Result<Vec<User>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let users = sqlx::query_as::<_, User>(&format!(
        "SELECT {} FROM users ORDER BY id",
        USER_COLUMNS
    ))
    .fetch_all(executor)
    .await?;

    Ok(users)
}

/// Users attached to one plant, in insertion order
pub async fn list_users_for_plant<'e, E>(executor: E, plant_id: i64) -> Result<Vec<User>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let users = sqlx::query_as::<_, User>(&format!(
        "SELECT {} FROM users WHERE plant_id = ? ORDER BY id",
        USER_COLUMNS
    ))
    .bind(plant_id)
    .fetch_all(executor)
    .await?;

    Ok(users)
}

/// Insert a user row and return it with its generated id
pub async fn insert_user<'e, E>(
    executor: E,
    name: &str,
    email: &str,
    phone_number: &str,
    plant_id: i64,
) -> Result<User>
where
    E: Executor<'e, Database = Sqlite>,
{
    let user = sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (name, email, phone_number, plant_id) VALUES (?, ?, ?, ?) RETURNING {}",
        USER_COLUMNS
    ))
    .bind(name)
    .bind(email)
    .bind(phone_number)
    .bind(plant_id)
    .fetch_one(executor)
    .await?;

    Ok(user)
}

/// Delete user row; returns whether a row was removed
pub async fn delete_user<'e, E>(executor: E, id: i64) -> Result<bool>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn count_users<'e, E>(executor: E) -> Result<i64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
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
    use crate::db::plants::insert_plant;
    use sqlx::SqlitePool;

    async fn plant(pool: &SqlitePool, name: &str, phone: &str) -> i64 {
        let config = insert_configuration(pool, ChemicalType::Pac, 0.5, 1, 1)
            .await
            .unwrap();
        insert_plant(pool, name, phone, config.id).await.unwrap().id
    }

    #[tokio::test]
    async fn test_users_listed_per_plant() {
        let pool = init_memory_database().await.unwrap();
        let first = plant(&pool, "AguaClara", "111").await;
        let second = plant(&pool, "AguaClara2", "222").await;

        insert_user(&pool, "John Doe", "john@example.com", "123", first)
            .await
            .unwrap();
        insert_user(&pool, "Jane Smith", "jane@example.com", "456", second)
            .await
            .unwrap();
        insert_user(&pool, "Bob Johnson", "bob@example.com", "789", first)
            .await
            .unwrap();

        let names: Vec<String> = list_users_for_plant(&pool, first)
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.name)
            .collect();
        assert_eq!(names, vec!["John Doe", "Bob Johnson"]);
        assert_eq!(list_users(&pool).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_duplicate_email_violates_unique_constraint() {
        let pool = init_memory_database().await.unwrap();
        let plant_id = plant(&pool, "AguaClara", "111").await;

        insert_user(&pool, "A", "same@example.com", "1", plant_id)
            .await
            .unwrap();
        let err = insert_user(&pool, "B", "same@example.com", "2", plant_id)
            .await
            .unwrap_err();

        assert!(err.is_unique_violation());
        assert_eq!(count_users(&pool).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_find_conflicting_user() {
        let pool = init_memory_database().await.unwrap();
        let plant_id = plant(&pool, "AguaClara", "111").await;
        let user = insert_user(&pool, "A", "a@example.com", "555", plant_id)
            .await
            .unwrap();

        let by_phone = find_conflicting_user(&pool, "other@example.com", "555")
            .await
            .unwrap();
        assert_eq!(by_phone, Some(user));
        assert!(find_conflicting_user(&pool, "x@example.com", "000")
            .await
            .unwrap()
            .is_none());
    }
}
