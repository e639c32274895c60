//! Plant registry
//!
//! Owns every operation that touches more than one of plants,
//! configurations and users, and keeps them consistent:
//!
//! - a plant is always created together with its own configuration
//! - plant names/phone numbers and user emails/phone numbers are unique
//! - a user always references an existing plant
//! - deleting a plant removes its users, the plant and its configuration
//!
//! Each write operation runs inside one transaction. Any failure rolls the
//! whole operation back before the error is returned. Write transactions
//! are serialized through the registry, so overlapping requests queue
//! instead of failing on SQLite's single writer lock.

use crate::db::models::{ChemicalType, Configuration, Plant, User};
use crate::db::{configurations, plants, users};
use crate::error::{Error, PlantConflict, Result, UserConflict};
use crate::validation::extract_fields;
use serde::Serialize;
use serde_json::{Map, Value};
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Validated plant creation request
#[derive(Debug, Clone, PartialEq)]
pub struct NewPlant {
    pub name: String,
    pub phone_number: String,
    pub chemical_type: ChemicalType,
    pub chemical_concentration: f64,
    pub num_filters: i64,
    pub num_clarifiers: i64,
}

impl NewPlant {
    pub const REQUIRED_FIELDS: [&'static str; 6] = [
        "name",
        "phone_number",
        "chemical_type",
        "chemical_concentration",
        "num_filters",
        "num_clarifiers",
    ];

    /// Build from a submitted JSON body
    ///
    /// Checks, in order: missing fields, chemical type, remaining field types.
    pub fn from_body(body: &Value) -> Result<Self> {
        let values = required(body, "Plant", &Self::REQUIRED_FIELDS)?;
        let [name, phone_number, chemical_type, concentration, num_filters, num_clarifiers] =
            values[..]
        else {
            return Err(Error::InvalidInput("Malformed plant request".to_string()));
        };

        let chemical_type = chemical(chemical_type)?;

        Ok(NewPlant {
            name: string_field(name, "name")?,
            phone_number: string_field(phone_number, "phone_number")?,
            chemical_type,
            chemical_concentration: concentration_field(concentration)?,
            num_filters: count_field(num_filters, "num_filters")?,
            num_clarifiers: count_field(num_clarifiers, "num_clarifiers")?,
        })
    }
}

/// Validated user creation request
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub plant_name: String,
}

impl NewUser {
    pub const REQUIRED_FIELDS: [&'static str; 4] = ["name", "email", "phone_number", "plant_name"];

    /// Build from a submitted JSON body
    pub fn from_body(body: &Value) -> Result<Self> {
        let values = required(body, "User", &Self::REQUIRED_FIELDS)?;
        let [name, email, phone_number, plant_name] = values[..] else {
            return Err(Error::InvalidInput("Malformed user request".to_string()));
        };

        Ok(NewUser {
            name: string_field(name, "name")?,
            email: string_field(email, "email")?,
            phone_number: string_field(phone_number, "phone_number")?,
            plant_name: string_field(plant_name, "plant_name")?,
        })
    }
}

/// Newly created plant with the configuration created alongside it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreatedPlant {
    #[serde(flatten)]
    pub plant: Plant,
    pub config: Configuration,
}

/// Newly created user with the plant it belongs to
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreatedUser {
    #[serde(flatten)]
    pub user: User,
    pub plant: Plant,
}

/// Cross-entity operations over an explicitly supplied pool
#[derive(Debug, Clone)]
pub struct PlantRegistry {
    db: SqlitePool,
    /// Held for the lifetime of every write transaction
    write_gate: Arc<Mutex<()>>,
}

impl PlantRegistry {
    pub fn new(db: SqlitePool) -> Self {
        Self {
            db,
            write_gate: Arc::new(Mutex::new(())),
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.db
    }

    /// Create a plant and its configuration as one unit
    pub async fn create_plant(&self, new: NewPlant) -> Result<CreatedPlant> {
        let _writer = self.write_gate.lock().await;
        let mut tx = self.db.begin().await?;
        let outcome = insert_plant_with_config(&mut tx, &new).await;
        let created = finish(tx, outcome)
            .await
            .map_err(|e| duplicate_plant_from_storage(e, &new))?;

        info!(
            plant_id = created.plant.id,
            config_id = created.config.id,
            name = %created.plant.name,
            "Plant created"
        );
        Ok(created)
    }

    /// Delete a plant, every user referencing it and its configuration
    ///
    /// Returns the plant as it was before deletion.
    pub async fn delete_plant(&self, id: i64) -> Result<Plant> {
        let _writer = self.write_gate.lock().await;
        let mut tx = self.db.begin().await?;
        let outcome = delete_plant_rows(&mut tx, id).await;
        let (plant, users_removed) = finish(tx, outcome).await?;

        info!(
            plant_id = plant.id,
            config_id = plant.config_id,
            users_removed,
            "Plant deleted"
        );
        Ok(plant)
    }

    /// Create a user attached to the plant named in the request
    pub async fn create_user(&self, new: NewUser) -> Result<CreatedUser> {
        let _writer = self.write_gate.lock().await;
        let mut tx = self.db.begin().await?;
        let outcome = insert_user_for_plant(&mut tx, &new).await;
        let created = finish(tx, outcome)
            .await
            .map_err(|e| duplicate_user_from_storage(e, &new))?;

        info!(
            user_id = created.user.id,
            plant_id = created.plant.id,
            "User created"
        );
        Ok(created)
    }

    /// Delete a single user; returns the user as it was before deletion
    pub async fn delete_user(&self, id: i64) -> Result<User> {
        let _writer = self.write_gate.lock().await;
        let mut tx = self.db.begin().await?;
        let outcome = delete_user_row(&mut tx, id).await;
        let user = finish(tx, outcome).await?;

        info!(user_id = user.id, plant_id = user.plant_id, "User deleted");
        Ok(user)
    }

    pub async fn get_plant(&self, id: i64) -> Result<Plant> {
        plants::find_plant(&self.db, id)
            .await?
            .ok_or_else(plant_not_found)
    }

    pub async fn list_plants(&self) -> Result<Vec<Plant>> {
        plants::list_plants(&self.db).await
    }

    pub async fn get_user(&self, id: i64) -> Result<User> {
        users::find_user(&self.db, id)
            .await?
            .ok_or_else(user_not_found)
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        users::list_users(&self.db).await
    }

    /// Users attached to one plant; `NotFound` if the plant does not exist
    pub async fn plant_users(&self, plant_id: i64) -> Result<Vec<User>> {
        let plant = self.get_plant(plant_id).await?;
        users::list_users_for_plant(&self.db, plant.id).await
    }
}

async fn insert_plant_with_config(
    tx: &mut Transaction<'_, Sqlite>,
    new: &NewPlant,
) -> Result<CreatedPlant> {
    // Name is reported first when both columns collide
    if let Some(existing) =
        plants::find_conflicting_plant(&mut **tx, &new.name, &new.phone_number).await?
    {
        let conflict = if existing.name == new.name {
            PlantConflict::Name(new.name.clone())
        } else {
            PlantConflict::PhoneNumber(new.phone_number.clone())
        };
        debug!(%conflict, "Rejected duplicate plant");
        return Err(Error::DuplicatePlant(conflict));
    }

    let config = configurations::insert_configuration(
        &mut **tx,
        new.chemical_type,
        new.chemical_concentration,
        new.num_filters,
        new.num_clarifiers,
    )
    .await?;

    let plant = plants::insert_plant(&mut **tx, &new.name, &new.phone_number, config.id).await?;

    Ok(CreatedPlant { plant, config })
}

async fn delete_plant_rows(tx: &mut Transaction<'_, Sqlite>, id: i64) -> Result<(Plant, usize)> {
    let plant = plants::find_plant(&mut **tx, id)
        .await?
        .ok_or_else(plant_not_found)?;

    // Users first so no row is left pointing at a missing plant
    let operators = users::list_users_for_plant(&mut **tx, plant.id).await?;
    for user in &operators {
        users::delete_user(&mut **tx, user.id).await?;
    }

    plants::delete_plant(&mut **tx, plant.id).await?;

    if !configurations::delete_configuration(&mut **tx, plant.config_id).await? {
        warn!(
            plant_id = plant.id,
            config_id = plant.config_id,
            "Plant had no configuration row"
        );
    }

    Ok((plant, operators.len()))
}

async fn insert_user_for_plant(
    tx: &mut Transaction<'_, Sqlite>,
    new: &NewUser,
) -> Result<CreatedUser> {
    // Email is reported first when both columns collide
    if let Some(existing) =
        users::find_conflicting_user(&mut **tx, &new.email, &new.phone_number).await?
    {
        let conflict = if existing.email == new.email {
            UserConflict::Email(new.email.clone())
        } else {
            UserConflict::PhoneNumber(new.phone_number.clone())
        };
        debug!(%conflict, "Rejected duplicate user");
        return Err(Error::DuplicateUser(conflict));
    }

    let plant = plants::find_plant_by_name(&mut **tx, &new.plant_name)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Plant named {} not found.", new.plant_name)))?;

    let user = users::insert_user(
        &mut **tx,
        &new.name,
        &new.email,
        &new.phone_number,
        plant.id,
    )
    .await?;

    Ok(CreatedUser { user, plant })
}

async fn delete_user_row(tx: &mut Transaction<'_, Sqlite>, id: i64) -> Result<User> {
    let user = users::find_user(&mut **tx, id)
        .await?
        .ok_or_else(user_not_found)?;
    users::delete_user(&mut **tx, user.id).await?;
    Ok(user)
}

/// Commit on success, roll back on any error
async fn finish<T>(tx: Transaction<'_, Sqlite>, outcome: Result<T>) -> Result<T> {
    match outcome {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                warn!(error = %rollback_err, "Rollback failed");
            }
            Err(err)
        }
    }
}

/// Map a UNIQUE violation raised at insert time to the duplicate error
fn duplicate_plant_from_storage(err: Error, new: &NewPlant) -> Error {
    let conflict = match conflict_column(&err) {
        Some("plants.name") => Some(PlantConflict::Name(new.name.clone())),
        Some("plants.phone_number") => Some(PlantConflict::PhoneNumber(new.phone_number.clone())),
        _ => None,
    };
    conflict.map(Error::DuplicatePlant).unwrap_or(err)
}

fn duplicate_user_from_storage(err: Error, new: &NewUser) -> Error {
    let conflict = match conflict_column(&err) {
        Some("users.email") => Some(UserConflict::Email(new.email.clone())),
        Some("users.phone_number") => Some(UserConflict::PhoneNumber(new.phone_number.clone())),
        _ => None,
    };
    conflict.map(Error::DuplicateUser).unwrap_or(err)
}

/// `table.column` named by a storage-level UNIQUE violation
fn conflict_column(err: &Error) -> Option<&str> {
    match err {
        Error::Storage(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => db_err
            .message()
            .strip_prefix("UNIQUE constraint failed: ")
            .map(|columns| columns.split(',').next().unwrap_or(columns).trim()),
        _ => None,
    }
}

fn plant_not_found() -> Error {
    Error::NotFound("Plant not found.".to_string())
}

fn user_not_found() -> Error {
    Error::NotFound("User not found.".to_string())
}

fn required<'a>(body: &'a Value, entity: &'static str, fields: &[&str]) -> Result<Vec<&'a Value>> {
    let object: &Map<String, Value> = body
        .as_object()
        .ok_or_else(|| Error::InvalidInput("Request body must be a JSON object".to_string()))?;

    extract_fields(object, fields).map_err(|missing| Error::MissingField {
        entity,
        fields: missing,
    })
}

fn chemical(value: &Value) -> Result<ChemicalType> {
    let invalid = || Error::InvalidEnum {
        kind: "Chemical",
        value: value.as_str().map(str::to_string).unwrap_or_else(|| value.to_string()),
    };
    value.as_str().ok_or_else(invalid)?.parse().map_err(|_| invalid())
}

fn string_field(value: &Value, field: &str) -> Result<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| Error::InvalidInput(format!("Field '{}' must be a string", field)))
}

fn concentration_field(value: &Value) -> Result<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    parsed.filter(|c| c.is_finite() && *c > 0.0).ok_or_else(|| {
        Error::InvalidInput("Field 'chemical_concentration' must be a positive number".to_string())
    })
}

fn count_field(value: &Value, field: &str) -> Result<i64> {
    value.as_i64().filter(|n| *n >= 0).ok_or_else(|| {
        Error::InvalidInput(format!("Field '{}' must be a non-negative integer", field))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn plant_body() -> Value {
        json!({
            "name": "AguaClara",
            "phone_number": "111-111-1111",
            "chemical_type": "PAC",
            "chemical_concentration": 0.1,
            "num_filters": 1,
            "num_clarifiers": 2
        })
    }

    #[test]
    fn new_plant_from_valid_body() {
        let new = NewPlant::from_body(&plant_body()).unwrap();
        assert_eq!(new.chemical_type, ChemicalType::Pac);
        assert_eq!(new.chemical_concentration, 0.1);
        assert_eq!(new.num_clarifiers, 2);
    }

    #[test]
    fn new_plant_reports_all_missing_fields() {
        let err = NewPlant::from_body(&json!({"name": "A", "num_filters": null})).unwrap_err();
        match err {
            Error::MissingField { entity, fields } => {
                assert_eq!(entity, "Plant");
                assert_eq!(
                    fields,
                    vec![
                        "phone_number",
                        "chemical_type",
                        "chemical_concentration",
                        "num_filters",
                        "num_clarifiers"
                    ]
                );
            }
            other => panic!("expected MissingField, got {:?}", other),
        }
    }

    #[test]
    fn missing_fields_win_over_bad_chemical() {
        let err = NewPlant::from_body(&json!({"chemical_type": "NaOH"})).unwrap_err();
        assert!(matches!(err, Error::MissingField { .. }));
    }

    #[test]
    fn new_plant_rejects_unknown_chemical() {
        let mut body = plant_body();
        body["chemical_type"] = json!("FeCl3");
        let err = NewPlant::from_body(&body).unwrap_err();
        assert_eq!(err.to_string(), "Chemical 'FeCl3' invalid.");
    }

    #[test]
    fn concentration_accepts_numeric_strings_and_rejects_non_positive() {
        let mut body = plant_body();
        body["chemical_concentration"] = json!("2.5");
        assert_eq!(NewPlant::from_body(&body).unwrap().chemical_concentration, 2.5);

        body["chemical_concentration"] = json!(0);
        assert!(matches!(
            NewPlant::from_body(&body),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn counts_must_be_non_negative_integers() {
        let mut body = plant_body();
        body["num_filters"] = json!(-1);
        assert!(matches!(NewPlant::from_body(&body), Err(Error::InvalidInput(_))));

        body["num_filters"] = json!(1.5);
        assert!(matches!(NewPlant::from_body(&body), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn body_must_be_an_object() {
        assert!(matches!(
            NewUser::from_body(&json!(["name"])),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn new_user_missing_fields_message() {
        let err = NewUser::from_body(&json!({"name": "John", "phone_number": "1"})).unwrap_err();
        assert_eq!(err.to_string(), "User missing email, plant_name");
    }

    #[test]
    fn created_plant_embeds_config() {
        let created = CreatedPlant {
            plant: Plant {
                id: 1,
                name: "AguaClara".into(),
                phone_number: "111".into(),
                config_id: 4,
            },
            config: Configuration {
                id: 4,
                chemical_type: ChemicalType::Pac,
                chemical_concentration: 0.1,
                num_filters: 1,
                num_clarifiers: 1,
            },
        };
        let value = serde_json::to_value(&created).unwrap();
        assert_eq!(value["name"], "AguaClara");
        assert_eq!(value["config_id"], 4);
        assert_eq!(value["config"]["chemical_type"], "PAC");
    }
}
