//! Database initialization
//!
//! Opens (or creates) the SQLite database and creates every table if it
//! does not exist yet. Safe to call on an already-initialized database.

use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

const BUSY_TIMEOUT: Duration = Duration::from_millis(5000);

/// Initialize database connection and create tables if needed
///
/// `location` is either a `sqlite:` URL or a plain file path.
pub async fn init_database(location: &str) -> Result<SqlitePool> {
    let options = if location.starts_with("sqlite:") {
        SqliteConnectOptions::from_str(location)?
    } else {
        let path = Path::new(location);
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        SqliteConnectOptions::new().filename(path)
    };

    let options = options
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(BUSY_TIMEOUT);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    info!("Opened database: {}", location);

    create_schema(&pool).await?;
    Ok(pool)
}

/// Initialize a private in-memory database
///
/// Every connection to `sqlite::memory:` is a separate database, so the
/// pool is pinned to a single connection that is never recycled.
pub async fn init_memory_database() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    create_schema(&pool).await?;
    Ok(pool)
}

/// Create all tables (idempotent)
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_configurations_table(pool).await?;
    create_plants_table(pool).await?;
    create_users_table(pool).await?;

    // Operational entry tables (no endpoints yet)
    create_dosage_entries_table(pool).await?;
    create_calibrations_table(pool).await?;
    create_change_doses_table(pool).await?;
    create_raw_water_entries_table(pool).await?;

    info!("Database schema ready");
    Ok(())
}

async fn create_configurations_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS configurations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            chemical_type TEXT NOT NULL CHECK (chemical_type IN ('PAC', 'AL2SO43')),
            chemical_concentration REAL NOT NULL CHECK (chemical_concentration > 0),
            num_filters INTEGER NOT NULL CHECK (num_filters >= 0),
            num_clarifiers INTEGER NOT NULL CHECK (num_clarifiers >= 0)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_plants_table(pool: &SqlitePool) -> Result<()> {
    // config_id UNIQUE: a configuration is never shared between plants
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS plants (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name VARCHAR(100) NOT NULL UNIQUE,
            phone_number VARCHAR(15) NOT NULL UNIQUE,
            config_id INTEGER NOT NULL UNIQUE REFERENCES configurations(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_users_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name VARCHAR(100) NOT NULL,
            email VARCHAR(255) NOT NULL UNIQUE,
            phone_number VARCHAR(15) NOT NULL UNIQUE,
            plant_id INTEGER NOT NULL REFERENCES plants(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_users_plant_id ON users(plant_id)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_dosage_entries_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS dosage_entries (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            is_deleted BOOLEAN NOT NULL DEFAULT 0,
            user_id INTEGER NOT NULL REFERENCES users(id),
            calibration_id INTEGER REFERENCES calibrations(id),
            change_dose_id INTEGER REFERENCES change_doses(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_calibrations_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS calibrations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            slider_position REAL NOT NULL,
            inflow_rate INTEGER NOT NULL,
            starting_volume INTEGER NOT NULL,
            ending_volume INTEGER NOT NULL,
            elapsed_seconds INTEGER NOT NULL,
            calculated_flow_rate REAL NOT NULL,
            calculated_chemical_dose REAL NOT NULL,
            slider_pos_chem_dose_ratio REAL NOT NULL,
            dosage_entry_id INTEGER NOT NULL REFERENCES dosage_entries(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_change_doses_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS change_doses (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            target_coagulant_dose REAL NOT NULL,
            new_slider_position REAL NOT NULL,
            dosage_entry_id INTEGER NOT NULL REFERENCES dosage_entries(id),
            related_calibration_id INTEGER REFERENCES calibrations(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_raw_water_entries_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS raw_water_entries (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            utn INTEGER NOT NULL,
            turbidity_method TEXT,
            user_id INTEGER NOT NULL REFERENCES users(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
