//! Database models
//!
//! Relationships are plain identifier columns (`config_id`, `plant_id`);
//! related rows are looked up explicitly, never embedded.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Coagulant dosed at a plant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChemicalType {
    #[serde(rename = "PAC")]
    Pac,
    #[serde(rename = "AL2SO43")]
    Al2So43,
}

impl ChemicalType {
    /// Every accepted chemical, in declaration order
    pub const ALL: [ChemicalType; 2] = [ChemicalType::Pac, ChemicalType::Al2So43];

    /// Wire and storage spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            ChemicalType::Pac => "PAC",
            ChemicalType::Al2So43 => "AL2SO43",
        }
    }
}

impl fmt::Display for ChemicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown chemical type: {0}")]
pub struct ParseChemicalTypeError(pub String);

impl FromStr for ChemicalType {
    type Err = ParseChemicalTypeError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        ChemicalType::ALL
            .into_iter()
            .find(|chemical| chemical.as_str() == s)
            .ok_or_else(|| ParseChemicalTypeError(s.to_string()))
    }
}

/// Water-treatment plant (`plants` table)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Plant {
    pub id: i64,
    pub name: String,
    pub phone_number: String,
    pub config_id: i64,
}

/// Chemical-dosing parameters owned by exactly one plant (`configurations` table)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    pub id: i64,
    pub chemical_type: ChemicalType,
    pub chemical_concentration: f64,
    pub num_filters: i64,
    pub num_clarifiers: i64,
}

// Manual impl: chemical_type is stored as TEXT and parsed on the way out.
impl<'r> FromRow<'r, SqliteRow> for Configuration {
    fn from_row(row: &'r SqliteRow) -> std::result::Result<Self, sqlx::Error> {
        let chemical: String = row.try_get("chemical_type")?;
        let chemical_type = chemical.parse().map_err(|e| sqlx::Error::ColumnDecode {
            index: "chemical_type".to_string(),
            source: Box::new(e),
        })?;

        Ok(Configuration {
            id: row.try_get("id")?,
            chemical_type,
            chemical_concentration: row.try_get("chemical_concentration")?,
            num_filters: row.try_get("num_filters")?,
            num_clarifiers: row.try_get("num_clarifiers")?,
        })
    }
}

/// Plant operator (`users` table)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub plant_id: i64,
}

/// Dosage log entry (`dosage_entries` table)
///
/// Calibration and change-dose sections are optional; a calibration is
/// required whenever the dose is changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct DosageEntry {
    pub id: i64,
    pub created_at: NaiveDateTime,
    pub is_deleted: bool,
    pub user_id: i64,
    pub calibration_id: Option<i64>,
    pub change_dose_id: Option<i64>,
}

/// Calibration run attached to a dosage entry (`calibrations` table)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct CalibrationSection {
    pub id: i64,
    pub slider_position: f64,
    pub inflow_rate: i64,
    pub starting_volume: i64,
    pub ending_volume: i64,
    pub elapsed_seconds: i64,
    pub calculated_flow_rate: f64,
    pub calculated_chemical_dose: f64,
    pub slider_pos_chem_dose_ratio: f64,
    pub dosage_entry_id: i64,
}

/// Dose change attached to a dosage entry (`change_doses` table)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ChangeDoseSection {
    pub id: i64,
    pub target_coagulant_dose: f64,
    pub new_slider_position: f64,
    pub dosage_entry_id: i64,
    pub related_calibration_id: Option<i64>,
}

/// Raw-water turbidity reading (`raw_water_entries` table)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct RawWaterEntry {
    pub id: i64,
    pub utn: i64,
    pub turbidity_method: Option<String>,
    pub user_id: i64,
}
