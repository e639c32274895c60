//! Common error types for AguaDatos

use std::fmt;
use thiserror::Error;

/// Common result type for AguaDatos operations
pub type Result<T> = std::result::Result<T, Error>;

/// Which unique plant column a create request collided with
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlantConflict {
    Name(String),
    PhoneNumber(String),
}

impl fmt::Display for PlantConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlantConflict::Name(name) => write!(f, "Plant '{}' already exists.", name),
            PlantConflict::PhoneNumber(phone) => {
                write!(f, "Phone number '{}' already exists.", phone)
            }
        }
    }
}

/// Which unique user column a create request collided with
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserConflict {
    Email(String),
    PhoneNumber(String),
}

impl fmt::Display for UserConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserConflict::Email(email) => write!(f, "User '{}' already in use.", email),
            UserConflict::PhoneNumber(phone) => {
                write!(f, "User phone number '{}' already in use.", phone)
            }
        }
    }
}

/// Error taxonomy shared by the record store and the plant registry
#[derive(Error, Debug)]
pub enum Error {
    /// One or more required request fields were absent or null
    #[error("{entity} missing {}", .fields.join(", "))]
    MissingField {
        entity: &'static str,
        fields: Vec<String>,
    },

    /// Value outside a closed set (e.g. an unknown chemical)
    #[error("{kind} '{value}' invalid.")]
    InvalidEnum { kind: &'static str, value: String },

    /// Field present but of the wrong type or out of range
    #[error("{0}")]
    InvalidInput(String),

    /// Plant name or phone number already registered
    #[error("{0}")]
    DuplicatePlant(PlantConflict),

    /// User email or phone number already registered
    #[error("{0}")]
    DuplicateUser(UserConflict),

    /// Referenced entity does not exist
    #[error("{0}")]
    NotFound(String),

    /// Persistence failure after validation passed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Storage(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// True when the error reflects a storage-level UNIQUE constraint hit
    pub fn is_unique_violation(&self) -> bool {
        match self {
            Error::Storage(sqlx::Error::Database(db_err)) => db_err.is_unique_violation(),
            _ => false,
        }
    }
}
