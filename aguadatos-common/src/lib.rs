//! # AguaDatos Common Library
//!
//! Shared code for the AguaDatos plant record-keeping backend:
//! - Database schema, row types and queries (the record store)
//! - Required-field extraction for submitted JSON bodies
//! - The plant registry, which keeps plants, their configurations and
//!   their operators consistent across creates and deletes
//! - Configuration resolution

pub mod config;
pub mod db;
pub mod error;
pub mod registry;
pub mod validation;

pub use db::models::{ChemicalType, Configuration, Plant, User};
pub use error::{Error, PlantConflict, Result, UserConflict};
pub use registry::PlantRegistry;
