//! Record store: schema, row types and queries
//!
//! Query functions take any sqlx executor so they run equally against the
//! pool or inside a transaction.

pub mod configurations;
pub mod init;
pub mod models;
pub mod plants;
pub mod users;

pub use init::*;
pub use models::*;
