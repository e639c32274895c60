//! HTTP API handlers for aguadatos-api

pub mod health;
pub mod plants;
pub mod users;

pub use health::health_routes;
pub use plants::plant_routes;
pub use users::user_routes;
