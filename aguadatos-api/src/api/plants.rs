//! Plant endpoints
//!
//! | Method | Path                      | Success                         |
//! |--------|---------------------------|---------------------------------|
//! | POST   | /api/plants/              | 201 plant + embedded `config`   |
//! | GET    | /api/plants/              | 200 `{"plants": [...]}`         |
//! | GET    | /api/plants/:id           | 200 plant                       |
//! | DELETE | /api/plants/:id           | 200 deleted plant               |
//! | GET    | /api/plants/:id/users     | 200 `{"users": [...]}`          |
//!
//! Every path is also served with a trailing slash.

use aguadatos_common::registry::NewPlant;
use aguadatos_common::{Plant, User};
use axum::{
    extract::{rejection::JsonRejection, rejection::PathRejection, Path, State},
    response::Response,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;

use crate::response::{created, ok};
use crate::{ApiResult, AppState};

/// GET /api/plants/ response
#[derive(Debug, Serialize)]
pub struct PlantList {
    pub plants: Vec<Plant>,
}

/// GET /api/plants/:id/users response
#[derive(Debug, Serialize)]
pub struct PlantUsers {
    pub users: Vec<User>,
}

/// POST /api/plants/
///
/// **Request:** `{"name", "phone_number", "chemical_type", "chemical_concentration",
/// "num_filters", "num_clarifiers"}`
///
/// **Errors:**
/// - 400: missing field, unknown chemical, wrong field type
/// - 409: name or phone number already registered
/// - 500: storage failure (nothing is written)
pub async fn create_plant(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(body) = body?;
    let new = NewPlant::from_body(&body)?;
    let plant = state.registry.create_plant(new).await?;
    Ok(created(plant))
}

/// GET /api/plants/:id
pub async fn get_plant(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Response> {
    let Path(id) = id?;
    Ok(ok(state.registry.get_plant(id).await?))
}

/// GET /api/plants/
pub async fn list_plants(State(state): State<AppState>) -> ApiResult<Response> {
    let plants = state.registry.list_plants().await?;
    Ok(ok(PlantList { plants }))
}

/// DELETE /api/plants/:id
///
/// Removes the plant, its configuration and every user attached to it.
pub async fn delete_plant(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Response> {
    let Path(id) = id?;
    Ok(ok(state.registry.delete_plant(id).await?))
}

/// GET /api/plants/:id/users
pub async fn list_plant_users(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Response> {
    let Path(id) = id?;
    let users = state.registry.plant_users(id).await?;
    Ok(ok(PlantUsers { users }))
}

/// Build plant routes
pub fn plant_routes() -> Router<AppState> {
    Router::new()
        .route("/api/plants", get(list_plants).post(create_plant))
        .route("/api/plants/", get(list_plants).post(create_plant))
        .route("/api/plants/:id", get(get_plant).delete(delete_plant))
        .route("/api/plants/:id/", get(get_plant).delete(delete_plant))
        .route("/api/plants/:id/users", get(list_plant_users))
        .route("/api/plants/:id/users/", get(list_plant_users))
}
