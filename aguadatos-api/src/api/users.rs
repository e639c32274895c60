//! User endpoints

use aguadatos_common::registry::NewUser;
use aguadatos_common::User;
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

/// GET /api/users/ response
#[derive(Debug, Serialize)]
pub struct UserList {
    pub users: Vec<User>,
}

/// POST /api/users/
///
/// **Request:** `{"name", "email", "phone_number", "plant_name"}`
/// **Response:** 201 with the user and its plant under `plant`
///
/// **Errors:**
/// - 400: missing field or wrong field type
/// - 404: no plant with `plant_name`
/// - 409: email or phone number already registered
pub async fn create_user(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(body) = body?;
    let new = NewUser::from_body(&body)?;
    let user = state.registry.create_user(new).await?;
    Ok(created(user))
}

/// GET /api/users/:id
pub async fn get_user(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Response> {
    let Path(id) = id?;
    Ok(ok(state.registry.get_user(id).await?))
}

/// GET /api/users/
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Response> {
    let users = state.registry.list_users().await?;
    Ok(ok(UserList { users }))
}

/// DELETE /api/users/:id
pub async fn delete_user(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Response> {
    let Path(id) = id?;
    Ok(ok(state.registry.delete_user(id).await?))
}

/// Build user routes
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/api/users", get(list_users).post(create_user))
        .route("/api/users/", get(list_users).post(create_user))
        .route("/api/users/:id", get(get_user).delete(delete_user))
        .route("/api/users/:id/", get(get_user).delete(delete_user))
}
