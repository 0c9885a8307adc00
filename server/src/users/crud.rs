use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use super::store;
use crate::db::with_conn;
use crate::events::projection::UserPublic;
use crate::pagination::Pagination;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
}

/// POST /users/ — Register a user.
pub async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> Result<Json<UserPublic>, (StatusCode, String)> {
    let name = req.name.trim().to_string();
    if name.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "User name cannot be empty".to_string(),
        ));
    }

    let user = with_conn(&state.db, move |conn| store::insert_user(conn, &name)).await?;
    tracing::info!(user_id = user.id, name = %user.name, "User created");

    Ok(Json(UserPublic::from(&user)))
}

/// GET /users/ — List users, paged by offset/limit.
pub async fn list_users(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<UserPublic>>, (StatusCode, String)> {
    let page = page.validate()?;
    let users = with_conn(&state.db, move |conn| {
        store::list_users(conn, page.offset, page.limit)
    })
    .await?;

    Ok(Json(users.iter().map(UserPublic::from).collect()))
}

/// GET /users/{id} — Fetch one user.
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<UserPublic>, (StatusCode, String)> {
    let user = with_conn(&state.db, move |conn| store::get_user(conn, user_id)).await?;
    Ok(Json(UserPublic::from(&user)))
}
