use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use serde_json::Value;

use crate::app::AppState;
use crate::database::{Collection, DeleteResult, Document, InsertOneResult, UpdateResult};
use crate::error::ApiError;
use crate::handlers::parse_id;

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: Option<Value>,
}

/// POST /bookings - store the posted booking as-is
pub async fn booking_post(
    State(state): State<AppState>,
    Json(booking): Json<Document>,
) -> Result<Json<InsertOneResult>, ApiError> {
    let result = state.store.insert_one(Collection::Bookings, booking).await?;
    tracing::debug!("Created booking {}", result.inserted_id);
    Ok(Json(result))
}

/// DELETE /bookings/:id - remove one booking; a missing id reports zero deletions
pub async fn booking_delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResult>, ApiError> {
    let id = parse_id(&id)?;
    let result = state.store.delete_one(Collection::Bookings, id).await?;
    Ok(Json(result))
}

/// PATCH /bookings/:id - replace only the booking's `status`
///
/// The id comes from the path; other body fields are ignored.
pub async fn booking_patch(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<StatusUpdate>,
) -> Result<Json<UpdateResult>, ApiError> {
    let id = parse_id(&id)?;
    let status = match update.status {
        Some(Value::Null) | None => return Err(ApiError::bad_request("status is required")),
        Some(status) => status,
    };

    let result = state
        .store
        .set_field(Collection::Bookings, id, "status", status)
        .await?;
    Ok(Json(result))
}
