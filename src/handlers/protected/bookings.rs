use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::Value;

use crate::app::AppState;
use crate::database::{Collection, Document};
use crate::error::ApiError;
use crate::middleware::AuthUser;

#[derive(Debug, Deserialize)]
pub struct BookingQuery {
    pub email: Option<String>,
}

/// GET /bookings?email= - the caller's own bookings
///
/// The queried email must equal the token's email claim; a mismatch is
/// rejected with 403 rather than filtered (an empty `email=` is a mismatch
/// too). Only when `email` is absent is the caller's own identity used.
pub async fn bookings_get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<BookingQuery>,
) -> Result<Json<Vec<Document>>, ApiError> {
    let Some(caller) = user.email.as_deref() else {
        tracing::warn!("Token without email claim tried to list bookings");
        return Err(ApiError::forbidden("forbidden"));
    };

    let email = query.email.as_deref().unwrap_or(caller);

    if email != caller {
        tracing::warn!("{} attempted to list bookings of {}", caller, email);
        return Err(ApiError::forbidden("forbidden"));
    }

    let bookings = state
        .store
        .find_by_field(Collection::Bookings, "email", &Value::String(email.to_string()))
        .await?;
    Ok(Json(bookings))
}
