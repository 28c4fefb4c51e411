use axum::{
    extract::{Path, State},
    Json,
};

use crate::app::AppState;
use crate::database::{Collection, Document};
use crate::error::ApiError;
use crate::handlers::parse_id;

/// Fields returned by the single-service lookup
pub const SERVICE_PROJECTION: &[&str] = &["title", "price", "service_id", "img"];

/// GET /services - every service document, unfiltered
pub async fn services_get(State(state): State<AppState>) -> Result<Json<Vec<Document>>, ApiError> {
    let services = state.store.find_all(Collection::Services).await?;
    Ok(Json(services))
}

/// GET /services/:id - one service, projected to its card fields
///
/// An unknown id is not an error: the body is `null`.
pub async fn service_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Option<Document>>, ApiError> {
    let id = parse_id(&id)?;
    let service = state
        .store
        .find_by_id(Collection::Services, id, Some(SERVICE_PROJECTION))
        .await?;
    Ok(Json(service))
}
