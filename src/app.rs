use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderValue, Method, StatusCode},
    middleware::from_fn_with_state,
    response::{IntoResponse, Json},
    routing::{get, patch, post},
    Router,
};
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::TokenIssuer;
use crate::config::AppConfig;
use crate::database::DocumentStore;
use crate::error::ApiError;
use crate::handlers::{protected, public};
use crate::middleware::require_token;

/// Shared, read-only dependencies handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub tokens: Arc<TokenIssuer>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>, tokens: TokenIssuer, config: AppConfig) -> Self {
        Self {
            store,
            tokens: Arc::new(tokens),
            config: Arc::new(config),
        }
    }
}

pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(auth_routes())
        .merge(service_routes())
        .merge(booking_routes(&state))
        .fallback(fallback)
        // Global middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/jwt", post(public::jwt_post))
        .route("/logout", post(public::logout_post))
}

fn service_routes() -> Router<AppState> {
    Router::new()
        .route("/services", get(public::services_get))
        .route("/services/:id", get(public::service_get))
}

fn booking_routes(state: &AppState) -> Router<AppState> {
    let gate = from_fn_with_state(state.clone(), require_token);

    let listing = Router::new()
        .route("/bookings", get(protected::bookings_get))
        .route_layer(gate.clone());

    let mut mutations = Router::new().route(
        "/bookings/:id",
        patch(public::booking_patch).delete(public::booking_delete),
    );
    if state.config.security.protect_mutations {
        mutations = mutations.route_layer(gate);
    }

    // POST shares the listing path but stays public
    Router::new()
        .route("/bookings", post(public::booking_post))
        .merge(listing)
        .merge(mutations)
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
}

async fn root() -> &'static str {
    "server running"
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.ping().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "data": {
                        "status": "degraded",
                        "timestamp": now
                    }
                })),
            )
        }
    }
}

async fn fallback() -> ApiError {
    ApiError::not_found("route not found")
}
