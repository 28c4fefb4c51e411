use axum::{extract::State, response::IntoResponse, Json};
use axum_extra::extract::cookie::CookieJar;
use serde_json::{json, Map, Value};

use crate::app::AppState;
use crate::auth::{removal_cookie, token_cookie};
use crate::error::ApiError;

/// POST /jwt - Issue a signed credential for the posted claims
///
/// The body is taken as the claims payload verbatim; no password or other
/// identity proof is checked before signing.
///
/// Expected Input:
/// ```json
/// { "email": "user@example.com" }
/// ```
///
/// Sets the `token` cookie and responds with `{ "success": true }`.
pub async fn jwt_post(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<Map<String, Value>>,
) -> Result<impl IntoResponse, ApiError> {
    let email = payload.get("email").and_then(Value::as_str).map(str::to_owned);
    let token = state.tokens.issue(payload)?;

    tracing::info!("Issued token for {}", email.as_deref().unwrap_or("<no email>"));

    let cookie = token_cookie(token, state.config.security.cookie_secure);
    Ok((jar.add(cookie), Json(json!({ "success": true }))))
}

/// POST /logout - Drop the client's credential cookie
///
/// Only the cookie is cleared. A token copied before logout stays valid until
/// it expires, as there is no server-side revocation list.
pub async fn logout_post(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Option<Json<Value>>,
) -> impl IntoResponse {
    let user = body.map(|Json(v)| v).unwrap_or(Value::Null);
    tracing::info!("logout {}", user);

    let cookie = removal_cookie(state.config.security.cookie_secure);
    (jar.add(cookie), Json(json!({ "success": true })))
}
