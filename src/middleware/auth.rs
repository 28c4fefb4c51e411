use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use serde_json::{Map, Value};

use crate::app::AppState;
use crate::auth::{Claims, TOKEN_COOKIE};
use crate::error::ApiError;

/// Authenticated caller context extracted from the token cookie
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub email: Option<String>,
    pub claims: Map<String, Value>,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            email: claims.email,
            claims: claims.extra,
        }
    }
}

/// Token verification gate: rejects the request with 401 unless the `token`
/// cookie carries a valid credential, then injects `AuthUser` for handlers.
pub async fn require_token(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token(&jar).ok_or_else(|| {
        tracing::warn!("Rejected {} {}: no token cookie", request.method(), request.uri().path());
        ApiError::unauthorized("unauthorized access")
    })?;

    let claims = state.tokens.verify(&token)?;

    request.extensions_mut().insert(AuthUser::from(claims));
    Ok(next.run(request).await)
}

/// Token value from the request cookies, if present and non-empty
fn extract_token(jar: &CookieJar) -> Option<String> {
    jar.get(TOKEN_COOKIE)
        .map(|cookie| cookie.value().trim().to_string())
        .filter(|token| !token.is_empty())
}
