use axum_extra::extract::cookie::{Cookie, SameSite};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Name of the cookie carrying the signed credential.
pub const TOKEN_COOKIE: &str = "token";

/// Claims embedded in an issued credential.
///
/// `email` is the only claim the server interprets; everything else the
/// caller supplied at login is carried through untouched in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub iat: i64,
    pub exp: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Claims {
    /// Build claims from a login payload, stamping a fresh validity window.
    pub fn from_payload(mut payload: Map<String, Value>, issued_at: DateTime<Utc>, ttl: Duration) -> Self {
        // Timestamps are always server-assigned
        payload.remove("iat");
        payload.remove("exp");

        // Only a string email counts as an identity; anything else is dropped
        let email = match payload.remove("email") {
            Some(Value::String(email)) => Some(email),
            _ => None,
        };

        Self {
            email,
            iat: issued_at.timestamp(),
            exp: (issued_at + ttl).timestamp(),
            extra: payload,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("Token secret not configured")]
    MissingSecret,

    #[error("Token generation error: {0}")]
    Signing(String),

    #[error("Invalid token: {0}")]
    Invalid(String),
}

/// Signs and verifies credentials with a single process-wide HMAC secret.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &str, ttl: Duration) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::MissingSecret);
        }

        let mut validation = Validation::default();
        validation.leeway = 0;
        // `aud` is a passthrough claim like any other, not an audience to enforce
        validation.validate_aud = false;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        })
    }

    /// Sign a login payload valid from now.
    pub fn issue(&self, payload: Map<String, Value>) -> Result<String, TokenError> {
        self.issue_at(payload, Utc::now())
    }

    pub fn issue_at(&self, payload: Map<String, Value>, issued_at: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = Claims::from_payload(payload, issued_at, self.ttl);
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Check signature and expiry, returning the decoded claims.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| TokenError::Invalid(e.to_string()))
    }
}

/// Session cookie holding a freshly issued token.
pub fn token_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((TOKEN_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::None)
        .build()
}

/// Expired `token` cookie instructing the client to drop its credential.
pub fn removal_cookie(secure: bool) -> Cookie<'static> {
    let mut cookie = token_cookie(String::new(), secure);
    cookie.make_removal();
    cookie
}
