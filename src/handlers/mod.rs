// handlers/mod.rs - two-tier handler layout
//
// Public (no token) → Protected (token cookie verified by middleware::require_token)
pub mod protected;
pub mod public;

use uuid::Uuid;

use crate::error::ApiError;

/// Parse a path id, rejecting anything that is not a UUID with 400.
pub(crate) fn parse_id(id: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id).map_err(|_| ApiError::bad_request(format!("invalid id '{}'", id)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_id_accepts_uuids_only() {
        let id = Uuid::new_v4();
        assert_eq!(parse_id(&id.to_string()).unwrap(), id);
        assert!(matches!(parse_id("65a1f0c2e4b0"), Err(ApiError::BadRequest(_))));
    }
}
