use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

/// A stored JSON object. The id is surfaced as the `_id` field on reads.
pub type Document = Map<String, Value>;

/// Field carrying a document's id in API payloads.
pub const ID_FIELD: &str = "_id";

/// Errors from a document store backend
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Named collections held by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Services,
    Bookings,
}

impl Collection {
    /// Physical collection (table) name.
    pub fn name(&self) -> &'static str {
        match self {
            Collection::Services => "services",
            Collection::Bookings => "booking",
        }
    }

    pub fn all() -> [Collection; 2] {
        [Collection::Services, Collection::Bookings]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertOneResult {
    pub acknowledged: bool,
    pub inserted_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResult {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
    pub upserted_count: u64,
    pub upserted_id: Option<Uuid>,
}

impl UpdateResult {
    pub fn new(matched_count: u64, modified_count: u64) -> Self {
        Self {
            acknowledged: true,
            matched_count,
            modified_count,
            upserted_count: 0,
            upserted_id: None,
        }
    }
}

/// Document store operations. Every method is a single round-trip.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Connectivity probe
    async fn ping(&self) -> Result<(), StoreError>;

    async fn find_all(&self, collection: Collection) -> Result<Vec<Document>, StoreError>;

    /// Look up one document; `projection` limits the returned fields (`_id` is always kept).
    async fn find_by_id(
        &self,
        collection: Collection,
        id: Uuid,
        projection: Option<&[&str]>,
    ) -> Result<Option<Document>, StoreError>;

    /// Documents whose top-level `field` equals `value`.
    async fn find_by_field(
        &self,
        collection: Collection,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>, StoreError>;

    async fn insert_one(&self, collection: Collection, document: Document) -> Result<InsertOneResult, StoreError>;

    async fn delete_one(&self, collection: Collection, id: Uuid) -> Result<DeleteResult, StoreError>;

    /// Set a single top-level field on one document.
    async fn set_field(
        &self,
        collection: Collection,
        id: Uuid,
        field: &str,
        value: Value,
    ) -> Result<UpdateResult, StoreError>;
}

/// Attach the id to a stored body for API output.
pub fn with_id(id: Uuid, mut body: Document) -> Document {
    body.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
    body
}

/// Restrict a document to `fields` plus `_id`.
pub fn project(document: Document, fields: &[&str]) -> Document {
    document
        .into_iter()
        .filter(|(key, _)| key == ID_FIELD || fields.contains(&key.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn projection_keeps_id_and_listed_fields() {
        let id = Uuid::new_v4();
        let doc = match json!({ "title": "Oil change", "price": 20, "description": "long text" }) {
            Value::Object(map) => with_id(id, map),
            _ => unreachable!(),
        };
        let projected = project(doc, &["title", "price", "img"]);
        assert_eq!(projected.len(), 3);
        assert_eq!(projected["_id"], json!(id.to_string()));
        assert!(!projected.contains_key("description"));
    }

    #[test]
    fn results_serialize_with_driver_field_names() {
        let value = serde_json::to_value(UpdateResult::new(1, 0)).unwrap();
        assert_eq!(value["matchedCount"], 1);
        assert_eq!(value["modifiedCount"], 0);
        assert_eq!(value["upsertedId"], Value::Null);

        let value = serde_json::to_value(DeleteResult { acknowledged: true, deleted_count: 1 }).unwrap();
        assert_eq!(value["deletedCount"], 1);
    }

    #[test]
    fn booking_collection_keeps_singular_name() {
        assert_eq!(Collection::Bookings.name(), "booking");
        assert_eq!(Collection::Services.name(), "services");
    }
}
