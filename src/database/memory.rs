use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::store::{
    project, with_id, Collection, DeleteResult, Document, DocumentStore, InsertOneResult, StoreError,
    UpdateResult, ID_FIELD,
};

/// Process-local store used for tests and `memory://` development runs.
/// Documents keep insertion order per collection.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<Collection, Vec<(Uuid, Document)>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents currently held in `collection`.
    pub async fn len(&self, collection: Collection) -> usize {
        self.collections
            .read()
            .await
            .get(&collection)
            .map_or(0, Vec::len)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn find_all(&self, collection: Collection) -> Result<Vec<Document>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .map(|docs| docs.iter().map(|(id, body)| with_id(*id, body.clone())).collect())
            .unwrap_or_default())
    }

    async fn find_by_id(
        &self,
        collection: Collection,
        id: Uuid,
        projection: Option<&[&str]>,
    ) -> Result<Option<Document>, StoreError> {
        let collections = self.collections.read().await;
        let found = collections
            .get(&collection)
            .and_then(|docs| docs.iter().find(|(doc_id, _)| *doc_id == id))
            .map(|(doc_id, body)| with_id(*doc_id, body.clone()));

        Ok(match (found, projection) {
            (Some(doc), Some(fields)) => Some(project(doc, fields)),
            (found, _) => found,
        })
    }

    async fn find_by_field(
        &self,
        collection: Collection,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .map(|docs| {
                docs.iter()
                    .filter(|(_, body)| body.get(field) == Some(value))
                    .map(|(id, body)| with_id(*id, body.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn insert_one(&self, collection: Collection, mut document: Document) -> Result<InsertOneResult, StoreError> {
        document.remove(ID_FIELD);
        let id = Uuid::new_v4();

        self.collections
            .write()
            .await
            .entry(collection)
            .or_default()
            .push((id, document));

        Ok(InsertOneResult {
            acknowledged: true,
            inserted_id: id,
        })
    }

    async fn delete_one(&self, collection: Collection, id: Uuid) -> Result<DeleteResult, StoreError> {
        let mut collections = self.collections.write().await;
        let deleted_count = match collections.get_mut(&collection) {
            Some(docs) => match docs.iter().position(|(doc_id, _)| *doc_id == id) {
                Some(index) => {
                    docs.remove(index);
                    1
                }
                None => 0,
            },
            None => 0,
        };

        Ok(DeleteResult {
            acknowledged: true,
            deleted_count,
        })
    }

    async fn set_field(
        &self,
        collection: Collection,
        id: Uuid,
        field: &str,
        value: Value,
    ) -> Result<UpdateResult, StoreError> {
        let mut collections = self.collections.write().await;
        let target = collections
            .get_mut(&collection)
            .and_then(|docs| docs.iter_mut().find(|(doc_id, _)| *doc_id == id));

        let Some((_, body)) = target else {
            return Ok(UpdateResult::new(0, 0));
        };
        if body.get(field) == Some(&value) {
            return Ok(UpdateResult::new(1, 0));
        }
        body.insert(field.to_string(), value);
        Ok(UpdateResult::new(1, 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[tokio::test]
    async fn insert_ignores_client_id_and_find_returns_generated_one() {
        let store = MemoryStore::new();
        let result = store
            .insert_one(Collection::Bookings, doc(json!({ "_id": "client", "email": "a@x.com" })))
            .await
            .unwrap();

        let all = store.find_all(Collection::Bookings).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0]["_id"], json!(result.inserted_id.to_string()));
    }

    #[tokio::test]
    async fn find_by_field_matches_exact_values_only() {
        let store = MemoryStore::new();
        for email in ["a@x.com", "b@x.com", "a@x.com"] {
            store
                .insert_one(Collection::Bookings, doc(json!({ "email": email })))
                .await
                .unwrap();
        }
        let mine = store
            .find_by_field(Collection::Bookings, "email", &json!("a@x.com"))
            .await
            .unwrap();
        assert_eq!(mine.len(), 2);
        assert!(mine.iter().all(|d| d["email"] == "a@x.com"));
    }

    #[tokio::test]
    async fn second_delete_reports_zero() {
        let store = MemoryStore::new();
        let id = store
            .insert_one(Collection::Bookings, doc(json!({ "email": "a@x.com" })))
            .await
            .unwrap()
            .inserted_id;

        assert_eq!(store.delete_one(Collection::Bookings, id).await.unwrap().deleted_count, 1);
        assert_eq!(store.delete_one(Collection::Bookings, id).await.unwrap().deleted_count, 0);
        assert_eq!(store.len(Collection::Bookings).await, 0);
    }

    #[tokio::test]
    async fn set_field_counts_match_and_modification() {
        let store = MemoryStore::new();
        let id = store
            .insert_one(Collection::Bookings, doc(json!({ "status": "pending" })))
            .await
            .unwrap()
            .inserted_id;

        let missing = store
            .set_field(Collection::Bookings, Uuid::new_v4(), "status", json!("confirm"))
            .await
            .unwrap();
        assert_eq!((missing.matched_count, missing.modified_count), (0, 0));

        let changed = store
            .set_field(Collection::Bookings, id, "status", json!("confirm"))
            .await
            .unwrap();
        assert_eq!((changed.matched_count, changed.modified_count), (1, 1));

        let unchanged = store
            .set_field(Collection::Bookings, id, "status", json!("confirm"))
            .await
            .unwrap();
        assert_eq!((unchanged.matched_count, unchanged.modified_count), (1, 0));
    }

    #[tokio::test]
    async fn find_by_id_applies_projection() {
        let store = MemoryStore::new();
        let id = store
            .insert_one(
                Collection::Services,
                doc(json!({ "title": "Brake fix", "price": "40.00", "description": "full service" })),
            )
            .await
            .unwrap()
            .inserted_id;

        let found = store
            .find_by_id(Collection::Services, id, Some(&["title", "price"]))
            .await
            .unwrap()
            .unwrap();
        assert!(found.contains_key("_id"));
        assert!(!found.contains_key("description"));

        let missing = store
            .find_by_id(Collection::Services, Uuid::new_v4(), None)
            .await
            .unwrap();
        assert!(missing.is_none());
    }
}
