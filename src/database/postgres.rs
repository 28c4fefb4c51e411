use async_trait::async_trait;
use serde_json::Value;
use sqlx::{postgres::PgPoolOptions, types::Json, PgPool, Row};
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

use super::store::{
    project, with_id, Collection, DeleteResult, Document, DocumentStore, InsertOneResult, StoreError,
    UpdateResult, ID_FIELD,
};

/// PostgreSQL backend storing each collection as a table of JSONB documents.
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub async fn connect(
        connection_string: &str,
        max_connections: u32,
        connection_timeout_secs: u64,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(connection_timeout_secs))
            .connect(connection_string)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        info!("Created database pool (max {} connections)", max_connections);
        Ok(Self { pool })
    }

    /// Create collection tables that do not exist yet.
    pub async fn ensure_collections(&self) -> Result<(), StoreError> {
        for collection in Collection::all() {
            let sql = format!(
                "CREATE TABLE IF NOT EXISTS {} (
                    id UUID PRIMARY KEY,
                    doc JSONB NOT NULL,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
                )",
                quote_identifier(collection.name())
            );
            sqlx::query(&sql).execute(&self.pool).await?;
        }
        Ok(())
    }

    fn row_to_document(row: &sqlx::postgres::PgRow) -> Result<Document, StoreError> {
        let id: Uuid = row.try_get("id")?;
        let Json(doc): Json<Value> = row.try_get("doc")?;
        match doc {
            Value::Object(body) => Ok(with_id(id, body)),
            other => Err(StoreError::Query(format!(
                "document {} is not an object: {}",
                id, other
            ))),
        }
    }
}

/// Quote SQL identifier to prevent injection
fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn find_all(&self, collection: Collection) -> Result<Vec<Document>, StoreError> {
        let sql = format!(
            "SELECT id, doc FROM {} ORDER BY created_at, id",
            quote_identifier(collection.name())
        );
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(Self::row_to_document).collect()
    }

    async fn find_by_id(
        &self,
        collection: Collection,
        id: Uuid,
        projection: Option<&[&str]>,
    ) -> Result<Option<Document>, StoreError> {
        let sql = format!(
            "SELECT id, doc FROM {} WHERE id = $1",
            quote_identifier(collection.name())
        );
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let document = Self::row_to_document(&row)?;
        Ok(Some(match projection {
            Some(fields) => project(document, fields),
            None => document,
        }))
    }

    async fn find_by_field(
        &self,
        collection: Collection,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>, StoreError> {
        let sql = format!(
            "SELECT id, doc FROM {} WHERE doc -> $1::text = $2::jsonb ORDER BY created_at, id",
            quote_identifier(collection.name())
        );
        let rows = sqlx::query(&sql)
            .bind(field)
            .bind(Json(value))
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(Self::row_to_document).collect()
    }

    async fn insert_one(&self, collection: Collection, mut document: Document) -> Result<InsertOneResult, StoreError> {
        // Ids are always server-generated
        document.remove(ID_FIELD);
        let id = Uuid::new_v4();

        let sql = format!(
            "INSERT INTO {} (id, doc) VALUES ($1, $2)",
            quote_identifier(collection.name())
        );
        sqlx::query(&sql)
            .bind(id)
            .bind(Json(Value::Object(document)))
            .execute(&self.pool)
            .await?;

        Ok(InsertOneResult {
            acknowledged: true,
            inserted_id: id,
        })
    }

    async fn delete_one(&self, collection: Collection, id: Uuid) -> Result<DeleteResult, StoreError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", quote_identifier(collection.name()));
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;

        Ok(DeleteResult {
            acknowledged: true,
            deleted_count: result.rows_affected(),
        })
    }

    async fn set_field(
        &self,
        collection: Collection,
        id: Uuid,
        field: &str,
        value: Value,
    ) -> Result<UpdateResult, StoreError> {
        // Matched and modified counts come back from one statement
        let table = quote_identifier(collection.name());
        let sql = format!(
            "WITH target AS (
                SELECT id, (doc -> $2::text) IS DISTINCT FROM $3::jsonb AS changed FROM {table} WHERE id = $1
            ),
            updated AS (
                UPDATE {table} t SET doc = jsonb_set(t.doc, ARRAY[$2::text], $3::jsonb, true)
                FROM target WHERE t.id = target.id AND target.changed
                RETURNING t.id
            )
            SELECT (SELECT COUNT(*) FROM target) AS matched,
                   (SELECT COUNT(*) FROM updated) AS modified"
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(field)
            .bind(Json(value))
            .fetch_one(&self.pool)
            .await?;

        let matched: i64 = row.try_get("matched")?;
        let modified: i64 = row.try_get("modified")?;
        Ok(UpdateResult::new(matched as u64, modified as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_identifiers() {
        assert_eq!(quote_identifier("booking"), "\"booking\"");
        assert_eq!(quote_identifier("a\"b"), "\"a\"\"b\"");
    }
}
