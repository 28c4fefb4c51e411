pub mod memory;
pub mod postgres;
pub mod store;

use std::sync::Arc;
use tracing::info;

pub use memory::MemoryStore;
pub use postgres::PgDocumentStore;
pub use store::{
    Collection, DeleteResult, Document, DocumentStore, InsertOneResult, StoreError, UpdateResult, ID_FIELD,
};

use crate::config::DatabaseConfig;

/// Open the store named by the configured URL: `memory://` selects the
/// in-process backend, anything else is handed to PostgreSQL.
pub async fn connect(config: &DatabaseConfig) -> Result<Arc<dyn DocumentStore>, StoreError> {
    if config.url.starts_with("memory:") {
        info!("Using in-memory document store");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let connection_string = config
        .connection_string()
        .map_err(|e| StoreError::Connection(e.to_string()))?;

    let store = PgDocumentStore::connect(
        &connection_string,
        config.max_connections,
        config.connection_timeout,
    )
    .await?;
    store.ensure_collections().await?;

    Ok(Arc::new(store))
}
