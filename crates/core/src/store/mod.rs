//! Document store collaborator.
//!
//! Activity records and the entities they point at live in a document store.
//! The [`DocumentStore`] trait is the only contract the rest of the crate
//! relies on; two implementations ship with it:
//!
//! - [`MemoryStore`] keeps collections in process memory.
//! - [`SqliteStore`] keeps every collection in one SQLite table with JSON bodies.
//!
//! # Example
//!
//! ```no_run
//! use activitylog_core::store::{Document, DocumentQuery, DocumentStore, SqliteStore};
//! use std::path::Path;
//!
//! let store = SqliteStore::open(Path::new("activity.db")).unwrap();
//! let mut post = Document::new("Post").with_field("title", "hello");
//! store.save("posts", &mut post).unwrap();
//!
//! let found = store.find("posts", &DocumentQuery::new().filter("title", "hello")).unwrap();
//! assert_eq!(found.len(), 1);
//! ```

pub mod memory;
pub mod migrations;
pub mod sqlite;
pub mod types;

pub use memory::MemoryStore;
pub use migrations::{MigrationError, SCHEMA_VERSION};
pub use sqlite::SqliteStore;
pub use types::{Document, DocumentId, DocumentQuery, Order};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] MigrationError),

    #[error("Failed to serialize document: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Document {id} not found in collection '{collection}'")]
    NotFound { collection: String, id: DocumentId },

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Store lock poisoned")]
    Poisoned,
}

/// Persistence contract for schemaless documents grouped into collections.
pub trait DocumentStore {
    /// Insert or update a document.
    ///
    /// A document without an id is inserted and receives a fresh id. A
    /// document with an id replaces the stored one, which must exist.
    fn save(&self, collection: &str, doc: &mut Document) -> Result<(), StoreError>;

    fn find_by_id(
        &self,
        collection: &str,
        id: &DocumentId,
    ) -> Result<Option<Document>, StoreError>;

    fn find(
        &self,
        collection: &str,
        query: &DocumentQuery,
    ) -> Result<Vec<Document>, StoreError>;

    fn find_one(
        &self,
        collection: &str,
        query: &DocumentQuery,
    ) -> Result<Option<Document>, StoreError> {
        let query = query.clone().limit(1);
        Ok(self.find(collection, &query)?.into_iter().next())
    }

    /// Delete every document matching the query. The limit is ignored.
    fn delete(&self, collection: &str, query: &DocumentQuery) -> Result<usize, StoreError>;

    fn count(&self, collection: &str, query: &DocumentQuery) -> Result<usize, StoreError> {
        Ok(self.find(collection, query)?.len())
    }
}
