//! Document store
//!
//! Collection/id keyed JSON documents. Handlers depend on the
//! [`DocumentStore`] trait; [`SqliteDocumentStore`] is the concrete backend.

mod sqlite;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::db::DbError;

pub use sqlite::SqliteDocumentStore;

/// Store error types
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Database(#[from] DbError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Document not found: {collection}/{id}")]
    NotFound { collection: String, id: String },
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Database(DbError::Sqlite(err))
    }
}

impl From<r2d2::Error> for StoreError {
    fn from(err: r2d2::Error) -> Self {
        StoreError::Database(DbError::Connection(err))
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Equality filter on a (possibly dotted) field path
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: String,
    pub value: Value,
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// A single field write, e.g. `goals.bmr = 1695.6`
#[derive(Debug, Clone, PartialEq)]
pub struct FieldUpdate {
    pub path: String,
    pub value: Value,
}

impl FieldUpdate {
    pub fn new(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            path: path.into(),
            value: value.into(),
        }
    }

    /// Build an update from any serializable value (timestamps, enums)
    pub fn serialized<T: Serialize + ?Sized>(path: impl Into<String>, value: &T) -> StoreResult<Self> {
        Ok(Self {
            path: path.into(),
            value: serde_json::to_value(value)?,
        })
    }
}

/// Persistence collaborator used by the handlers
pub trait DocumentStore: Send + Sync {
    /// Fetch one document
    fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Value>>;

    /// Fetch all documents matching every filter, in insertion order
    fn query(&self, collection: &str, filters: &[Filter], limit: Option<usize>) -> StoreResult<Vec<Value>>;

    /// Insert or replace a document
    fn set(&self, collection: &str, id: &str, document: &Value) -> StoreResult<()>;

    /// Apply field writes to an existing document
    fn update(&self, collection: &str, id: &str, fields: &[FieldUpdate]) -> StoreResult<()>;

    /// Delete a document. Returns Ok(false) if it did not exist.
    fn delete(&self, collection: &str, id: &str) -> StoreResult<bool>;
}

/// Typed helpers over any [`DocumentStore`], including trait objects
pub trait DocumentStoreExt: DocumentStore {
    fn get_as<T: DeserializeOwned>(&self, collection: &str, id: &str) -> StoreResult<Option<T>> {
        match self.get(collection, id)? {
            Some(doc) => Ok(Some(serde_json::from_value(doc)?)),
            None => Ok(None),
        }
    }

    fn set_as<T: Serialize>(&self, collection: &str, id: &str, document: &T) -> StoreResult<()> {
        let value = serde_json::to_value(document)?;
        self.set(collection, id, &value)
    }

    fn exists(&self, collection: &str, id: &str) -> StoreResult<bool> {
        Ok(self.get(collection, id)?.is_some())
    }
}

impl<S: DocumentStore + ?Sized> DocumentStoreExt for S {}

/// Write `value` at a dotted `path`, creating intermediate objects
pub fn set_path(document: &mut Value, path: &str, value: Value) {
    let mut segments = path.split('.').peekable();
    let mut current = document;

    while let Some(segment) = segments.next() {
        if !current.is_object() {
            *current = Value::Object(Map::new());
        }
        let Value::Object(map) = current else {
            return;
        };

        if segments.peek().is_none() {
            map.insert(segment.to_string(), value);
            return;
        }
        current = map
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
}

/// Migrated in-memory store for tests
#[cfg(test)]
pub(crate) fn memory_store() -> SqliteDocumentStore {
    let database = crate::db::Database::in_memory().unwrap();
    database
        .with_conn(|conn| -> StoreResult<()> { Ok(crate::db::migrations::run_migrations(conn)?) })
        .unwrap();
    SqliteDocumentStore::new(database)
}
