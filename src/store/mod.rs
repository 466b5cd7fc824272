//! Document store seam.
//!
//! Handlers talk to storage only through [`DocumentStore`]: add, get, update,
//! delete and query on slash-separated collection paths such as `postings` or
//! `candidates/<id>/notes`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::filter::{validate_collection_path, DocumentQuery, FilterError};

pub mod memory;
pub mod postgres;

pub use memory::MemoryDocumentStore;
pub use postgres::PgDocumentStore;

/// Document body as stored, without its id
pub type DocumentData = Map<String, Value>;

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: DocumentData,
}

/// Acknowledgement returned for update and delete
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteAck {
    pub write_time: DateTime<Utc>,
}

impl WriteAck {
    pub fn now() -> Self {
        Self { write_time: Utc::now() }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid document id: {0}")]
    InvalidDocumentId(String),

    #[error("Stored document is not an object: {0}")]
    MalformedDocument(String),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error("{0}")]
    Backend(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Stores a new document and returns the id assigned to it
    async fn add(&self, collection: &str, data: DocumentData) -> Result<String, StoreError>;

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    /// Merges top-level fields into an existing document. Missing targets
    /// are acknowledged without writing anything.
    async fn update(&self, collection: &str, id: &str, data: DocumentData) -> Result<WriteAck, StoreError>;

    /// Removes a document. Missing targets are acknowledged.
    async fn delete(&self, collection: &str, id: &str) -> Result<WriteAck, StoreError>;

    async fn query(&self, collection: &str, query: &DocumentQuery) -> Result<Vec<Document>, StoreError>;

    async fn health_check(&self) -> Result<(), StoreError>;
}

pub(crate) fn check_collection(collection: &str) -> Result<(), StoreError> {
    validate_collection_path(collection)?;
    Ok(())
}

pub(crate) fn check_document(collection: &str, id: &str) -> Result<(), StoreError> {
    check_collection(collection)?;
    if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
        return Err(StoreError::InvalidDocumentId(id.to_string()));
    }
    Ok(())
}

pub(crate) fn new_document_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
