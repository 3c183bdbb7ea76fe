//! Document store.
//!
//! The shop keeps every record as a JSON document inside a named collection.
//! [`DocumentStore`] is the only way the binaries touch persistence; typed
//! repositories on top of it decode documents into `coronda-core` records.
//!
//! Writes to different documents are independent. Nothing here offers
//! multi-document transactions, so callers that write twice (a sale and the
//! user's `saleIds`) must tolerate the second write failing.

mod catalog;
mod collection;
mod content;
#[cfg(any(test, feature = "test-util"))]
mod memory;
mod postgres;
mod sales;
mod users;

use async_trait::async_trait;
use rand::Rng;
use rand::distr::Alphanumeric;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;

pub use catalog::{CategoryRepository, ProductRepository};
pub use collection::{Collection, Record};
pub use content::{AdvertisementRepository, SettingsRepository};
#[cfg(any(test, feature = "test-util"))]
pub use memory::MemoryDocumentStore;
pub use postgres::PgDocumentStore;
pub use sales::SaleRepository;
pub use users::UserRepository;

/// Collection names.
pub mod collections {
    pub const PRODUCTS: &str = "products";
    pub const CATEGORIES: &str = "categories";
    pub const SALES: &str = "sales";
    pub const USERS: &str = "users";
    pub const ADVERTISEMENTS: &str = "advertisements";
    pub const SETTINGS: &str = "settings";
}

/// Length of generated document ids.
pub const DOCUMENT_ID_LENGTH: usize = 20;

/// A JSON object body.
pub type JsonMap = Map<String, Value>;

/// A stored document: its id and body.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: JsonMap,
}

/// Errors from document store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database query failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored document could not be decoded into its record type.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// A record could not be encoded as a JSON object.
    #[error("encode error: {0}")]
    Encode(String),

    /// Referenced document does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Operation conflicts with existing data.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Store not reachable.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Access to named collections of JSON documents.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// All documents in a collection, oldest first.
    async fn list(&self, collection: &str) -> Result<Vec<Document>, StoreError>;

    /// One document, or `None` if it does not exist.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    /// Create a document with a generated id and return the id.
    async fn insert(&self, collection: &str, data: JsonMap) -> Result<String, StoreError>;

    /// Create the document or shallow-merge `data` into it.
    ///
    /// Top-level keys in `data` replace the stored ones; other stored keys
    /// survive.
    async fn merge(&self, collection: &str, id: &str, data: JsonMap) -> Result<(), StoreError>;

    /// Delete a document. Deleting a missing document succeeds.
    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError>;
}

/// Generate a 20-character alphanumeric document id.
#[must_use]
pub fn generate_document_id() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(DOCUMENT_ID_LENGTH)
        .map(char::from)
        .collect()
}

/// Serialize a record into a document body, dropping any `id` key.
///
/// # Errors
///
/// Returns `StoreError::Encode` if the value does not serialize to a JSON
/// object.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<JsonMap, StoreError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(mut map)) => {
            map.remove("id");
            Ok(map)
        }
        Ok(other) => Err(StoreError::Encode(format!(
            "expected a JSON object, got {other}"
        ))),
        Err(e) => Err(StoreError::Encode(e.to_string())),
    }
}

/// Decode a document into a record, injecting its id.
///
/// # Errors
///
/// Returns `StoreError::DataCorruption` naming the collection and id when the
/// body does not match the record shape.
pub fn decode<T: DeserializeOwned>(collection: &str, doc: Document) -> Result<T, StoreError> {
    let Document { id, mut data } = doc;
    data.insert("id".to_owned(), Value::String(id.clone()));
    serde_json::from_value(Value::Object(data))
        .map_err(|e| StoreError::DataCorruption(format!("{collection}/{id}: {e}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Thing {
        id: String,
        name: String,
    }

    #[test]
    fn test_generate_document_id() {
        let id = generate_document_id();
        assert_eq!(id.len(), DOCUMENT_ID_LENGTH);
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(id, generate_document_id());
    }

    #[test]
    fn test_encode_strips_id() {
        let body = encode(&Thing {
            id: "t1".to_owned(),
            name: "mate".to_owned(),
        })
        .unwrap();
        assert!(!body.contains_key("id"));
        assert_eq!(body.get("name"), Some(&Value::String("mate".to_owned())));
    }

    #[test]
    fn test_encode_rejects_non_objects() {
        assert!(matches!(encode(&42), Err(StoreError::Encode(_))));
    }

    #[test]
    fn test_decode_injects_id() {
        let mut data = JsonMap::new();
        data.insert("name".to_owned(), Value::String("yerba".to_owned()));
        let thing: Thing = decode(
            "things",
            Document {
                id: "t2".to_owned(),
                data,
            },
        )
        .unwrap();
        assert_eq!(thing.id, "t2");
    }

    #[test]
    fn test_decode_reports_collection_and_id() {
        let err = decode::<Thing>(
            "things",
            Document {
                id: "broken".to_owned(),
                data: JsonMap::new(),
            },
        )
        .unwrap_err();
        assert!(err.to_string().contains("things/broken"));
    }
}
