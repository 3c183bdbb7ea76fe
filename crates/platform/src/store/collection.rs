//! Typed access to one collection.

use std::marker::PhantomData;

use serde::Serialize;
use serde::de::DeserializeOwned;

use coronda_core::{Advertisement, Category, Product, Sale, StoredUser};

use super::{DocumentStore, StoreError, collections, decode, encode};

/// A record stored in a fixed collection.
pub trait Record: Serialize + DeserializeOwned + Send + Sync {
    /// Collection the record lives in.
    const COLLECTION: &'static str;

    /// The record's document id.
    fn document_id(&self) -> &str;
}

impl Record for Product {
    const COLLECTION: &'static str = collections::PRODUCTS;

    fn document_id(&self) -> &str {
        self.id.as_str()
    }
}

impl Record for Category {
    const COLLECTION: &'static str = collections::CATEGORIES;

    fn document_id(&self) -> &str {
        self.id.as_str()
    }
}

impl Record for Sale {
    const COLLECTION: &'static str = collections::SALES;

    fn document_id(&self) -> &str {
        self.id.as_str()
    }
}

impl Record for StoredUser {
    const COLLECTION: &'static str = collections::USERS;

    fn document_id(&self) -> &str {
        self.id.as_str()
    }
}

impl Record for Advertisement {
    const COLLECTION: &'static str = collections::ADVERTISEMENTS;

    fn document_id(&self) -> &str {
        self.id.as_str()
    }
}

/// The get-all / get-by-id / upsert / delete helpers for one record type.
pub struct Collection<'a, T> {
    store: &'a dyn DocumentStore,
    _record: PhantomData<fn() -> T>,
}

impl<'a, T: Record> Collection<'a, T> {
    /// Bind a collection to a store.
    #[must_use]
    pub fn new(store: &'a dyn DocumentStore) -> Self {
        Self {
            store,
            _record: PhantomData,
        }
    }

    /// Every record in the collection.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::DataCorruption` if any document fails to decode.
    pub async fn list(&self) -> Result<Vec<T>, StoreError> {
        self.store
            .list(T::COLLECTION)
            .await?
            .into_iter()
            .map(|doc| decode(T::COLLECTION, doc))
            .collect()
    }

    /// One record by id.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the read fails or the document is malformed.
    pub async fn get(&self, id: &str) -> Result<Option<T>, StoreError> {
        self.store
            .get(T::COLLECTION, id)
            .await?
            .map(|doc| decode(T::COLLECTION, doc))
            .transpose()
    }

    /// Insert a body with a generated id and return the id.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if encoding or the write fails.
    pub async fn insert<B: Serialize + Sync + ?Sized>(&self, body: &B) -> Result<String, StoreError> {
        self.store.insert(T::COLLECTION, encode(body)?).await
    }

    /// Create or shallow-merge a record under its own id.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if encoding or the write fails.
    pub async fn upsert(&self, record: &T) -> Result<(), StoreError> {
        self.store
            .merge(T::COLLECTION, record.document_id(), encode(record)?)
            .await
    }

    /// Shallow-merge a partial body into the document `id`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if encoding or the write fails.
    pub async fn merge<B: Serialize + Sync + ?Sized>(&self, id: &str, body: &B) -> Result<(), StoreError> {
        self.store.merge(T::COLLECTION, id, encode(body)?).await
    }

    /// Delete a record by id.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the delete fails.
    pub async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.store.delete(T::COLLECTION, id).await
    }
}
