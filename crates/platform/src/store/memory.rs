//! In-memory document store for tests.

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::{Document, DocumentStore, JsonMap, StoreError, generate_document_id};

/// Documents ordered by insertion within each collection.
type CollectionData = Vec<(String, JsonMap)>;

/// A [`DocumentStore`] backed by process memory.
///
/// Failures can be injected to exercise partial-failure paths:
/// [`fail_all`](Self::fail_all) makes every call fail and
/// [`fail_writes_to`](Self::fail_writes_to) fails writes to one collection.
#[derive(Default)]
pub struct MemoryDocumentStore {
    data: RwLock<BTreeMap<String, CollectionData>>,
    fail_all: AtomicBool,
    failing_writes: RwLock<HashSet<String>>,
}

impl MemoryDocumentStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a document in place, replacing any existing body.
    ///
    /// `body` must be a JSON object; an `id` key inside it is dropped.
    pub async fn seed(&self, collection: &str, id: &str, body: Value) {
        let Value::Object(mut map) = body else {
            return;
        };
        map.remove("id");
        let mut data = self.data.write().await;
        let docs = data.entry(collection.to_owned()).or_default();
        if let Some(slot) = docs.iter_mut().find(|(doc_id, _)| doc_id == id) {
            slot.1 = map;
        } else {
            docs.push((id.to_owned(), map));
        }
    }

    /// Number of documents in a collection.
    pub async fn count(&self, collection: &str) -> usize {
        self.data.read().await.get(collection).map_or(0, Vec::len)
    }

    /// Raw body of a document, without failure injection.
    pub async fn raw(&self, collection: &str, id: &str) -> Option<JsonMap> {
        self.data
            .read()
            .await
            .get(collection)
            .and_then(|docs| docs.iter().find(|(doc_id, _)| doc_id == id))
            .map(|(_, body)| body.clone())
    }

    /// Make every subsequent call fail (or succeed again).
    pub fn fail_all(&self, fail: bool) {
        self.fail_all.store(fail, Ordering::SeqCst);
    }

    /// Make writes (insert, merge, delete) to `collection` fail.
    pub async fn fail_writes_to(&self, collection: &str) {
        self.failing_writes
            .write()
            .await
            .insert(collection.to_owned());
    }

    /// Remove all injected failures.
    pub async fn clear_failures(&self) {
        self.fail_all(false);
        self.failing_writes.write().await.clear();
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.fail_all.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected failure".to_owned()));
        }
        Ok(())
    }

    async fn check_writable(&self, collection: &str) -> Result<(), StoreError> {
        self.check_available()?;
        if self.failing_writes.read().await.contains(collection) {
            return Err(StoreError::Unavailable(format!(
                "injected write failure for {collection}"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn list(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        self.check_available()?;
        let data = self.data.read().await;
        Ok(data
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, body)| Document {
                        id: id.clone(),
                        data: body.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        self.check_available()?;
        let data = self.data.read().await;
        Ok(data
            .get(collection)
            .and_then(|docs| docs.iter().find(|(doc_id, _)| doc_id == id))
            .map(|(doc_id, body)| Document {
                id: doc_id.clone(),
                data: body.clone(),
            }))
    }

    async fn insert(&self, collection: &str, mut body: JsonMap) -> Result<String, StoreError> {
        self.check_writable(collection).await?;
        body.remove("id");
        let id = generate_document_id();
        self.data
            .write()
            .await
            .entry(collection.to_owned())
            .or_default()
            .push((id.clone(), body));
        Ok(id)
    }

    async fn merge(&self, collection: &str, id: &str, mut body: JsonMap) -> Result<(), StoreError> {
        self.check_writable(collection).await?;
        body.remove("id");
        let mut data = self.data.write().await;
        let docs = data.entry(collection.to_owned()).or_default();
        if let Some((_, existing)) = docs.iter_mut().find(|(doc_id, _)| doc_id == id) {
            existing.extend(body);
        } else {
            docs.push((id.to_owned(), body));
        }
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        self.check_writable(collection).await?;
        if let Some(docs) = self.data.write().await.get_mut(collection) {
            docs.retain(|(doc_id, _)| doc_id != id);
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn body(value: Value) -> JsonMap {
        match value {
            Value::Object(map) => map,
            _ => JsonMap::new(),
        }
    }

    #[tokio::test]
    async fn test_insert_then_get() {
        let store = MemoryDocumentStore::new();
        let id = store
            .insert("categories", body(json!({"name": "Mates"})))
            .await
            .unwrap();
        let doc = store.get("categories", &id).await.unwrap().unwrap();
        assert_eq!(doc.data.get("name"), Some(&json!("Mates")));
    }

    #[tokio::test]
    async fn test_merge_is_shallow() {
        let store = MemoryDocumentStore::new();
        store
            .seed("products", "p1", json!({"name": "Mate", "stock": 4, "reviews": []}))
            .await;
        store
            .merge("products", "p1", body(json!({"stock": 2, "featured": true})))
            .await
            .unwrap();

        let doc = store.raw("products", "p1").await.unwrap();
        assert_eq!(doc.get("name"), Some(&json!("Mate")));
        assert_eq!(doc.get("stock"), Some(&json!(2)));
        assert_eq!(doc.get("featured"), Some(&json!(true)));
        assert!(doc.contains_key("reviews"));
    }

    #[tokio::test]
    async fn test_merge_creates_missing_document() {
        let store = MemoryDocumentStore::new();
        store
            .merge("settings", "shipping", body(json!({"cost": 1500, "id": "x"})))
            .await
            .unwrap();
        let doc = store.raw("settings", "shipping").await.unwrap();
        assert!(!doc.contains_key("id"));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = MemoryDocumentStore::new();
        store.seed("sales", "s1", json!({"total": 10})).await;
        store.delete("sales", "s1").await.unwrap();
        store.delete("sales", "s1").await.unwrap();
        assert_eq!(store.count("sales").await, 0);
    }

    #[tokio::test]
    async fn test_list_preserves_insertion_order() {
        let store = MemoryDocumentStore::new();
        store.seed("categories", "b", json!({"name": "B"})).await;
        store.seed("categories", "a", json!({"name": "A"})).await;
        let ids: Vec<_> = store
            .list("categories")
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[tokio::test]
    async fn test_injected_failures() {
        let store = MemoryDocumentStore::new();
        store.fail_writes_to("users").await;
        assert!(store.merge("users", "u1", JsonMap::new()).await.is_err());
        assert!(store.merge("sales", "s1", JsonMap::new()).await.is_ok());
        assert!(store.list("users").await.is_ok());

        store.fail_all(true);
        assert!(matches!(
            store.list("sales").await,
            Err(StoreError::Unavailable(_))
        ));

        store.clear_failures().await;
        assert!(store.merge("users", "u1", JsonMap::new()).await.is_ok());
    }
}
