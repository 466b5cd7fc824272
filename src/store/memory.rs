use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::{check_collection, check_document, new_document_id, Document, DocumentData, DocumentStore, StoreError, WriteAck};
use crate::filter::{DocumentQuery, SortDirection};

struct StoredDocument {
    data: DocumentData,
    // insertion counter, breaks ordering ties the way created_at does in Postgres
    seq: u64,
}

#[derive(Default)]
struct Collections {
    docs: HashMap<String, HashMap<String, StoredDocument>>,
    next_seq: u64,
}

/// Process-local document store used for development and tests
#[derive(Default)]
pub struct MemoryDocumentStore {
    inner: RwLock<Collections>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn add(&self, collection: &str, data: DocumentData) -> Result<String, StoreError> {
        check_collection(collection)?;
        let id = new_document_id();
        let mut inner = self.inner.write().await;
        inner.next_seq += 1;
        let seq = inner.next_seq;
        inner
            .docs
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), StoredDocument { data, seq });
        Ok(id)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        check_document(collection, id)?;
        let inner = self.inner.read().await;
        Ok(inner
            .docs
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|stored| Document { id: id.to_string(), data: stored.data.clone() }))
    }

    async fn update(&self, collection: &str, id: &str, data: DocumentData) -> Result<WriteAck, StoreError> {
        check_document(collection, id)?;
        let mut inner = self.inner.write().await;
        if let Some(stored) = inner.docs.get_mut(collection).and_then(|docs| docs.get_mut(id)) {
            for (key, value) in data {
                stored.data.insert(key, value);
            }
        }
        Ok(WriteAck::now())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<WriteAck, StoreError> {
        check_document(collection, id)?;
        let mut inner = self.inner.write().await;
        if let Some(docs) = inner.docs.get_mut(collection) {
            docs.remove(id);
        }
        Ok(WriteAck::now())
    }

    async fn query(&self, collection: &str, query: &DocumentQuery) -> Result<Vec<Document>, StoreError> {
        check_collection(collection)?;
        query.validate()?;

        let inner = self.inner.read().await;
        let Some(docs) = inner.docs.get(collection) else {
            return Ok(vec![]);
        };

        let mut matched: Vec<(&String, &StoredDocument)> = docs
            .iter()
            .filter(|(_, stored)| {
                query
                    .conditions
                    .iter()
                    .all(|c| stored.data.get(&c.field) == Some(&c.data))
            })
            .collect();

        matched.sort_by(|(_, a), (_, b)| {
            for info in &query.order {
                let ord = compare_values(a.data.get(&info.field), b.data.get(&info.field));
                let ord = match info.sort {
                    SortDirection::Asc => ord,
                    SortDirection::Desc => ord.reverse(),
                };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            a.seq.cmp(&b.seq)
        });

        Ok(matched
            .into_iter()
            .map(|(id, stored)| Document { id: id.clone(), data: stored.data.clone() })
            .collect())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

// Missing fields sort first; strings and numbers compare naturally, anything
// else compares by its JSON text.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data(v: Value) -> DocumentData {
        v.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn add_then_get_round_trips_body() {
        let store = MemoryDocumentStore::new();
        let id = store.add("postings", data(json!({ "jobTitle": "Engineer" }))).await.unwrap();
        let doc = store.get("postings", &id).await.unwrap().unwrap();
        assert_eq!(doc.id, id);
        assert_eq!(doc.data["jobTitle"], "Engineer");
        assert!(store.get("postings", "missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_merges_and_ignores_missing_target() {
        let store = MemoryDocumentStore::new();
        let id = store
            .add("postings", data(json!({ "jobTitle": "Engineer", "jdUrl": "a" })))
            .await
            .unwrap();
        store.update("postings", &id, data(json!({ "jdUrl": "b" }))).await.unwrap();
        let doc = store.get("postings", &id).await.unwrap().unwrap();
        assert_eq!(doc.data["jobTitle"], "Engineer");
        assert_eq!(doc.data["jdUrl"], "b");

        store.update("postings", "nope", data(json!({ "jdUrl": "c" }))).await.unwrap();
        assert!(store.get("postings", "nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn query_filters_with_and_and_orders() {
        let store = MemoryDocumentStore::new();
        for (name, status, office, created) in [
            ("c", "Inbox", "NY", "2024-01-03T00:00:00.000Z"),
            ("a", "Inbox", "NY", "2024-01-01T00:00:00.000Z"),
            ("x", "Inbox", "SF", "2024-01-02T00:00:00.000Z"),
            ("y", "Hired", "NY", "2024-01-02T00:00:00.000Z"),
        ] {
            store
                .add(
                    "candidates",
                    data(json!({ "name": name, "status": status, "office": office, "createdAt": created })),
                )
                .await
                .unwrap();
        }

        let query = DocumentQuery::new()
            .where_eq("status", "Inbox")
            .where_eq("office", "NY")
            .order_by("createdAt", SortDirection::Asc);
        let names: Vec<_> = store
            .query("candidates", &query)
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.data["name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a", "c"]);
    }

    #[tokio::test]
    async fn sub_collections_are_separate() {
        let store = MemoryDocumentStore::new();
        store.add("candidates/c1/notes", data(json!({ "title": "t" }))).await.unwrap();
        let other = store.query("candidates/c2/notes", &DocumentQuery::new()).await.unwrap();
        assert!(other.is_empty());
        assert!(store.add("candidates/c1", data(json!({}))).await.is_err());
    }
}
