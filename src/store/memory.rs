//! In-memory document store.

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use super::{filter, key_string, CollectionConfig, Store};
use crate::error::ApiError;
use crate::query::QueryFragment;

/// An index on a document field.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Index {
    pub field: String,
    pub unique: bool,
}

/// Check that no document other than the one with key `key` shares `doc`'s value of a unique
/// `field`. Documents without the field are not indexed.
pub(crate) fn check_unique<'a, I>(
    docs: I,
    doc: &Value,
    key: &str,
    field: &str,
) -> Result<(), ApiError>
where
    I: IntoIterator<Item = &'a Value>,
{
    let Some(value) = doc.get(field).filter(|value| !value.is_null()) else {
        return Ok(());
    };
    let clash = docs.into_iter().any(|other| {
        other.get(key) != doc.get(key)
            && other
                .get(field)
                .is_some_and(|other_value| filter::values_equal(other_value, value))
    });
    if clash {
        return Err(ApiError::DuplicateKey {
            field: field.to_string(),
            value: value.to_string(),
        });
    }
    Ok(())
}

/// Check that no two documents share a value of `field`.
pub(crate) fn check_index<'a, I>(docs: I, field: &str) -> Result<(), ApiError>
where
    I: IntoIterator<Item = &'a Value>,
{
    let mut seen: Vec<&Value> = Vec::new();
    for value in docs
        .into_iter()
        .filter_map(|doc| doc.get(field))
        .filter(|value| !value.is_null())
    {
        if seen.iter().any(|other| filter::values_equal(other, value)) {
            return Err(ApiError::DuplicateKey {
                field: field.to_string(),
                value: value.to_string(),
            });
        }
        seen.push(value);
    }
    Ok(())
}

/// A store holding documents in memory.
///
/// Documents are kept in insertion order. The key field always has a unique index.
#[derive(Debug)]
pub struct MemoryStore {
    config: CollectionConfig,
    docs: RwLock<Vec<Value>>,
    indexes: RwLock<Vec<Index>>,
}

impl MemoryStore {
    pub fn new(config: CollectionConfig) -> Self {
        let key_index = Index {
            field: config.key.clone(),
            unique: true,
        };
        MemoryStore {
            config,
            docs: RwLock::new(Vec::new()),
            indexes: RwLock::new(vec![key_index]),
        }
    }

    /// Return a store holding `docs`.
    pub async fn with_docs(config: CollectionConfig, docs: Vec<Value>) -> Result<Self, ApiError> {
        let store = Self::new(config);
        store.update(docs).await?;
        Ok(store)
    }

    /// Copy of all stored documents.
    pub async fn docs(&self) -> Vec<Value> {
        self.docs.read().await.clone()
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn name(&self) -> &str {
        &self.config.collection_name
    }

    fn key(&self) -> &str {
        &self.config.key
    }

    fn last_updated_field(&self) -> &str {
        &self.config.last_updated_field
    }

    async fn query(&self, query: &QueryFragment) -> Result<Vec<Value>, ApiError> {
        filter::execute(self.docs.read().await.iter(), query)
    }

    async fn count(&self, criteria: &Map<String, Value>) -> Result<u64, ApiError> {
        filter::count(self.docs.read().await.iter(), criteria)
    }

    async fn ensure_index(&self, field: &str, unique: bool) -> Result<bool, ApiError> {
        let mut indexes = self.indexes.write().await;
        if indexes.iter().any(|index| index.field == field && (index.unique || !unique)) {
            return Ok(false);
        }
        if unique {
            check_index(self.docs.read().await.iter(), field)?;
        }
        indexes.retain(|index| index.field != field);
        indexes.push(Index {
            field: field.to_string(),
            unique,
        });
        Ok(true)
    }

    async fn update(&self, docs: Vec<Value>) -> Result<(), ApiError> {
        let indexes = self.indexes.read().await.clone();
        let key = self.key();
        let mut stored = self.docs.write().await;
        for doc in docs {
            key_string(&doc, key)?;
            for index in indexes.iter().filter(|index| index.unique && index.field != key) {
                check_unique(stored.iter(), &doc, key, &index.field)?;
            }
            match stored.iter().position(|other| other.get(key) == doc.get(key)) {
                Some(position) => stored[position] = doc,
                None => stored.push(doc),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils;
    use serde_json::json;

    async fn store() -> MemoryStore {
        MemoryStore::with_docs(CollectionConfig::new("materials"), test_utils::materials_docs())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn query_and_count() {
        let store = store().await;
        let criteria = json!({"nelements": 2});
        let Value::Object(criteria) = criteria else {
            unreachable!()
        };
        let total = store.count(&criteria).await.unwrap();
        let query = QueryFragment {
            criteria: Some(criteria),
            properties: Some(vec!["task_id".to_string()]),
            ..Default::default()
        };
        let docs = store.query(&query).await.unwrap();
        assert_eq!(total as usize, docs.len());
        assert!(total > 0);
        assert!(docs.iter().all(|doc| doc.as_object().unwrap().len() == 1));
    }

    #[tokio::test]
    async fn query_one() {
        let store = store().await;
        let mut criteria = Map::new();
        criteria.insert("task_id".to_string(), json!("mp-149"));
        let doc = store.query_one(criteria, None).await.unwrap().unwrap();
        assert_eq!(json!("Si"), doc["formula_pretty"]);
    }

    #[tokio::test]
    async fn update_replaces_by_key() {
        let store = MemoryStore::new(CollectionConfig::new("test"));
        store
            .update(vec![json!({"task_id": "a", "x": 1}), json!({"task_id": "b", "x": 2})])
            .await
            .unwrap();
        store.update(vec![json!({"task_id": "a", "x": 3})]).await.unwrap();
        assert_eq!(
            vec![json!({"task_id": "a", "x": 3}), json!({"task_id": "b", "x": 2})],
            store.docs().await
        );
    }

    #[tokio::test]
    async fn update_requires_key() {
        let store = MemoryStore::new(CollectionConfig::new("test"));
        let result = store.update(vec![json!({"x": 1})]).await;
        assert!(matches!(result, Err(ApiError::MissingKey { .. })));
    }

    #[tokio::test]
    async fn unique_index() {
        let store = MemoryStore::new(CollectionConfig::new("test"));
        store
            .update(vec![json!({"task_id": "a", "x": 1}), json!({"task_id": "b", "x": 2})])
            .await
            .unwrap();
        assert!(store.ensure_index("x", true).await.unwrap());
        assert!(!store.ensure_index("x", true).await.unwrap());
        assert!(!store.ensure_index("x", false).await.unwrap());
        let result = store.update(vec![json!({"task_id": "c", "x": 1})]).await;
        assert!(matches!(result, Err(ApiError::DuplicateKey { .. })));
        // Replacing a document with its own value is fine.
        store.update(vec![json!({"task_id": "a", "x": 1, "y": 0})]).await.unwrap();
    }

    #[tokio::test]
    async fn unique_index_on_duplicates() {
        let store = MemoryStore::new(CollectionConfig::new("test"));
        store
            .update(vec![json!({"task_id": "a", "x": 1}), json!({"task_id": "b", "x": 1})])
            .await
            .unwrap();
        assert!(store.ensure_index("x", false).await.unwrap());
        assert!(matches!(
            store.ensure_index("x", true).await,
            Err(ApiError::DuplicateKey { .. })
        ));
    }
}
