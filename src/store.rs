//! Document stores.
//!
//! A [Store] holds JSON documents identified by a key field and answers MongoDB-style queries
//! built from [QueryFragment]s. Query evaluation is shared by all backends and lives in
//! [filter].

pub mod filter;
pub mod json;
pub mod memory;
pub mod sled;

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

use crate::error::ApiError;
use crate::query::QueryFragment;

pub use self::json::{JSONStore, JSONStoreConfig};
pub use self::memory::MemoryStore;
pub use self::sled::{SledStore, SledStoreConfig};

/// A store shared between request handlers.
pub type SharedStore = Arc<dyn Store>;

/// Interface to a collection of JSON documents.
#[async_trait]
pub trait Store: Send + Sync + Debug {
    /// Name of the collection
    fn name(&self) -> &str;

    /// Field uniquely identifying each document
    fn key(&self) -> &str;

    /// Field holding the time each document was last updated
    fn last_updated_field(&self) -> &str;

    /// Documents matching a query, after sorting, pagination and projection.
    async fn query(&self, query: &QueryFragment) -> Result<Vec<Value>, ApiError>;

    /// First document matching `criteria`, if any.
    async fn query_one(
        &self,
        criteria: Map<String, Value>,
        properties: Option<Vec<String>>,
    ) -> Result<Option<Value>, ApiError> {
        let query = QueryFragment {
            criteria: Some(criteria),
            properties,
            limit: Some(1),
            ..Default::default()
        };
        Ok(self.query(&query).await?.into_iter().next())
    }

    /// Number of documents matching `criteria`.
    async fn count(&self, criteria: &Map<String, Value>) -> Result<u64, ApiError>;

    /// Create an index on `field`. Returns whether a new index was created.
    ///
    /// Creating a unique index fails if existing documents share a value of `field`.
    async fn ensure_index(&self, field: &str, unique: bool) -> Result<bool, ApiError>;

    /// Insert documents, replacing those with the same key.
    async fn update(&self, docs: Vec<Value>) -> Result<(), ApiError>;
}

/// Return the value of `doc`'s key field as a string, for use in errors and storage keys.
pub(crate) fn key_string(doc: &Value, key: &str) -> Result<String, ApiError> {
    match doc.get(key) {
        Some(Value::String(value)) => Ok(value.clone()),
        Some(Value::Null) | None => Err(ApiError::MissingKey {
            key: key.to_string(),
        }),
        Some(value) => Ok(value.to_string()),
    }
}

fn default_key() -> String {
    "task_id".to_string()
}

fn default_last_updated_field() -> String {
    "last_updated".to_string()
}

/// Options common to all stores.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, Validate)]
pub struct CollectionConfig {
    /// Name of the collection
    #[validate(length(min = 1, message = "collection_name must not be empty"))]
    pub collection_name: String,

    /// Field uniquely identifying each document
    #[serde(default = "default_key")]
    #[validate(length(min = 1, message = "key must not be empty"))]
    pub key: String,

    /// Field holding the time each document was last updated
    #[serde(default = "default_last_updated_field")]
    pub last_updated_field: String,
}

impl CollectionConfig {
    pub fn new(collection_name: &str) -> Self {
        CollectionConfig {
            collection_name: collection_name.to_string(),
            key: default_key(),
            last_updated_field: default_last_updated_field(),
        }
    }

    pub fn with_key(mut self, key: &str) -> Self {
        self.key = key.to_string();
        self
    }
}

/// Configuration of a store, tagged by store class.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(tag = "@class")]
pub enum StoreConfig {
    MemoryStore(CollectionConfig),
    JSONStore(JSONStoreConfig),
    SledStore(SledStoreConfig),
}

impl Validate for StoreConfig {
    fn validate(&self) -> Result<(), validator::ValidationErrors> {
        match self {
            StoreConfig::MemoryStore(config) => config.validate(),
            StoreConfig::JSONStore(config) => config.validate(),
            StoreConfig::SledStore(config) => config.validate(),
        }
    }
}

impl StoreConfig {
    /// Key field of the configured store.
    pub fn key(&self) -> &str {
        &self.collection().key
    }

    fn collection(&self) -> &CollectionConfig {
        match self {
            StoreConfig::MemoryStore(config) => config,
            StoreConfig::JSONStore(config) => &config.collection,
            StoreConfig::SledStore(config) => &config.collection,
        }
    }

    /// Open the configured store.
    pub async fn build(&self) -> Result<SharedStore, ApiError> {
        let store: SharedStore = match self {
            StoreConfig::MemoryStore(config) => Arc::new(MemoryStore::new(config.clone())),
            StoreConfig::JSONStore(config) => Arc::new(JSONStore::open(config.clone()).await?),
            StoreConfig::SledStore(config) => Arc::new(SledStore::open(config.clone()).await?),
        };
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn key_strings() {
        assert_eq!("mp-1", key_string(&json!({"task_id": "mp-1"}), "task_id").unwrap());
        assert_eq!("42", key_string(&json!({"id": 42}), "id").unwrap());
        assert!(matches!(
            key_string(&json!({"task_id": null}), "task_id"),
            Err(ApiError::MissingKey { .. })
        ));
    }

    #[test]
    fn config_defaults() {
        let config: StoreConfig = serde_json::from_value(json!({
            "@class": "MemoryStore",
            "collection_name": "thermo"
        }))
        .unwrap();
        assert_eq!(StoreConfig::MemoryStore(CollectionConfig::new("thermo")), config);
        assert_eq!("task_id", config.key());
        config.validate().unwrap();
    }

    #[test]
    fn config_invalid() {
        let config = StoreConfig::MemoryStore(CollectionConfig::new(""));
        assert!(config.validate().is_err());
    }

    #[tokio::test]
    async fn build_memory_store() {
        let config = StoreConfig::MemoryStore(CollectionConfig::new("xas").with_key("xas_id"));
        let store = config.build().await.unwrap();
        assert_eq!("xas", store.name());
        assert_eq!("xas_id", store.key());
        assert_eq!("last_updated", store.last_updated_field());
    }
}
