//! Store persisted in an embedded sled database.
//!
//! Each collection is a sled tree mapping key values to serialised documents. Index
//! definitions are kept in a second tree so that they survive restarts.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

use super::memory::{check_index, check_unique, Index};
use super::{filter, key_string, CollectionConfig, Store};
use crate::error::ApiError;
use crate::query::QueryFragment;

/// Configuration of a [SledStore].
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, Validate)]
pub struct SledStoreConfig {
    #[serde(flatten)]
    #[validate]
    pub collection: CollectionConfig,

    /// Database directory
    #[validate(length(min = 1, message = "path must not be empty"))]
    pub path: String,
}

/// A store persisted with sled.
#[derive(Debug)]
pub struct SledStore {
    config: CollectionConfig,
    docs: ::sled::Tree,
    indexes: ::sled::Tree,
}

impl SledStore {
    /// Open or create the database at the configured path.
    pub async fn open(config: SledStoreConfig) -> Result<Self, ApiError> {
        let path = expanduser::expanduser(&config.path)?;
        let collection = config.collection;
        let name = collection.collection_name.clone();
        let (docs, indexes) = tokio::task::spawn_blocking(move || {
            let db = ::sled::open(path)?;
            let docs = db.open_tree(&name)?;
            let indexes = db.open_tree(format!("{}.indexes", name))?;
            Ok::<_, ApiError>((docs, indexes))
        })
        .await??;
        Ok(SledStore {
            config: collection,
            docs,
            indexes,
        })
    }

    /// Load every document of the collection.
    async fn load(&self) -> Result<Vec<Value>, ApiError> {
        let tree = self.docs.clone();
        tokio::task::spawn_blocking(move || load_tree(&tree)).await?
    }

    fn unique_indexes(&self) -> Result<Vec<Index>, ApiError> {
        self.indexes
            .iter()
            .map(|entry| {
                let (field, unique) = entry?;
                Ok(Index {
                    field: String::from_utf8_lossy(&field).into_owned(),
                    unique: serde_json::from_slice(&unique)?,
                })
            })
            .filter(|index| !matches!(index, Ok(Index { unique: false, .. })))
            .collect()
    }
}

fn load_tree(tree: &::sled::Tree) -> Result<Vec<Value>, ApiError> {
    tree.iter()
        .values()
        .map(|doc| Ok(serde_json::from_slice(&doc?)?))
        .collect()
}

#[async_trait]
impl Store for SledStore {
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
        filter::execute(&self.load().await?, query)
    }

    async fn count(&self, criteria: &Map<String, Value>) -> Result<u64, ApiError> {
        filter::count(&self.load().await?, criteria)
    }

    async fn ensure_index(&self, field: &str, unique: bool) -> Result<bool, ApiError> {
        if let Some(existing) = self.indexes.get(field)? {
            let existing_unique: bool = serde_json::from_slice(&existing)?;
            if existing_unique || !unique {
                return Ok(false);
            }
        }
        if unique {
            check_index(&self.load().await?, field)?;
        }
        self.indexes
            .insert(field, serde_json::to_vec(&unique)?)?;
        Ok(true)
    }

    async fn update(&self, docs: Vec<Value>) -> Result<(), ApiError> {
        let key = self.key().to_string();
        let indexes = self.unique_indexes()?;
        let mut stored = if indexes.is_empty() {
            Vec::new()
        } else {
            self.load().await?
        };
        let tree = self.docs.clone();
        tokio::task::spawn_blocking(move || {
            for doc in docs {
                let id = key_string(&doc, &key)?;
                for index in indexes.iter().filter(|index| index.field != key) {
                    check_unique(&stored, &doc, &key, &index.field)?;
                }
                tree.insert(id.as_bytes(), serde_json::to_vec(&doc)?)?;
                if !indexes.is_empty() {
                    match stored.iter().position(|other| other.get(&key) == doc.get(&key)) {
                        Some(position) => stored[position] = doc,
                        None => stored.push(doc),
                    }
                }
            }
            tree.flush()?;
            Ok::<_, ApiError>(())
        })
        .await?
    }
}
