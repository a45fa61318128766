//! Store backed by JSON files.

use std::path::PathBuf;

use async_trait::async_trait;
use expanduser::expanduser;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{event, Level};
use validator::Validate;

use super::{CollectionConfig, MemoryStore, Store};
use crate::error::ApiError;
use crate::query::QueryFragment;

fn default_read_only() -> bool {
    true
}

/// Configuration of a [JSONStore].
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, Validate)]
pub struct JSONStoreConfig {
    #[serde(flatten)]
    #[validate]
    pub collection: CollectionConfig,

    /// Files to load. Each holds a JSON array of documents or one document per line.
    #[validate(length(min = 1, message = "at least one path is required"))]
    pub paths: Vec<String>,

    /// When false, updates are written back to the first path
    #[serde(default = "default_read_only")]
    pub read_only: bool,
}

impl JSONStoreConfig {
    pub fn new(collection: CollectionConfig, path: &str) -> Self {
        JSONStoreConfig {
            collection,
            paths: vec![path.to_string()],
            read_only: default_read_only(),
        }
    }
}

/// Parse a JSON array of documents or JSON lines.
pub fn parse_documents(text: &str) -> Result<Vec<Value>, ApiError> {
    if text.trim_start().starts_with('[') {
        return Ok(serde_json::from_str(text)?);
    }
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).map_err(ApiError::from))
        .collect()
}

fn expand(path: &str) -> Result<PathBuf, ApiError> {
    Ok(expanduser(path)?)
}

/// A store loaded from JSON files and served from memory.
#[derive(Debug)]
pub struct JSONStore {
    config: JSONStoreConfig,
    memory: MemoryStore,
}

impl JSONStore {
    /// Load the configured files.
    ///
    /// A writable store whose file does not exist yet starts empty.
    pub async fn open(config: JSONStoreConfig) -> Result<Self, ApiError> {
        let mut docs = Vec::new();
        for path in &config.paths {
            let path = expand(path)?;
            if !config.read_only && !path.exists() {
                continue;
            }
            let text = tokio::fs::read_to_string(&path).await?;
            let loaded = parse_documents(&text)?;
            event!(
                Level::INFO,
                "loaded {} documents from {}",
                loaded.len(),
                path.display()
            );
            docs.extend(loaded);
        }
        let memory = MemoryStore::with_docs(config.collection.clone(), docs).await?;
        Ok(JSONStore { config, memory })
    }

    async fn write(&self) -> Result<(), ApiError> {
        let Some(path) = self.config.paths.first() else {
            return Ok(());
        };
        let path = expand(path)?;
        let text = serde_json::to_string_pretty(&self.memory.docs().await)?;
        tokio::fs::write(path, text).await?;
        Ok(())
    }
}

#[async_trait]
impl Store for JSONStore {
    fn name(&self) -> &str {
        self.memory.name()
    }

    fn key(&self) -> &str {
        self.memory.key()
    }

    fn last_updated_field(&self) -> &str {
        self.memory.last_updated_field()
    }

    async fn query(&self, query: &QueryFragment) -> Result<Vec<Value>, ApiError> {
        self.memory.query(query).await
    }

    async fn count(&self, criteria: &Map<String, Value>) -> Result<u64, ApiError> {
        self.memory.count(criteria).await
    }

    async fn ensure_index(&self, field: &str, unique: bool) -> Result<bool, ApiError> {
        self.memory.ensure_index(field, unique).await
    }

    /// Update the documents in memory, and on disk unless the store is read-only.
    async fn update(&self, docs: Vec<Value>) -> Result<(), ApiError> {
        self.memory.update(docs).await?;
        if !self.config.read_only {
            self.write().await?;
        }
        Ok(())
    }
}
