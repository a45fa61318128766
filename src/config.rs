//! Application definition: the resources served and the stores behind them.
//!
//! An application is described by a JSON document such as:
//!
//! ```json
//! {
//!   "title": "Materials API",
//!   "resources": [
//!     {
//!       "prefix": "materials",
//!       "model": "MaterialsDoc",
//!       "store": {"@class": "JSONStore", "collection_name": "materials", "paths": ["materials.json"]},
//!       "query_operators": [{"@class": "FormulaQuery"}, {"@class": "PaginationQuery"}]
//!     }
//!   ]
//! }
//! ```

use std::path::Path;
use std::sync::Arc;

use expanduser::expanduser;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{event, Level};
use validator::{Validate, ValidationError};

use crate::error::ApiError;
use crate::models;
use crate::query_operators::Operator;
use crate::resource::Resource;
use crate::routes;
use crate::store::{CollectionConfig, JSONStoreConfig, StoreConfig};

fn default_title() -> String {
    "Materials Project API".to_string()
}

fn default_true() -> bool {
    true
}

/// Definition of the served application.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, Validate)]
#[validate(schema(function = "validate_unique_prefixes"))]
pub struct AppConfig {
    #[serde(default = "default_title")]
    pub title: String,

    #[serde(default)]
    pub description: String,

    /// Extra fields reported by the heartbeat endpoint
    #[serde(default)]
    pub heartbeat_meta: Map<String, Value>,

    #[validate]
    pub resources: Vec<ResourceConfig>,
}

/// Definition of a single resource.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, Validate)]
pub struct ResourceConfig {
    /// URL path prefix, e.g. `materials` or `tasks/deprecation`
    #[validate(custom = "validate_prefix")]
    pub prefix: String,

    #[validate]
    pub store: StoreConfig,

    /// Name of a registered document model
    #[validate(custom = "models::validate_model_name")]
    pub model: String,

    #[serde(default)]
    pub tags: Vec<String>,

    /// Query operators used by search. Defaults to pagination and sparse fields.
    #[serde(default)]
    #[validate]
    pub query_operators: Vec<Operator>,

    /// Fields returned by get-by-key when none are requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_fields: Option<Vec<String>>,

    /// Criteria applied to every query
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub base_criteria: Map<String, Value>,

    #[serde(default = "default_true")]
    pub enable_get_by_key: bool,

    #[serde(default = "default_true")]
    pub enable_default_search: bool,

    #[serde(default = "default_true")]
    pub include_in_schema: bool,
}

fn validate_prefix(prefix: &str) -> Result<(), ValidationError> {
    let valid = !prefix.is_empty()
        && prefix.split('/').all(|segment| {
            !segment.is_empty()
                && segment
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || "_-.".contains(c))
        });
    if !valid {
        let mut error = ValidationError::new("prefix must be non-empty path segments");
        error.add_param("prefix".into(), &prefix);
        return Err(error);
    }
    Ok(())
}

fn validate_unique_prefixes(config: &AppConfig) -> Result<(), ValidationError> {
    for (i, resource) in config.resources.iter().enumerate() {
        if config.resources[..i]
            .iter()
            .any(|other| other.prefix == resource.prefix)
        {
            let mut error = ValidationError::new("resource prefixes must be unique");
            error.add_param("prefix".into(), &resource.prefix);
            return Err(error);
        }
    }
    Ok(())
}

impl ResourceConfig {
    /// Return a resource definition with default options.
    pub fn new(prefix: &str, store: StoreConfig, model: &str) -> Self {
        ResourceConfig {
            prefix: prefix.to_string(),
            store,
            model: model.to_string(),
            tags: Vec::new(),
            query_operators: Vec::new(),
            key_fields: None,
            base_criteria: Map::new(),
            enable_get_by_key: true,
            enable_default_search: true,
            include_in_schema: true,
        }
    }

    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|tag| tag.to_string()).collect();
        self
    }

    pub fn with_operators(mut self, query_operators: Vec<Operator>) -> Self {
        self.query_operators = query_operators;
        self
    }

    /// Open the store and build the resource.
    pub async fn build(&self) -> Result<Resource, ApiError> {
        let store = self.store.build().await?;
        let mut resource = Resource::new(&self.prefix, store, &self.model)
            .with_operators(self.query_operators.clone())
            .with_tags(self.tags.iter().cloned())
            .with_base_criteria(self.base_criteria.clone())
            .with_get_by_key(self.enable_get_by_key)
            .with_default_search(self.enable_default_search)
            .with_schema(self.include_in_schema);
        if let Some(key_fields) = &self.key_fields {
            resource = resource.with_key_fields(key_fields.clone());
        }
        Ok(resource)
    }
}

impl AppConfig {
    /// Load and validate an application definition from a JSON file.
    pub fn load(path: &str) -> Result<Self, ApiError> {
        let path = expanduser(path)?;
        let text = std::fs::read_to_string(&path)?;
        let config: AppConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Return the default application, serving each route from `<data_dir>/<name>_store.json`.
    ///
    /// Routes whose store file does not exist are left out.
    pub fn from_data_dir(data_dir: &str, db_version: Option<&str>) -> Result<Self, ApiError> {
        let data_dir = expanduser(data_dir)?;
        let resources = routes::default_resources(
            |name, key| {
                let path = data_dir.join(format!("{}_store.json", name));
                store_file_config(name, key, &path)
            },
            db_version,
        );
        Ok(AppConfig {
            title: default_title(),
            description: String::new(),
            heartbeat_meta: Map::new(),
            resources,
        })
    }

    /// Build every resource.
    pub async fn build_resources(&self) -> Result<Vec<Arc<Resource>>, ApiError> {
        let mut resources = Vec::with_capacity(self.resources.len());
        for config in &self.resources {
            let resource = config.build().await?;
            event!(
                Level::INFO,
                prefix = %config.prefix,
                model = %config.model,
                "built resource"
            );
            resources.push(Arc::new(resource));
        }
        Ok(resources)
    }
}

fn store_file_config(name: &str, key: &str, path: &Path) -> Option<StoreConfig> {
    if !path.exists() {
        event!(
            Level::WARN,
            "store file {} not found, {} will not be served",
            path.display(),
            name
        );
        return None;
    }
    Some(StoreConfig::JSONStore(JSONStoreConfig::new(
        CollectionConfig::new(name).with_key(key),
        &path.display().to_string(),
    )))
}
