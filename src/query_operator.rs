//! Query operator interface.
//!
//! A query operator turns the request parameters it understands into a [QueryFragment]. A
//! [crate::resource::Resource] runs every operator it was built with and merges the
//! fragments into one store query, so each operator can be written and tested on its own.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ApiError;
use crate::query::QueryFragment;
use crate::query_params::QueryParams;

/// Type of a query parameter, as advertised in the OpenAPI document.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    Boolean,
    Integer,
    Number,
    String,
}

/// Description of a query parameter consumed by an operator.
#[derive(Clone, Debug, PartialEq)]
pub struct ParamSpec {
    pub name: String,
    pub param_type: ParamType,
    pub description: String,
    pub default: Option<Value>,
    pub required: bool,
    /// Restricts the parameter to these values
    pub allowed: Option<Vec<String>>,
}

impl ParamSpec {
    pub fn new(name: impl Into<String>, param_type: ParamType, description: impl Into<String>) -> Self {
        ParamSpec {
            name: name.into(),
            param_type,
            description: description.into(),
            default: None,
            required: false,
            allowed: None,
        }
    }

    pub fn string(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, ParamType::String, description)
    }

    pub fn integer(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, ParamType::Integer, description)
    }

    pub fn number(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, ParamType::Number, description)
    }

    pub fn boolean(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, ParamType::Boolean, description)
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_allowed<I, S>(mut self, allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed = Some(allowed.into_iter().map(Into::into).collect());
        self
    }
}

/// Information about an executed query available when building response metadata.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MetaContext {
    /// Number of documents matching the query criteria, ignoring pagination
    pub total_doc: u64,
}

/// A unit mapping request parameters to a partial store query.
pub trait QueryOperator: Send + Sync {
    /// Parameters this operator consumes.
    fn parameters(&self) -> Vec<ParamSpec>;

    /// Build the query fragment for a request.
    fn query(&self, params: &QueryParams) -> Result<QueryFragment, ApiError>;

    /// Metadata to add to the response.
    fn meta(&self, _context: &MetaContext) -> Map<String, Value> {
        Map::new()
    }

    /// Transform the documents returned by the store.
    fn post_process(&self, docs: Vec<Value>, _params: &QueryParams) -> Result<Vec<Value>, ApiError> {
        Ok(docs)
    }

    /// Fields the store should index, with whether the index is unique.
    fn ensure_indexes(&self) -> Vec<(String, bool)> {
        Vec::new()
    }
}
