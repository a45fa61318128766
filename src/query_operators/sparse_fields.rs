//! Sparse field sets.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use validator::Validate;

use crate::error::ApiError;
use crate::models;
use crate::query::QueryFragment;
use crate::query_operator::{MetaContext, ParamSpec, QueryOperator};
use crate::query_params::QueryParams;

/// Selects the fields of `model` to return.
///
/// `fields` takes a comma separated list of fields. `all_fields=true` returns every field of
/// the model. Otherwise `default_fields` are returned, or all fields when there are none.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, Validate)]
pub struct SparseFieldsQuery {
    /// Name of a registered document model
    #[validate(custom = "models::validate_model_name")]
    pub model: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_fields: Option<Vec<String>>,
}

impl SparseFieldsQuery {
    pub fn new(model: &str, default_fields: Option<Vec<&str>>) -> Self {
        SparseFieldsQuery {
            model: model.to_string(),
            default_fields: default_fields
                .map(|fields| fields.into_iter().map(str::to_string).collect()),
        }
    }

    /// All fields of the model.
    pub fn model_fields(&self) -> Result<Vec<String>, ApiError> {
        models::model_info(&self.model)
            .map(|model| model.fields())
            .ok_or_else(|| ApiError::UnknownModel(self.model.clone()))
    }

    /// Fields returned when none are requested.
    pub fn default_properties(&self) -> Result<Vec<String>, ApiError> {
        match &self.default_fields {
            Some(fields) => Ok(fields.clone()),
            None => self.model_fields(),
        }
    }
}

impl QueryOperator for SparseFieldsQuery {
    fn parameters(&self) -> Vec<ParamSpec> {
        let available = self
            .model_fields()
            .unwrap_or_default()
            .iter()
            .map(|field| format!("`{}`", field))
            .collect::<Vec<_>>()
            .join(" ");
        vec![
            ParamSpec::string(
                "fields",
                format!(
                    "Fields to project from {} as a list of comma separated strings. Fields include: {}",
                    self.model, available
                ),
            ),
            ParamSpec::boolean("all_fields", "Include all fields.").with_default(false),
        ]
    }

    fn query(&self, params: &QueryParams) -> Result<QueryFragment, ApiError> {
        let properties = if params.get_bool("all_fields")?.unwrap_or(false) {
            self.model_fields()?
        } else if let Some(fields) = params.get_list("fields") {
            fields
        } else {
            self.default_properties()?
        };
        Ok(QueryFragment {
            properties: Some(properties),
            ..Default::default()
        })
    }

    fn meta(&self, _context: &MetaContext) -> Map<String, Value> {
        let mut meta = Map::new();
        meta.insert(
            "default_fields".to_string(),
            json!(self.default_properties().unwrap_or_default()),
        );
        meta
    }
}
