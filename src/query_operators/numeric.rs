//! Numeric range filters.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

use crate::error::ApiError;
use crate::query::QueryFragment;
use crate::query_operator::{ParamSpec, QueryOperator};
use crate::query_params::QueryParams;

/// A document field filtered by `<param>_min` and `<param>_max` parameters.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, Validate)]
pub struct RangeField {
    /// Parameter name prefix
    #[validate(length(min = 1, message = "param must not be empty"))]
    pub param: String,

    /// Dotted path of the document field
    #[validate(length(min = 1, message = "field must not be empty"))]
    pub field: String,

    /// Whether bounds are integers rather than floating point numbers
    #[serde(default)]
    pub integer: bool,

    /// Description of the quantity, e.g. "the cell volume"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl RangeField {
    /// A floating point range on `field`.
    pub fn number(param: &str, field: &str, description: &str) -> Self {
        RangeField {
            param: param.to_string(),
            field: field.to_string(),
            integer: false,
            description: Some(description.to_string()),
        }
    }

    /// An integer range on `field`.
    pub fn integer(param: &str, field: &str, description: &str) -> Self {
        RangeField {
            integer: true,
            ..Self::number(param, field, description)
        }
    }

    fn bound(&self, params: &QueryParams, suffix: &str) -> Result<Option<Value>, ApiError> {
        let name = format!("{}_{}", self.param, suffix);
        if self.integer {
            Ok(params.get_parsed::<i64>(&name)?.map(Value::from))
        } else {
            let bound = params.get_parsed::<f64>(&name)?;
            match bound {
                Some(bound) if !bound.is_finite() => {
                    Err(ApiError::invalid_parameter(&name, "must be a finite number"))
                }
                _ => Ok(bound.map(Value::from)),
            }
        }
    }
}

/// Filters fields to an inclusive range.
///
/// Each bound is optional; a bound of zero is a valid bound.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, Validate)]
pub struct MinMaxQuery {
    #[validate]
    #[validate(length(min = 1, message = "at least one field is required"))]
    pub fields: Vec<RangeField>,
}

impl MinMaxQuery {
    pub fn new<I>(fields: I) -> Self
    where
        I: IntoIterator<Item = RangeField>,
    {
        MinMaxQuery {
            fields: fields.into_iter().collect(),
        }
    }
}

impl QueryOperator for MinMaxQuery {
    fn parameters(&self) -> Vec<ParamSpec> {
        self.fields
            .iter()
            .flat_map(|field| {
                let description = field.description.as_deref().unwrap_or(&field.param);
                let spec = |suffix: &str, bound: &str| {
                    let name = format!("{}_{}", field.param, suffix);
                    let description = format!("{} value for {}", bound, description);
                    if field.integer {
                        ParamSpec::integer(name, description)
                    } else {
                        ParamSpec::number(name, description)
                    }
                };
                [spec("max", "Maximum"), spec("min", "Minimum")]
            })
            .collect()
    }

    fn query(&self, params: &QueryParams) -> Result<QueryFragment, ApiError> {
        let mut criteria = Map::new();
        for field in &self.fields {
            let mut condition = Map::new();
            if let Some(min) = field.bound(params, "min")? {
                condition.insert("$gte".to_string(), min);
            }
            if let Some(max) = field.bound(params, "max")? {
                condition.insert("$lte".to_string(), max);
            }
            if !condition.is_empty() {
                criteria.insert(field.field.clone(), Value::Object(condition));
            }
        }
        Ok(QueryFragment::with_criteria(criteria))
    }

    fn ensure_indexes(&self) -> Vec<(String, bool)> {
        self.fields
            .iter()
            .map(|field| (field.field.clone(), false))
            .collect()
    }
}
