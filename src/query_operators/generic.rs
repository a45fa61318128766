//! Single field filters: booleans, identifier lists and exact matches.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use validator::Validate;

use crate::error::ApiError;
use crate::query::QueryFragment;
use crate::query_operator::{ParamSpec, QueryOperator};
use crate::query_params::QueryParams;

/// Matches a boolean field, e.g. `is_stable=true`.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, Validate)]
pub struct BooleanQuery {
    #[validate(length(min = 1))]
    pub param: String,
    #[validate(length(min = 1))]
    pub field: String,
    /// Value applied when the parameter is absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl BooleanQuery {
    pub fn new(param: &str, field: &str, description: &str) -> Self {
        BooleanQuery {
            param: param.to_string(),
            field: field.to_string(),
            default: None,
            description: Some(description.to_string()),
        }
    }

    pub fn with_default(mut self, default: bool) -> Self {
        self.default = Some(default);
        self
    }
}

impl QueryOperator for BooleanQuery {
    fn parameters(&self) -> Vec<ParamSpec> {
        let spec = ParamSpec::boolean(
            self.param.as_str(),
            self.description.clone().unwrap_or_default(),
        );
        match self.default {
            Some(default) => vec![spec.with_default(default)],
            None => vec![spec],
        }
    }

    fn query(&self, params: &QueryParams) -> Result<QueryFragment, ApiError> {
        Ok(match params.get_bool(&self.param)?.or(self.default) {
            Some(value) => QueryFragment::criterion(self.field.as_str(), json!(value)),
            None => QueryFragment::default(),
        })
    }

    fn ensure_indexes(&self) -> Vec<(String, bool)> {
        vec![(self.field.clone(), false)]
    }
}

/// Matches a field against a comma separated list of identifiers, e.g.
/// `task_ids=mp-1,mp-2`.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, Validate)]
pub struct IdListQuery {
    #[validate(length(min = 1))]
    pub param: String,
    #[validate(length(min = 1))]
    pub field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl IdListQuery {
    pub fn new(param: &str, field: &str, description: &str) -> Self {
        IdListQuery {
            param: param.to_string(),
            field: field.to_string(),
            description: Some(description.to_string()),
        }
    }
}

impl QueryOperator for IdListQuery {
    fn parameters(&self) -> Vec<ParamSpec> {
        vec![ParamSpec::string(
            self.param.as_str(),
            self.description.clone().unwrap_or_default(),
        )]
    }

    fn query(&self, params: &QueryParams) -> Result<QueryFragment, ApiError> {
        Ok(match params.get_list(&self.param) {
            Some(ids) if !ids.is_empty() => {
                QueryFragment::criterion(self.field.as_str(), json!({ "$in": ids }))
            }
            _ => QueryFragment::default(),
        })
    }

    fn ensure_indexes(&self) -> Vec<(String, bool)> {
        vec![(self.field.clone(), false)]
    }
}

/// Matches a field exactly, e.g. `edge=K`.
///
/// With `allowed` set the value must be one of the allowed values, compared ignoring case;
/// the allowed spelling is used in the criteria.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, Validate)]
pub struct ExactMatchQuery {
    #[validate(length(min = 1))]
    pub param: String,
    #[validate(length(min = 1))]
    pub field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed: Option<Vec<String>>,
    /// Whether the value is an integer
    #[serde(default)]
    pub integer: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ExactMatchQuery {
    pub fn new(param: &str, field: &str, description: &str) -> Self {
        ExactMatchQuery {
            param: param.to_string(),
            field: field.to_string(),
            allowed: None,
            integer: false,
            description: Some(description.to_string()),
        }
    }

    pub fn integer(param: &str, field: &str, description: &str) -> Self {
        ExactMatchQuery {
            integer: true,
            ..Self::new(param, field, description)
        }
    }

    pub fn with_allowed<I, S>(mut self, allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed = Some(allowed.into_iter().map(Into::into).collect());
        self
    }

    fn value(&self, params: &QueryParams) -> Result<Option<Value>, ApiError> {
        if self.integer {
            return Ok(params.get_parsed::<i64>(&self.param)?.map(Value::from));
        }
        let Some(value) = params.get(&self.param).map(str::trim) else {
            return Ok(None);
        };
        match &self.allowed {
            None => Ok(Some(json!(value))),
            Some(allowed) => allowed
                .iter()
                .find(|candidate| candidate.eq_ignore_ascii_case(value))
                .map(|candidate| Some(json!(candidate)))
                .ok_or_else(|| {
                    ApiError::invalid_parameter(
                        &self.param,
                        format!("{} is not one of {}", value, allowed.join(", ")),
                    )
                }),
        }
    }
}

impl QueryOperator for ExactMatchQuery {
    fn parameters(&self) -> Vec<ParamSpec> {
        let description = self.description.clone().unwrap_or_default();
        let spec = if self.integer {
            ParamSpec::integer(self.param.as_str(), description)
        } else {
            ParamSpec::string(self.param.as_str(), description)
        };
        match &self.allowed {
            Some(allowed) => vec![spec.with_allowed(allowed.iter().cloned())],
            None => vec![spec],
        }
    }

    fn query(&self, params: &QueryParams) -> Result<QueryFragment, ApiError> {
        Ok(match self.value(params)? {
            Some(value) => QueryFragment::criterion(self.field.as_str(), value),
            None => QueryFragment::default(),
        })
    }

    fn ensure_indexes(&self) -> Vec<(String, bool)> {
        vec![(self.field.clone(), false)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn criteria(op: &dyn QueryOperator, pairs: &[(&str, &str)]) -> Value {
        let params = QueryParams::from_pairs(pairs.iter().copied());
        Value::Object(op.query(&params).unwrap().criteria())
    }

    #[test]
    fn boolean() {
        let op = BooleanQuery::new("is_stable", "is_stable", "Whether the material is stable.");
        assert_eq!(json!({"is_stable": true}), criteria(&op, &[("is_stable", "true")]));
        assert_eq!(json!({"is_stable": false}), criteria(&op, &[("is_stable", "false")]));
        assert_eq!(json!({}), criteria(&op, &[]));
    }

    #[test]
    fn boolean_default() {
        let op = BooleanQuery::new("deprecated", "deprecated", "").with_default(false);
        assert_eq!(json!({"deprecated": false}), criteria(&op, &[]));
        assert_eq!(json!({"deprecated": true}), criteria(&op, &[("deprecated", "1")]));
        assert_eq!(Some(json!(false)), op.parameters()[0].default);
    }

    #[test]
    fn id_list() {
        let op = IdListQuery::new("task_ids", "task_id", "");
        assert_eq!(
            json!({"task_id": {"$in": ["mp-1", "mp-2"]}}),
            criteria(&op, &[("task_ids", "mp-1, mp-2")])
        );
        assert_eq!(json!({}), criteria(&op, &[("task_ids", ",")]));
        assert_eq!(json!({}), criteria(&op, &[]));
    }

    #[test]
    fn exact_match() {
        let op = ExactMatchQuery::new("substrate_id", "sub_id", "");
        assert_eq!(json!({"sub_id": "mp-2"}), criteria(&op, &[("substrate_id", "mp-2")]));
        assert_eq!(json!({}), criteria(&op, &[]));
    }

    #[test]
    fn exact_match_integer() {
        let op = ExactMatchQuery::integer("nelements", "nelements", "");
        assert_eq!(json!({"nelements": 3}), criteria(&op, &[("nelements", "3")]));
        let params = QueryParams::from_pairs([("nelements", "three")]);
        assert!(op.query(&params).is_err());
    }

    #[test]
    fn exact_match_allowed() {
        let op = ExactMatchQuery::new("edge", "edge", "").with_allowed(["K", "L2", "L3", "L2,3"]);
        assert_eq!(json!({"edge": "L3"}), criteria(&op, &[("edge", "l3")]));
        let params = QueryParams::from_pairs([("edge", "M")]);
        match op.query(&params) {
            Err(ApiError::InvalidParameter { name, reason }) => {
                assert_eq!("edge", name);
                assert_eq!("M is not one of K, L2, L3, L2,3", reason);
            }
            other => panic!("unexpected result {:?}", other),
        }
        assert_eq!(
            Some(vec![
                "K".to_string(),
                "L2".to_string(),
                "L3".to_string(),
                "L2,3".to_string()
            ]),
            op.parameters()[0].allowed
        );
    }
}
