//! Task deprecation lookup.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::query::QueryFragment;
use crate::query_operator::{ParamSpec, QueryOperator};
use crate::query_params::QueryParams;

/// Checks whether tasks have been deprecated by the materials built from them.
///
/// Matches materials listing any of the requested `task_ids` as deprecated, then replaces
/// the matched materials with one record per requested task.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct TaskDeprecationQuery {}

fn requested_ids(params: &QueryParams) -> Result<Vec<String>, ApiError> {
    match params.get_list("task_ids") {
        Some(ids) if !ids.is_empty() => Ok(ids),
        _ => Err(ApiError::invalid_parameter("task_ids", "field required")),
    }
}

impl QueryOperator for TaskDeprecationQuery {
    fn parameters(&self) -> Vec<ParamSpec> {
        vec![ParamSpec::string(
            "task_ids",
            "Comma separated list of task ids to check for deprecation.",
        )
        .required()]
    }

    fn query(&self, params: &QueryParams) -> Result<QueryFragment, ApiError> {
        let ids = requested_ids(params)?;
        Ok(QueryFragment {
            properties: Some(vec!["deprecated_tasks".to_string(), "task_id".to_string()]),
            ..QueryFragment::criterion("deprecated_tasks", json!({ "$in": ids }))
        })
    }

    fn post_process(&self, docs: Vec<Value>, params: &QueryParams) -> Result<Vec<Value>, ApiError> {
        let ids = requested_ids(params)?;
        let deprecated: Vec<&str> = docs
            .iter()
            .filter_map(|doc| doc.get("deprecated_tasks").and_then(Value::as_array))
            .flatten()
            .filter_map(Value::as_str)
            .collect();
        Ok(ids
            .into_iter()
            .map(|task_id| {
                let is_deprecated = deprecated.contains(&task_id.as_str());
                json!({
                    "task_id": task_id,
                    "deprecated": is_deprecated,
                    "deprecation_reason": Value::Null,
                })
            })
            .collect())
    }

    fn ensure_indexes(&self) -> Vec<(String, bool)> {
        vec![("deprecated_tasks".to_string(), false)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query() {
        let params = QueryParams::from_pairs([("task_ids", "mp-1,mp-2")]);
        let query = TaskDeprecationQuery::default().query(&params).unwrap();
        assert_eq!(
            json!({
                "criteria": {"deprecated_tasks": {"$in": ["mp-1", "mp-2"]}},
                "properties": ["deprecated_tasks", "task_id"]
            }),
            serde_json::to_value(query).unwrap()
        );
    }

    #[test]
    fn task_ids_required() {
        let result = TaskDeprecationQuery::default().query(&QueryParams::default());
        assert!(matches!(result, Err(ApiError::InvalidParameter { .. })));
    }

    #[test]
    fn post_process() {
        let params = QueryParams::from_pairs([("task_ids", "mp-1,mp-2,mp-3")]);
        let docs = vec![
            json!({"task_id": "mp-10", "deprecated_tasks": ["mp-1"]}),
            json!({"task_id": "mp-11", "deprecated_tasks": ["mp-3", "mp-99"]}),
        ];
        let records = TaskDeprecationQuery::default()
            .post_process(docs, &params)
            .unwrap();
        assert_eq!(
            vec![
                json!({"task_id": "mp-1", "deprecated": true, "deprecation_reason": null}),
                json!({"task_id": "mp-2", "deprecated": false, "deprecation_reason": null}),
                json!({"task_id": "mp-3", "deprecated": true, "deprecation_reason": null}),
            ],
            records
        );
    }
}
