//! Sorting by a single field.

use serde::{Deserialize, Serialize};
use serde_json::Map;

use crate::error::ApiError;
use crate::query::{QueryFragment, SortDirection};
use crate::query_operator::{ParamSpec, QueryOperator};
use crate::query_params::QueryParams;

/// Provides `sort_field` and `ascending` parameters. Both must be given together.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct SortQuery {}

impl QueryOperator for SortQuery {
    fn parameters(&self) -> Vec<ParamSpec> {
        vec![
            ParamSpec::string("sort_field", "Field to sort with"),
            ParamSpec::boolean("ascending", "Whether the sorting should be ascending"),
        ]
    }

    fn query(&self, params: &QueryParams) -> Result<QueryFragment, ApiError> {
        match (params.get("sort_field"), params.get_bool("ascending")?) {
            (Some(field), Some(ascending)) => {
                let direction = if ascending {
                    SortDirection::Ascending
                } else {
                    SortDirection::Descending
                };
                let mut sort = Map::new();
                sort.insert(field.trim().to_string(), direction.as_value());
                Ok(QueryFragment {
                    sort: Some(sort),
                    ..Default::default()
                })
            }
            (None, None) => Ok(QueryFragment::default()),
            _ => Err(ApiError::IncompleteSort),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ascending() {
        let params = QueryParams::from_pairs([("sort_field", "volume"), ("ascending", "true")]);
        let query = SortQuery::default().query(&params).unwrap();
        assert_eq!(json!({"sort": {"volume": 1}}), serde_json::to_value(query).unwrap());
    }

    #[test]
    fn descending() {
        let params = QueryParams::from_pairs([("sort_field", "volume"), ("ascending", "false")]);
        let query = SortQuery::default().query(&params).unwrap();
        assert_eq!(json!({"sort": {"volume": -1}}), serde_json::to_value(query).unwrap());
    }

    #[test]
    fn no_sort() {
        let query = SortQuery::default().query(&QueryParams::default()).unwrap();
        assert_eq!(QueryFragment::default(), query);
    }

    #[test]
    fn incomplete() {
        for params in [
            QueryParams::from_pairs([("sort_field", "volume")]),
            QueryParams::from_pairs([("ascending", "true")]),
        ] {
            assert!(matches!(
                SortQuery::default().query(&params),
                Err(ApiError::IncompleteSort)
            ));
        }
    }
}
