//! Pagination by skip and limit.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use validator::{Validate, ValidationError};

use crate::error::ApiError;
use crate::query::QueryFragment;
use crate::query_operator::{MetaContext, ParamSpec, QueryOperator};
use crate::query_params::QueryParams;

/// Provides `skip` and `limit` parameters.
///
/// A limit that is not positive or that exceeds `max_limit` is replaced by `max_limit`.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, Validate)]
#[serde(default)]
#[validate(schema(function = "validate_pagination"))]
pub struct PaginationQuery {
    /// Number of documents skipped when `skip` is not given
    pub default_skip: u64,
    /// Number of documents returned when `limit` is not given
    #[validate(range(min = 1, message = "default_limit must be greater than 0"))]
    pub default_limit: u64,
    /// Upper bound on the number of documents returned
    #[validate(range(min = 1, message = "max_limit must be greater than 0"))]
    pub max_limit: u64,
}

impl Default for PaginationQuery {
    fn default() -> Self {
        PaginationQuery {
            default_skip: 0,
            default_limit: 10,
            max_limit: 100,
        }
    }
}

impl PaginationQuery {
    pub fn new(default_skip: u64, default_limit: u64, max_limit: u64) -> Self {
        PaginationQuery {
            default_skip,
            default_limit,
            max_limit,
        }
    }
}

fn validate_pagination(pagination: &PaginationQuery) -> Result<(), ValidationError> {
    if pagination.default_limit > pagination.max_limit {
        let mut error = ValidationError::new("default_limit must not exceed max_limit");
        error.add_param("default_limit".into(), &pagination.default_limit);
        error.add_param("max_limit".into(), &pagination.max_limit);
        return Err(error);
    }
    Ok(())
}

impl QueryOperator for PaginationQuery {
    fn parameters(&self) -> Vec<ParamSpec> {
        vec![
            ParamSpec::integer("skip", "Number of entries to skip in the search")
                .with_default(self.default_skip),
            ParamSpec::integer(
                "limit",
                format!(
                    "Max number of entries to return in a single query. Limited to {}",
                    self.max_limit
                ),
            )
            .with_default(self.default_limit),
        ]
    }

    fn query(&self, params: &QueryParams) -> Result<QueryFragment, ApiError> {
        let skip = params
            .get_parsed::<i64>("skip")?
            .unwrap_or(self.default_skip as i64);
        if skip < 0 {
            return Err(ApiError::invalid_parameter(
                "skip",
                "must not be negative",
            ));
        }
        let limit = params
            .get_parsed::<i64>("limit")?
            .unwrap_or(self.default_limit as i64);
        let limit = if limit <= 0 || limit as u64 > self.max_limit {
            self.max_limit
        } else {
            limit as u64
        };
        Ok(QueryFragment {
            skip: Some(skip as u64),
            limit: Some(limit),
            ..Default::default()
        })
    }

    fn meta(&self, context: &MetaContext) -> Map<String, Value> {
        let mut meta = Map::new();
        meta.insert("max_limit".to_string(), json!(self.max_limit));
        meta.insert("total_doc".to_string(), json!(context.total_doc));
        meta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let op = PaginationQuery::default();
        let query = op.query(&QueryParams::default()).unwrap();
        assert_eq!(Some(0), query.skip);
        assert_eq!(Some(10), query.limit);
        assert_eq!(None, query.criteria);
    }

    #[test]
    fn explicit() {
        let op = PaginationQuery::default();
        let params = QueryParams::from_pairs([("skip", "20"), ("limit", "50")]);
        let query = op.query(&params).unwrap();
        assert_eq!(Some(20), query.skip);
        assert_eq!(Some(50), query.limit);
    }

    #[test]
    fn limit_clamped_to_max() {
        let op = PaginationQuery::new(0, 10, 100);
        for limit in ["0", "-5", "101", "1000"] {
            let params = QueryParams::from_pairs([("limit", limit)]);
            assert_eq!(Some(100), op.query(&params).unwrap().limit, "limit: {limit}");
        }
    }

    #[test]
    fn negative_skip() {
        let op = PaginationQuery::default();
        let params = QueryParams::from_pairs([("skip", "-1")]);
        assert!(matches!(
            op.query(&params),
            Err(ApiError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn invalid_limit() {
        let op = PaginationQuery::default();
        let params = QueryParams::from_pairs([("limit", "ten")]);
        assert!(matches!(
            op.query(&params),
            Err(ApiError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn meta() {
        let op = PaginationQuery::new(0, 10, 50);
        let meta = op.meta(&MetaContext { total_doc: 42 });
        assert_eq!(json!({"max_limit": 50, "total_doc": 42}), Value::Object(meta));
    }

    #[test]
    fn parameters() {
        let names: Vec<String> = PaginationQuery::default()
            .parameters()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(vec!["skip", "limit"], names);
    }

    #[test]
    fn validation() {
        PaginationQuery::default().validate().unwrap();
        assert!(PaginationQuery::new(0, 200, 100).validate().is_err());
        assert!(PaginationQuery::new(0, 0, 100).validate().is_err());
    }
}
