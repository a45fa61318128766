//! Database version selection.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::ApiError;
use crate::query::QueryFragment;
use crate::query_operator::{ParamSpec, QueryOperator};
use crate::query_params::QueryParams;

/// Restricts documents to a database release through their `version` field.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct VersionQuery {
    /// Version used when the request does not name one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_version: Option<String>,
}

impl VersionQuery {
    pub fn new(default_version: Option<String>) -> Self {
        VersionQuery { default_version }
    }
}

impl QueryOperator for VersionQuery {
    fn parameters(&self) -> Vec<ParamSpec> {
        let spec = ParamSpec::string(
            "version",
            "Database version to query on formatted as YYYY.MM.DD",
        );
        match &self.default_version {
            Some(version) => vec![spec.with_default(version.as_str())],
            None => vec![spec],
        }
    }

    fn query(&self, params: &QueryParams) -> Result<QueryFragment, ApiError> {
        let version = params
            .get("version")
            .map(|version| version.trim().to_string())
            .or_else(|| self.default_version.clone());
        Ok(match version {
            Some(version) => QueryFragment::criterion("version", json!(version)),
            None => QueryFragment::default(),
        })
    }

    fn ensure_indexes(&self) -> Vec<(String, bool)> {
        vec![("version".to_string(), false)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requested_version() {
        let params = QueryParams::from_pairs([("version", "2021.03.22")]);
        let query = VersionQuery::default().query(&params).unwrap();
        assert_eq!(
            json!({"criteria": {"version": "2021.03.22"}}),
            serde_json::to_value(query).unwrap()
        );
    }

    #[test]
    fn default_version() {
        let op = VersionQuery::new(Some("2020.09.08".to_string()));
        let query = op.query(&QueryParams::default()).unwrap();
        assert_eq!(
            json!({"criteria": {"version": "2020.09.08"}}),
            serde_json::to_value(query).unwrap()
        );
        let params = QueryParams::from_pairs([("version", "2021.03.22")]);
        let query = op.query(&params).unwrap();
        assert_eq!(Some(json!("2021.03.22")), query.criteria().get("version").cloned());
    }

    #[test]
    fn no_version() {
        let query = VersionQuery::default().query(&QueryParams::default()).unwrap();
        assert_eq!(QueryFragment::default(), query);
    }
}
