//! Store query fragments and their composition.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A partial store query produced by a query operator.
///
/// Fragments from several operators are combined with [merge_queries] before being executed
/// against a [crate::store::Store].
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct QueryFragment {
    /// MongoDB-style filter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub criteria: Option<Map<String, Value>>,

    /// Fields to project
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Vec<String>>,

    /// Sort specification, mapping field names to 1 (ascending) or -1 (descending)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<Map<String, Value>>,

    /// Number of documents to skip
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip: Option<u64>,

    /// Maximum number of documents to return
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
}

impl QueryFragment {
    /// Return a fragment holding only `criteria`.
    pub fn with_criteria(criteria: Map<String, Value>) -> Self {
        QueryFragment {
            criteria: Some(criteria),
            ..Default::default()
        }
    }

    /// Return a fragment holding a single criterion.
    pub fn criterion(field: impl Into<String>, condition: Value) -> Self {
        let mut criteria = Map::new();
        criteria.insert(field.into(), condition);
        Self::with_criteria(criteria)
    }

    /// Criteria of the fragment, or an empty filter.
    pub fn criteria(&self) -> Map<String, Value> {
        self.criteria.clone().unwrap_or_default()
    }

    /// Sort keys in order with their directions.
    ///
    /// Values other than a negative number sort ascending.
    pub fn sort_keys(&self) -> Vec<(String, SortDirection)> {
        self.sort
            .iter()
            .flatten()
            .map(|(field, direction)| (field.clone(), SortDirection::from_value(direction)))
            .collect()
    }
}

/// Direction of a sort key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum_macros::Display)]
pub enum SortDirection {
    #[strum(serialize = "ascending")]
    Ascending,
    #[strum(serialize = "descending")]
    Descending,
}

impl SortDirection {
    fn from_value(value: &Value) -> Self {
        match value.as_f64() {
            Some(direction) if direction < 0.0 => SortDirection::Descending,
            _ => SortDirection::Ascending,
        }
    }

    /// MongoDB representation of the direction.
    pub fn as_value(&self) -> Value {
        match self {
            SortDirection::Ascending => Value::from(1),
            SortDirection::Descending => Value::from(-1),
        }
    }
}

/// Merge query fragments into a single query.
///
/// Criteria merge key-wise with the last fragment winning on collisions. Properties are
/// concatenated and left unset when no fragment requests any. The remaining keys are taken
/// from the last fragment that sets them.
pub fn merge_queries<I>(queries: I) -> QueryFragment
where
    I: IntoIterator<Item = QueryFragment>,
{
    let mut criteria = Map::new();
    let mut properties = Vec::new();
    let mut merged = QueryFragment::default();
    for query in queries {
        if let Some(query_criteria) = query.criteria {
            criteria.extend(query_criteria);
        }
        if let Some(query_properties) = query.properties {
            properties.extend(query_properties);
        }
        if query.sort.is_some() {
            merged.sort = query.sort;
        }
        if query.skip.is_some() {
            merged.skip = query.skip;
        }
        if query.limit.is_some() {
            merged.limit = query.limit;
        }
    }
    merged.criteria = Some(criteria);
    merged.properties = if properties.is_empty() {
        None
    } else {
        Some(properties)
    };
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fragment(value: Value) -> QueryFragment {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn merge_empty() {
        let merged = merge_queries(vec![]);
        assert_eq!(Some(Map::new()), merged.criteria);
        assert_eq!(None, merged.properties);
        assert_eq!(None, merged.sort);
    }

    #[test]
    fn merge_criteria_last_wins() {
        let merged = merge_queries(vec![
            fragment(json!({"criteria": {"a": 1, "b": 2}})),
            fragment(json!({"criteria": {"b": 3, "c": 4}})),
        ]);
        assert_eq!(
            json!({"criteria": {"a": 1, "b": 3, "c": 4}}),
            serde_json::to_value(merged).unwrap()
        );
    }

    #[test]
    fn merge_properties_concatenate() {
        let merged = merge_queries(vec![
            fragment(json!({"properties": ["a", "b"]})),
            fragment(json!({"criteria": {"x": 1}})),
            fragment(json!({"properties": ["c"]})),
        ]);
        assert_eq!(
            Some(vec!["a".to_string(), "b".to_string(), "c".to_string()]),
            merged.properties
        );
    }

    #[test]
    fn merge_other_keys_shallow() {
        let merged = merge_queries(vec![
            fragment(json!({"skip": 0, "limit": 10, "sort": {"a": 1}})),
            fragment(json!({"limit": 5, "sort": {"b": -1}})),
        ]);
        assert_eq!(Some(0), merged.skip);
        assert_eq!(Some(5), merged.limit);
        assert_eq!(
            vec![("b".to_string(), SortDirection::Descending)],
            merged.sort_keys()
        );
    }

    #[test]
    fn fragment_serialisation_omits_unset_keys() {
        let query = QueryFragment::criterion("nelements", json!(2));
        assert_eq!(
            json!({"criteria": {"nelements": 2}}),
            serde_json::to_value(query).unwrap()
        );
    }

    #[test]
    fn sort_keys_preserve_order() {
        let query = fragment(json!({"sort": {"b": -1, "a": 1, "c": "x"}}));
        assert_eq!(
            vec![
                ("b".to_string(), SortDirection::Descending),
                ("a".to_string(), SortDirection::Ascending),
                ("c".to_string(), SortDirection::Ascending),
            ],
            query.sort_keys()
        );
    }

    #[test]
    fn sort_direction_display() {
        assert_eq!("ascending", SortDirection::Ascending.to_string());
        assert_eq!(json!(-1), SortDirection::Descending.as_value());
    }
}
