//! Film and substrate surface orientations.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map};

use crate::error::ApiError;
use crate::query::QueryFragment;
use crate::query_operator::{ParamSpec, QueryOperator};
use crate::query_params::QueryParams;

/// Matches surface orientations given as comma separated Miller indices, e.g.
/// `film_orientation=1,0,0`. Orientations are stored space separated.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct SubstrateOrientationQuery {}

const ORIENTATIONS: [(&str, &str, &str); 2] = [
    (
        "film_orientation",
        "film_orient",
        "Comma separated integers defining the film surface orientation.",
    ),
    (
        "substrate_orientation",
        "orient",
        "Comma separated integers defining the substrate surface orientation.",
    ),
];

fn miller_indices(name: &str, value: &str) -> Result<String, ApiError> {
    let indices = value
        .split(',')
        .map(|index| {
            index
                .trim()
                .parse::<i32>()
                .map_err(|err| ApiError::invalid_parameter(name, err))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(indices
        .iter()
        .map(i32::to_string)
        .collect::<Vec<_>>()
        .join(" "))
}

impl QueryOperator for SubstrateOrientationQuery {
    fn parameters(&self) -> Vec<ParamSpec> {
        ORIENTATIONS
            .iter()
            .map(|(param, _, description)| ParamSpec::string(*param, *description))
            .collect()
    }

    fn query(&self, params: &QueryParams) -> Result<QueryFragment, ApiError> {
        let mut criteria = Map::new();
        for (param, field, _) in ORIENTATIONS {
            if let Some(value) = params.get(param) {
                criteria.insert(field.to_string(), json!(miller_indices(param, value)?));
            }
        }
        Ok(QueryFragment::with_criteria(criteria))
    }

    fn ensure_indexes(&self) -> Vec<(String, bool)> {
        ORIENTATIONS
            .iter()
            .map(|(_, field, _)| (field.to_string(), false))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn orientations() {
        let params = QueryParams::from_pairs([
            ("film_orientation", "1,0,0"),
            ("substrate_orientation", "1, 1, -1"),
        ]);
        let query = SubstrateOrientationQuery::default().query(&params).unwrap();
        assert_eq!(
            json!({"film_orient": "1 0 0", "orient": "1 1 -1"}),
            Value::Object(query.criteria())
        );
    }

    #[test]
    fn invalid_orientation() {
        let params = QueryParams::from_pairs([("film_orientation", "1,a,0")]);
        assert!(matches!(
            SubstrateOrientationQuery::default().query(&params),
            Err(ApiError::InvalidParameter { .. })
        ));
    }
}
