use crate::config::ResourceConfig;
use crate::query_operators::{ExactMatchQuery, MinMaxQuery, RangeField, SubstrateOrientationQuery};
use crate::store::StoreConfig;

use super::common_operators;

/// Substrates are searched by film and substrate rather than fetched by key.
pub fn resources(store: StoreConfig, _db_version: Option<&str>) -> Vec<ResourceConfig> {
    let mut query_operators = vec![
        ExactMatchQuery::new("film_id", "film_id", "Materials Project ID of the film material")
            .into(),
        ExactMatchQuery::new(
            "substrate_id",
            "sub_id",
            "Materials Project ID of the substrate material",
        )
        .into(),
        ExactMatchQuery::new(
            "substrate_formula",
            "sub_form",
            "Reduced formula of the substrate material",
        )
        .into(),
        SubstrateOrientationQuery::default().into(),
        MinMaxQuery::new([
            RangeField::number("area", "area", "the minimum coincident interface area in Å²"),
            RangeField::number("energy", "energy", "the elastic energy in meV"),
        ])
        .into(),
    ];
    query_operators.extend(common_operators("SubstratesDoc", &["film_id", "sub_id"]));
    let mut config = ResourceConfig::new("substrates", store, "SubstratesDoc")
        .with_tags(&["Substrates"])
        .with_operators(query_operators);
    config.enable_get_by_key = false;
    vec![config]
}
