use crate::config::ResourceConfig;
use crate::query_operators::{MinMaxQuery, RangeField};
use crate::store::StoreConfig;

use super::common_operators;

pub fn resources(store: StoreConfig, _db_version: Option<&str>) -> Vec<ResourceConfig> {
    let mut query_operators = vec![MinMaxQuery::new([RangeField::number(
        "piezo_modulus",
        "piezo.e_ij_max",
        "the piezoelectric modulus in C/m²",
    )])
    .into()];
    query_operators.extend(common_operators("PiezoDoc", &["task_id", "last_updated"]));
    vec![ResourceConfig::new("piezoelectric", store, "PiezoDoc")
        .with_tags(&["Piezoelectric"])
        .with_operators(query_operators)]
}
