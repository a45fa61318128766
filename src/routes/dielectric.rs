use crate::config::ResourceConfig;
use crate::query_operators::{MinMaxQuery, RangeField};
use crate::store::StoreConfig;

use super::common_operators;

pub fn resources(store: StoreConfig, _db_version: Option<&str>) -> Vec<ResourceConfig> {
    let fields = [
        ("e_total", "the total dielectric constant"),
        ("e_ionic", "the ionic contribution to the dielectric constant"),
        ("e_static", "the electronic contribution to the dielectric constant"),
        ("n", "the refractive index"),
    ]
    .into_iter()
    .map(|(name, description)| {
        RangeField::number(name, &format!("dielectric.{}", name), description)
    });
    let mut query_operators = vec![MinMaxQuery::new(fields).into()];
    query_operators.extend(common_operators("DielectricDoc", &["task_id", "last_updated"]));
    vec![ResourceConfig::new("dielectric", store, "DielectricDoc")
        .with_tags(&["Dielectric"])
        .with_operators(query_operators)]
}
