use crate::config::ResourceConfig;
use crate::models::magnetism::ORDERINGS;
use crate::query_operators::{ExactMatchQuery, MinMaxQuery, RangeField};
use crate::store::StoreConfig;

use super::common_operators;

pub fn resources(store: StoreConfig, _db_version: Option<&str>) -> Vec<ResourceConfig> {
    let mut query_operators = vec![
        ExactMatchQuery::new(
            "ordering",
            "magnetism.ordering",
            "Magnetic ordering of the material",
        )
        .with_allowed(ORDERINGS)
        .into(),
        MinMaxQuery::new([
            RangeField::number(
                "total_magnetization",
                "magnetism.total_magnetization",
                "the total magnetization in μB",
            ),
            RangeField::number(
                "total_magnetization_normalized_vol",
                "magnetism.total_magnetization_normalized_vol",
                "the total magnetization normalized by volume in μB/Å³",
            ),
            RangeField::number(
                "total_magnetization_normalized_formula_units",
                "magnetism.total_magnetization_normalized_formula_units",
                "the total magnetization normalized by formula unit in μB/f.u.",
            ),
            RangeField::integer(
                "num_magnetic_sites",
                "magnetism.num_magnetic_sites",
                "the number of magnetic sites",
            ),
            RangeField::integer(
                "num_unique_magnetic_sites",
                "magnetism.num_unique_magnetic_sites",
                "the number of unique magnetic sites",
            ),
        ])
        .into(),
    ];
    query_operators.extend(common_operators("MagnetismDoc", &["task_id", "last_updated"]));
    vec![ResourceConfig::new("magnetism", store, "MagnetismDoc")
        .with_tags(&["Magnetism"])
        .with_operators(query_operators)]
}
