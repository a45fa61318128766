use crate::config::ResourceConfig;
use crate::query_operators::{
    BooleanQuery, ChemsysQuery, ElementsQuery, ExactMatchQuery, MinMaxQuery, RangeField,
    VersionQuery,
};
use crate::store::StoreConfig;

use super::common_operators;

pub fn resources(store: StoreConfig, db_version: Option<&str>) -> Vec<ResourceConfig> {
    let mut query_operators = vec![
        VersionQuery::new(db_version.map(str::to_string)).into(),
        ChemsysQuery::default().into(),
        ElementsQuery::default().into(),
        ExactMatchQuery::integer("nelements", "nelements", "Number of elements in the material")
            .into(),
        BooleanQuery::new(
            "is_stable",
            "is_stable",
            "Whether the material is stable",
        )
        .into(),
        MinMaxQuery::new([
            RangeField::number("energy", "energy_per_atom", "the energy per atom in eV/atom"),
            RangeField::number(
                "formation_energy",
                "formation_energy_per_atom",
                "the formation energy per atom in eV/atom",
            ),
            RangeField::number(
                "energy_above_hull",
                "energy_above_hull",
                "the energy above the hull in eV/atom",
            ),
            RangeField::number(
                "equillibrium_reaction_energy",
                "equillibrium_reaction_energy_per_atom",
                "the reaction energy with the stable entries in eV/atom",
            ),
            RangeField::number(
                "uncorrected_energy",
                "uncorrected_energy_per_atom",
                "the uncorrected energy per atom in eV/atom",
            ),
        ])
        .into(),
    ];
    query_operators.extend(common_operators("ThermoDoc", &["task_id", "last_updated"]));
    vec![ResourceConfig::new("thermo", store, "ThermoDoc")
        .with_tags(&["Thermo"])
        .with_operators(query_operators)]
}
