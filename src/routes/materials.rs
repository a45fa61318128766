//! Core material documents and task deprecation.

use crate::config::ResourceConfig;
use crate::query_operators::{
    BooleanQuery, ElementsQuery, FormulaQuery, IdListQuery, MinMaxQuery, PaginationQuery,
    RangeField, SymmetryQuery, TaskDeprecationQuery, VersionQuery,
};
use crate::store::StoreConfig;

use super::common_operators;

/// Search and get-by-key over material documents.
pub fn materials_resource(store: StoreConfig, db_version: Option<&str>) -> ResourceConfig {
    let mut query_operators = vec![
        VersionQuery::new(db_version.map(str::to_string)).into(),
        FormulaQuery::default().into(),
        ElementsQuery::default().into(),
        IdListQuery::new(
            "task_ids",
            "task_ids",
            "Comma-separated list of task_ids to query on",
        )
        .into(),
        SymmetryQuery::default().into(),
        BooleanQuery::new(
            "deprecated",
            "deprecated",
            "Whether the material is marked as deprecated",
        )
        .into(),
        MinMaxQuery::new([
            RangeField::integer("nsites", "nsites", "the number of sites"),
            RangeField::number("volume", "volume", "the lattice volume"),
            RangeField::number("density", "density", "the density"),
        ])
        .into(),
    ];
    query_operators.extend(common_operators(
        "MaterialsDoc",
        &["task_id", "formula_pretty", "last_updated"],
    ));
    ResourceConfig::new("materials", store, "MaterialsDoc")
        .with_tags(&["Materials"])
        .with_operators(query_operators)
}

/// Deprecation status of tasks, answered from the materials built on them.
pub fn task_deprecation_resource(store: StoreConfig) -> ResourceConfig {
    let mut config = ResourceConfig::new("tasks/deprecation", store, "MaterialsDoc")
        .with_tags(&["Tasks"])
        .with_operators(vec![
            TaskDeprecationQuery::default().into(),
            PaginationQuery::default().into(),
        ]);
    config.enable_get_by_key = false;
    config
}

pub fn resources(store: StoreConfig, db_version: Option<&str>) -> Vec<ResourceConfig> {
    vec![
        materials_resource(store.clone(), db_version),
        task_deprecation_resource(store),
    ]
}
