use crate::config::ResourceConfig;
use crate::elements::SYMBOLS;
use crate::models::xas::{EDGES, SPECTRUM_TYPES};
use crate::query_operators::{ElementsQuery, ExactMatchQuery, FormulaQuery, IdListQuery};
use crate::store::StoreConfig;

use super::common_operators;

pub fn resources(store: StoreConfig, _db_version: Option<&str>) -> Vec<ResourceConfig> {
    let mut query_operators = vec![
        FormulaQuery::default().into(),
        ElementsQuery::default().into(),
        ExactMatchQuery::new("edge", "edge", "The absorption edge of the spectrum")
            .with_allowed(EDGES)
            .into(),
        ExactMatchQuery::new("spectrum_type", "spectrum_type", "The type of spectrum")
            .with_allowed(SPECTRUM_TYPES)
            .into(),
        ExactMatchQuery::new(
            "absorbing_element",
            "absorbing_element",
            "The absorbing element",
        )
        .with_allowed(SYMBOLS)
        .into(),
        IdListQuery::new(
            "task_ids",
            "task_id",
            "Comma-separated list of task_ids to query on",
        )
        .into(),
    ];
    query_operators.extend(common_operators(
        "XASDoc",
        &[
            "xas_id",
            "task_id",
            "edge",
            "absorbing_element",
            "formula_pretty",
            "spectrum_type",
            "last_updated",
        ],
    ));
    vec![ResourceConfig::new("xas", store, "XASDoc")
        .with_tags(&["XAS"])
        .with_operators(query_operators)]
}
