use crate::config::ResourceConfig;
use crate::query_operators::{ElementsQuery, FormulaQuery, IdListQuery};
use crate::store::StoreConfig;

use super::common_operators;

pub fn resources(store: StoreConfig, _db_version: Option<&str>) -> Vec<ResourceConfig> {
    let mut query_operators = vec![
        FormulaQuery::default().into(),
        ElementsQuery::default().into(),
        IdListQuery::new(
            "task_ids",
            "task_id",
            "Comma-separated list of task_ids to query on",
        )
        .into(),
    ];
    query_operators.extend(common_operators(
        "TaskDoc",
        &["task_id", "formula_pretty", "last_updated"],
    ));
    vec![ResourceConfig::new("tasks", store, "TaskDoc")
        .with_tags(&["Tasks"])
        .with_operators(query_operators)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query_params::QueryParams;
    use crate::routes::tests::{resource, search_keys};
    use crate::store::CollectionConfig;
    use crate::test_utils;
    use serde_json::json;

    #[tokio::test]
    async fn search_and_get() {
        let store = StoreConfig::MemoryStore(CollectionConfig::new("tasks"));
        let resource = resource(resources(store, None).remove(0), test_utils::materials_docs()).await;
        assert_eq!(
            vec!["mp-2133", "mp-149"],
            search_keys(&resource, "task_ids=mp-2133,mp-149,mp-1&sort_field=task_id&ascending=false").await
        );
        assert_eq!(vec!["mp-2133"], search_keys(&resource, "elements=Zn").await);

        let response = resource
            .get_by_key("mp-19017", &QueryParams::parse("fields=formula_pretty,nsites"))
            .await
            .unwrap();
        assert_eq!(
            vec![json!({"formula_pretty": "LiFePO4", "nsites": 28})],
            response.data
        );
    }
}
