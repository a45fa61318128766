//! Resource definitions for each data route.
//!
//! Each route module describes its resources as [ResourceConfig]s, so the default application
//! and user supplied application definitions are built the same way.

pub mod dielectric;
pub mod elasticity;
pub mod magnetism;
pub mod materials;
pub mod piezo;
pub mod substrates;
pub mod surface_properties;
pub mod tasks;
pub mod thermo;
pub mod xas;

use crate::config::ResourceConfig;
use crate::query_operators::{Operator, PaginationQuery, SortQuery, SparseFieldsQuery};
use crate::store::StoreConfig;

/// A route of the default application.
pub struct Route {
    /// Collection name, also used to name the store file
    pub name: &'static str,
    /// Key field of the collection
    pub key: &'static str,
    /// Build the resources served from the collection
    pub resources: fn(StoreConfig, Option<&str>) -> Vec<ResourceConfig>,
}

pub static ROUTES: [Route; 10] = [
    Route {
        name: "materials",
        key: "task_id",
        resources: materials::resources,
    },
    Route {
        name: "thermo",
        key: "task_id",
        resources: thermo::resources,
    },
    Route {
        name: "elasticity",
        key: "task_id",
        resources: elasticity::resources,
    },
    Route {
        name: "xas",
        key: "xas_id",
        resources: xas::resources,
    },
    Route {
        name: "tasks",
        key: "task_id",
        resources: tasks::resources,
    },
    Route {
        name: "magnetism",
        key: "task_id",
        resources: magnetism::resources,
    },
    Route {
        name: "dielectric",
        key: "task_id",
        resources: dielectric::resources,
    },
    Route {
        name: "piezoelectric",
        key: "task_id",
        resources: piezo::resources,
    },
    Route {
        name: "surface_properties",
        key: "task_id",
        resources: surface_properties::resources,
    },
    Route {
        name: "substrates",
        key: "film_id",
        resources: substrates::resources,
    },
];

/// Resources of the default application.
///
/// `store` returns the store of a collection given its name and key field, or `None` to leave
/// the route out. `db_version` is the default version of versioned resources.
pub fn default_resources<F>(mut store: F, db_version: Option<&str>) -> Vec<ResourceConfig>
where
    F: FnMut(&str, &str) -> Option<StoreConfig>,
{
    ROUTES
        .iter()
        .filter_map(|route| store(route.name, route.key).map(|store| (route, store)))
        .flat_map(|(route, store)| (route.resources)(store, db_version))
        .collect()
}

/// Sort, pagination and sparse fields, the operators ending most search resources.
pub(crate) fn common_operators(model: &str, default_fields: &[&str]) -> Vec<Operator> {
    vec![
        SortQuery::default().into(),
        PaginationQuery::default().into(),
        SparseFieldsQuery::new(model, Some(default_fields.to_vec())).into(),
    ]
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::query_params::QueryParams;
    use crate::resource::Resource;
    use crate::store::CollectionConfig;
    use serde_json::Value;
    use validator::Validate;

    /// Build `config` over a memory store holding `docs`.
    pub(crate) async fn resource(config: ResourceConfig, docs: Vec<Value>) -> Resource {
        config.validate().unwrap();
        let resource = config.build().await.unwrap();
        resource.store().update(docs).await.unwrap();
        resource
    }

    /// Keys of the documents found by a search.
    pub(crate) async fn search_keys(resource: &Resource, query: &str) -> Vec<String> {
        let key = resource.store().key().to_string();
        resource
            .search(&QueryParams::parse(query))
            .await
            .unwrap()
            .data
            .iter()
            .map(|doc| doc[key.as_str()].as_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn default_resources_all() {
        let resources = default_resources(
            |name, key| {
                Some(StoreConfig::MemoryStore(
                    CollectionConfig::new(name).with_key(key),
                ))
            },
            Some("2021_03_22"),
        );
        let prefixes: Vec<&str> = resources.iter().map(|r| r.prefix.as_str()).collect();
        assert_eq!(
            vec![
                "materials",
                "tasks/deprecation",
                "thermo",
                "elasticity",
                "xas",
                "tasks",
                "magnetism",
                "dielectric",
                "piezoelectric",
                "surface_properties",
                "substrates",
            ],
            prefixes
        );
        for resource in &resources {
            resource.validate().unwrap();
        }
    }

    #[test]
    fn default_resources_subset() {
        let resources = default_resources(
            |name, key| {
                (name == "xas").then(|| {
                    StoreConfig::MemoryStore(CollectionConfig::new(name).with_key(key))
                })
            },
            None,
        );
        assert_eq!(1, resources.len());
        assert_eq!("xas_id", resources[0].store.key());
    }
}
