use crate::config::ResourceConfig;
use crate::query_operators::{BooleanQuery, MinMaxQuery, RangeField};
use crate::store::StoreConfig;

use super::common_operators;

pub fn resources(store: StoreConfig, _db_version: Option<&str>) -> Vec<ResourceConfig> {
    let mut query_operators = vec![
        MinMaxQuery::new([
            RangeField::number(
                "weighted_surface_energy",
                "weighted_surface_energy",
                "the weighted surface energy in J/m²",
            ),
            RangeField::number(
                "weighted_work_function",
                "weighted_work_function",
                "the weighted work function in eV",
            ),
            RangeField::number(
                "surface_energy_anisotropy",
                "surface_anisotropy",
                "the surface energy anisotropy",
            ),
            RangeField::number("shape_factor", "shape_factor", "the shape factor"),
        ])
        .into(),
        BooleanQuery::new(
            "has_reconstructed",
            "has_reconstructed",
            "Whether the entry has any reconstructed surfaces",
        )
        .into(),
    ];
    query_operators.extend(common_operators("SurfacePropDoc", &["task_id"]));
    vec![ResourceConfig::new("surface_properties", store, "SurfacePropDoc")
        .with_tags(&["Surface Properties"])
        .with_operators(query_operators)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::tests::{resource, search_keys};
    use crate::store::CollectionConfig;
    use serde_json::json;

    #[tokio::test]
    async fn search() {
        let store = StoreConfig::MemoryStore(CollectionConfig::new("surface_properties"));
        let resource = resource(
            resources(store, None).remove(0),
            vec![
                json!({"task_id": "mp-149", "weighted_surface_energy": 1.4, "surface_anisotropy": 0.06, "has_reconstructed": true}),
                json!({"task_id": "mp-13", "weighted_surface_energy": 2.5, "surface_anisotropy": 0.1, "has_reconstructed": false}),
            ],
        )
        .await;
        assert_eq!(
            vec!["mp-13"],
            search_keys(&resource, "weighted_surface_energy_min=2").await
        );
        assert_eq!(
            vec!["mp-149"],
            search_keys(&resource, "has_reconstructed=true").await
        );
        assert_eq!(
            vec!["mp-149"],
            search_keys(&resource, "surface_energy_anisotropy_max=0.08").await
        );
    }
}
