use crate::config::ResourceConfig;
use crate::query_operators::{ChemsysQuery, MinMaxQuery, RangeField};
use crate::store::StoreConfig;

use super::common_operators;

pub fn resources(store: StoreConfig, _db_version: Option<&str>) -> Vec<ResourceConfig> {
    let moduli = [
        ("k_voigt", "the Voigt average of the bulk modulus in GPa"),
        ("k_reuss", "the Reuss average of the bulk modulus in GPa"),
        ("k_vrh", "the Voigt-Reuss-Hill average of the bulk modulus in GPa"),
        ("g_voigt", "the Voigt average of the shear modulus in GPa"),
        ("g_reuss", "the Reuss average of the shear modulus in GPa"),
        ("g_vrh", "the Voigt-Reuss-Hill average of the shear modulus in GPa"),
    ];
    let mut fields: Vec<RangeField> = moduli
        .iter()
        .map(|(name, description)| {
            RangeField::number(name, &format!("elasticity.{}", name), description)
        })
        .collect();
    fields.push(RangeField::number(
        "elastic_anisotropy",
        "elasticity.universal_anisotropy",
        "the elastic anisotropy",
    ));
    fields.push(RangeField::number(
        "poisson",
        "elasticity.homogeneous_poisson",
        "Poisson's ratio",
    ));

    let mut query_operators = vec![ChemsysQuery::default().into(), MinMaxQuery::new(fields).into()];
    query_operators.extend(common_operators("ElasticityDoc", &["task_id", "pretty_formula"]));
    vec![ResourceConfig::new("elasticity", store, "ElasticityDoc")
        .with_tags(&["Elasticity"])
        .with_operators(query_operators)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query_params::QueryParams;
    use crate::routes::tests::{resource, search_keys};
    use crate::store::CollectionConfig;
    use serde_json::json;

    #[tokio::test]
    async fn search() {
        let store = StoreConfig::MemoryStore(CollectionConfig::new("elasticity"));
        let resource = resource(
            resources(store, None).remove(0),
            vec![
                json!({
                    "task_id": "mp-149",
                    "pretty_formula": "Si",
                    "chemsys": "Si",
                    "elasticity": {"k_vrh": 88.0, "g_vrh": 61.0, "universal_anisotropy": 0.23, "homogeneous_poisson": 0.22}
                }),
                json!({
                    "task_id": "mp-2133",
                    "pretty_formula": "ZnO",
                    "chemsys": "O-Zn",
                    "elasticity": {"k_vrh": 130.0, "g_vrh": 40.0, "universal_anisotropy": 0.4, "homogeneous_poisson": 0.36}
                }),
            ],
        )
        .await;
        assert_eq!(vec!["mp-2133"], search_keys(&resource, "k_vrh_min=100").await);
        assert_eq!(vec!["mp-149"], search_keys(&resource, "poisson_max=0.3").await);
        assert_eq!(vec!["mp-2133"], search_keys(&resource, "chemsys=Zn-O").await);
        assert_eq!(
            vec!["mp-149", "mp-2133"],
            search_keys(&resource, "elastic_anisotropy_min=0.1&elastic_anisotropy_max=1").await
        );

        let response = resource
            .search(&QueryParams::parse("chemsys=Si"))
            .await
            .unwrap();
        assert_eq!(vec![json!({"task_id": "mp-149", "pretty_formula": "Si"})], response.data);
    }
}
