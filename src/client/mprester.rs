//! Aggregate client over every route of the API.

use serde_json::Value;

use super::resters::*;
use super::rester::http_client;
use super::{ClientSettings, RestError};

/// Client for the Materials API.
///
/// Each route has its own rester; all share one HTTP client and therefore one connection
/// pool.
#[derive(Clone, Debug)]
pub struct MPRester {
    pub materials: MaterialsRester,
    pub task_deprecation: TaskDeprecationRester,
    pub thermo: ThermoRester,
    pub elasticity: ElasticityRester,
    pub xas: XASRester,
    pub tasks: TaskRester,
    pub magnetism: MagnetismRester,
    pub dielectric: DielectricRester,
    pub piezoelectric: PiezoRester,
    pub surface_properties: SurfacePropertiesRester,
    pub substrates: SubstratesRester,
}

impl MPRester {
    pub fn new(settings: &ClientSettings) -> Result<Self, RestError> {
        let client = http_client(settings)?;
        Ok(MPRester {
            materials: Rester::new(client.clone(), settings, "materials", "task_id")?,
            task_deprecation: TaskDeprecationRester::new(client.clone(), settings)?,
            thermo: Rester::new(client.clone(), settings, "thermo", "task_id")?,
            elasticity: Rester::new(client.clone(), settings, "elasticity", "task_id")?,
            xas: Rester::new(client.clone(), settings, "xas", "xas_id")?,
            tasks: Rester::new(client.clone(), settings, "tasks", "task_id")?,
            magnetism: Rester::new(client.clone(), settings, "magnetism", "task_id")?,
            dielectric: Rester::new(client.clone(), settings, "dielectric", "task_id")?,
            piezoelectric: Rester::new(client.clone(), settings, "piezoelectric", "task_id")?,
            surface_properties: Rester::new(
                client.clone(),
                settings,
                "surface_properties",
                "task_id",
            )?,
            substrates: Rester::new(client, settings, "substrates", "film_id")?,
        })
    }

    /// Return the structure of a material as a pymatgen `Structure` dictionary.
    ///
    /// With `final_structure` the relaxed structure is returned, otherwise the first of the
    /// initial structures.
    pub async fn get_structure_by_material_id(
        &self,
        material_id: &str,
        final_structure: bool,
    ) -> Result<Value, RestError> {
        let field = if final_structure {
            "structure"
        } else {
            "initial_structures"
        };
        let fields = [field.to_string()];
        let doc = self
            .materials
            .get_data_by_id(material_id, Some(&fields[..]))
            .await?;
        let structure = if final_structure {
            doc.structure
        } else {
            doc.initial_structures
                .and_then(|structures| structures.into_iter().next())
        };
        structure.ok_or_else(|| RestError::NotFound {
            suffix: format!("materials/{}", field),
            id: material_id.to_string(),
        })
    }

    /// Deprecation state of each of `task_ids`.
    pub async fn get_task_deprecation(
        &self,
        task_ids: &[&str],
    ) -> Result<Vec<TaskDeprecation>, RestError> {
        self.task_deprecation.get(task_ids).await
    }
}
