//! Typed resters for each route of the API.

use std::marker::PhantomData;
use std::ops::Deref;

use serde::{Deserialize, Serialize};

use super::{BaseRester, ClientSettings, RestError, Search};
use crate::models::dielectric::DielectricDoc;
use crate::models::elasticity::ElasticityDoc;
use crate::models::magnetism::MagnetismDoc;
use crate::models::materials::MaterialsDoc;
use crate::models::piezo::PiezoDoc;
use crate::models::substrates::SubstratesDoc;
use crate::models::surface_properties::SurfacePropDoc;
use crate::models::tasks::TaskDoc;
use crate::models::thermo::ThermoDoc;
use crate::models::xas::XASDoc;
use crate::models::DocumentModel;

/// Rester returning documents of type `T`.
#[derive(Clone, Debug)]
pub struct Rester<T> {
    base: BaseRester,
    model: PhantomData<T>,
}

impl<T: DocumentModel> Rester<T> {
    pub fn new(
        client: reqwest::Client,
        settings: &ClientSettings,
        suffix: &str,
        primary_key: &'static str,
    ) -> Result<Self, RestError> {
        Ok(Rester {
            base: BaseRester::with_client(client, settings, suffix, T::NAME, primary_key)?,
            model: PhantomData,
        })
    }

    /// Start a search.
    pub fn search(&self) -> Search<'_, T> {
        self.base.search()
    }

    /// Return the document with identifier `id`.
    pub async fn get_data_by_id(&self, id: &str, fields: Option<&[String]>) -> Result<T, RestError> {
        self.base.get_data_by_id(id, fields).await
    }
}

impl<T> Deref for Rester<T> {
    type Target = BaseRester;

    fn deref(&self) -> &BaseRester {
        &self.base
    }
}

pub type MaterialsRester = Rester<MaterialsDoc>;
pub type ThermoRester = Rester<ThermoDoc>;
pub type ElasticityRester = Rester<ElasticityDoc>;
pub type XASRester = Rester<XASDoc>;
pub type TaskRester = Rester<TaskDoc>;
pub type MagnetismRester = Rester<MagnetismDoc>;
pub type DielectricRester = Rester<DielectricDoc>;
pub type PiezoRester = Rester<PiezoDoc>;
pub type SurfacePropertiesRester = Rester<SurfacePropDoc>;
pub type SubstratesRester = Rester<SubstratesDoc>;

/// Deprecation state of a task.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct TaskDeprecation {
    pub task_id: String,
    pub deprecated: bool,
    pub deprecation_reason: Option<String>,
}

/// Rester for the `tasks/deprecation` route.
#[derive(Clone, Debug)]
pub struct TaskDeprecationRester {
    base: BaseRester,
}

impl TaskDeprecationRester {
    pub fn new(client: reqwest::Client, settings: &ClientSettings) -> Result<Self, RestError> {
        Ok(TaskDeprecationRester {
            base: BaseRester::with_client(
                client,
                settings,
                "tasks/deprecation",
                MaterialsDoc::NAME,
                "task_id",
            )?,
        })
    }

    /// Deprecation state of each of `task_ids`, in request order.
    pub async fn get(&self, task_ids: &[&str]) -> Result<Vec<TaskDeprecation>, RestError> {
        let criteria = [("task_ids".to_string(), task_ids.join(","))];
        let chunk_size = task_ids.len().max(1) as u64;
        self.base
            .query_resource(&criteria, None, None, Some(1), Some(chunk_size))
            .await?
            .data
            .into_iter()
            .map(|doc| serde_json::from_value(doc).map_err(RestError::from))
            .collect()
    }
}

/// Generate builder methods for `<name>_min` and `<name>_max` range parameters.
macro_rules! range_params {
    ($($(#[$attr:meta])* $name:ident: $ty:ty),* $(,)?) => {
        $(
            $(#[$attr])*
            pub fn $name(self, range: ($ty, $ty)) -> Self {
                self.range(stringify!($name), range)
            }
        )*
    };
}

impl Search<'_, MaterialsDoc> {
    /// One of the seven crystal systems, such as `Cubic`.
    pub fn crystal_system(self, crystal_system: &str) -> Self {
        self.param("crystal_system", crystal_system)
    }

    pub fn spacegroup_number(self, number: u32) -> Self {
        self.param("spacegroup_number", number)
    }

    pub fn spacegroup_symbol(self, symbol: &str) -> Self {
        self.param("spacegroup_symbol", symbol)
    }

    pub fn deprecated(self, deprecated: bool) -> Self {
        self.param("deprecated", deprecated)
    }

    range_params! {
        nsites: u64,
        /// Volume in Å³
        volume: f64,
        /// Density in g/cm³
        density: f64,
    }
}

impl Search<'_, ThermoDoc> {
    pub fn is_stable(self, is_stable: bool) -> Self {
        self.param("is_stable", is_stable)
    }

    pub fn nelements(self, nelements: u64) -> Self {
        self.param("nelements", nelements)
    }

    range_params! {
        /// Corrected energy in eV/atom
        energy: f64,
        /// Formation energy in eV/atom
        formation_energy: f64,
        /// Energy above the convex hull in eV/atom
        energy_above_hull: f64,
        equillibrium_reaction_energy: f64,
        uncorrected_energy: f64,
    }
}

impl Search<'_, ElasticityDoc> {
    range_params! {
        k_voigt: f64,
        k_reuss: f64,
        k_vrh: f64,
        g_voigt: f64,
        g_reuss: f64,
        g_vrh: f64,
        elastic_anisotropy: f64,
        poisson: f64,
    }
}

impl Search<'_, XASDoc> {
    /// Absorption edge, such as `K` or `L3`.
    pub fn edge(self, edge: &str) -> Self {
        self.param("edge", edge)
    }

    /// Spectrum type, such as `XANES`.
    pub fn spectrum_type(self, spectrum_type: &str) -> Self {
        self.param("spectrum_type", spectrum_type)
    }

    pub fn absorbing_element(self, element: &str) -> Self {
        self.param("absorbing_element", element)
    }
}

impl Search<'_, MagnetismDoc> {
    /// Magnetic ordering: one of `FM`, `AFM`, `FiM` or `NM`.
    pub fn ordering(self, ordering: &str) -> Self {
        self.param("ordering", ordering)
    }

    range_params! {
        total_magnetization: f64,
        total_magnetization_normalized_vol: f64,
        total_magnetization_normalized_formula_units: f64,
        num_magnetic_sites: u64,
        num_unique_magnetic_sites: u64,
    }
}

impl Search<'_, DielectricDoc> {
    range_params! {
        e_total: f64,
        e_ionic: f64,
        e_static: f64,
        /// Refractive index
        n: f64,
    }
}

impl Search<'_, PiezoDoc> {
    range_params! {
        /// Piezoelectric modulus in C/m²
        piezo_modulus: f64,
    }
}

impl Search<'_, SurfacePropDoc> {
    pub fn has_reconstructed(self, has_reconstructed: bool) -> Self {
        self.param("has_reconstructed", has_reconstructed)
    }

    range_params! {
        weighted_surface_energy: f64,
        weighted_work_function: f64,
        surface_energy_anisotropy: f64,
        shape_factor: f64,
    }
}

impl Search<'_, SubstratesDoc> {
    pub fn film_id(self, film_id: &str) -> Self {
        self.param("film_id", film_id)
    }

    pub fn substrate_id(self, substrate_id: &str) -> Self {
        self.param("substrate_id", substrate_id)
    }

    pub fn substrate_formula(self, formula: &str) -> Self {
        self.param("substrate_formula", formula)
    }

    /// Miller indices of the film surface.
    pub fn film_orientation(self, orientation: [i32; 3]) -> Self {
        self.list("film_orientation", &orientation.map(|i| i.to_string()))
    }

    /// Miller indices of the substrate surface.
    pub fn substrate_orientation(self, orientation: [i32; 3]) -> Self {
        self.list("substrate_orientation", &orientation.map(|i| i.to_string()))
    }

    range_params! {
        /// Minimum coincident interface area in Å²
        area: f64,
        /// Elastic energy in meV
        energy: f64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn settings(server: &mockito::Server) -> ClientSettings {
        ClientSettings::new(&server.url(), None)
    }

    #[tokio::test]
    async fn substrate_orientation() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/substrates/")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("film_orientation".into(), "1,0,0".into()),
                Matcher::UrlEncoded("substrate_orientation".into(), "1,1,-1".into()),
                Matcher::UrlEncoded("area_min".into(), "0".into()),
                Matcher::UrlEncoded("area_max".into(), "100".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"data": [{"film_id": "mp-1", "sub_id": "mp-2"}], "meta": {"api_version": "0.3.0", "time_stamp": "2021-03-04T10:11:12Z", "total_doc": 1}}"#)
            .create_async()
            .await;
        let settings = settings(&server);
        let rester =
            SubstratesRester::new(reqwest::Client::new(), &settings, "substrates", "film_id").unwrap();
        let docs = rester
            .search()
            .film_orientation([1, 0, 0])
            .substrate_orientation([1, 1, -1])
            .area((0.0, 100.0))
            .send()
            .await
            .unwrap();
        assert_eq!(Some("mp-2".to_string()), docs[0].sub_id);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn task_deprecation() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/tasks/deprecation/")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("task_ids".into(), "mp-1,mp-2".into()),
                Matcher::UrlEncoded("limit".into(), "2".into()),
            ]))
            .with_status(200)
            .with_body(
                r#"{"data": [
                    {"task_id": "mp-1", "deprecated": true, "deprecation_reason": null},
                    {"task_id": "mp-2", "deprecated": false, "deprecation_reason": null}
                ], "meta": {"api_version": "0.3.0", "time_stamp": "2021-03-04T10:11:12Z"}}"#,
            )
            .create_async()
            .await;
        let rester = TaskDeprecationRester::new(reqwest::Client::new(), &settings(&server)).unwrap();
        let states = rester.get(&["mp-1", "mp-2"]).await.unwrap();
        assert_eq!(
            vec![(String::from("mp-1"), true), (String::from("mp-2"), false)],
            states
                .into_iter()
                .map(|s| (s.task_id, s.deprecated))
                .collect::<Vec<_>>()
        );
        mock.assert_async().await;
    }
}
