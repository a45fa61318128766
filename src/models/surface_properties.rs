//! Surface energies and work functions.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::DocumentModel;

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct SurfaceEntry {
    pub miller_index: Option<Vec<i64>>,
    /// Surface energy in J/m²
    pub surface_energy: Option<f64>,
    pub surface_energy_ev_per_ang2: Option<f64>,
    pub is_reconstructed: Option<bool>,
    pub area_fraction: Option<f64>,
    pub has_wulff: Option<bool>,
    /// Work function in eV
    pub work_function: Option<f64>,
    pub structure: Option<Value>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct SurfacePropDoc {
    pub task_id: Option<String>,
    pub pretty_formula: Option<String>,
    pub surfaces: Option<Vec<SurfaceEntry>>,
    /// Area weighted surface energy in J/m²
    pub weighted_surface_energy: Option<f64>,
    pub weighted_surface_energy_ev_per_ang2: Option<f64>,
    pub surface_anisotropy: Option<f64>,
    pub shape_factor: Option<f64>,
    /// Area weighted work function in eV
    pub weighted_work_function: Option<f64>,
    pub has_reconstructed: Option<bool>,
    pub structure: Option<Value>,
}

impl DocumentModel for SurfacePropDoc {
    const NAME: &'static str = "SurfacePropDoc";
    const DESCRIPTION: &'static str = "Surface properties of a material";
}
