//! Thermodynamic stability documents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{lenient_datetime, DocumentModel};

/// A phase a material decomposes into.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct DecompositionProduct {
    pub material_id: Option<String>,
    pub formula: Option<String>,
    /// Amount of the product in the decomposition
    pub amount: Option<f64>,
}

/// Thermodynamic properties of a material relative to its competing phases.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct ThermoDoc {
    pub task_id: Option<String>,
    pub material_id: Option<String>,
    /// Uncorrected total energy in eV/atom
    pub uncorrected_energy_per_atom: Option<f64>,
    /// Corrected total energy in eV/atom
    pub energy_per_atom: Option<f64>,
    /// Formation energy in eV/atom
    pub formation_energy_per_atom: Option<f64>,
    /// Energy above the convex hull in eV/atom
    pub energy_above_hull: Option<f64>,
    /// Whether the material lies on the convex hull
    pub is_stable: Option<bool>,
    pub equillibrium_reaction_energy_per_atom: Option<f64>,
    pub decomposes_to: Option<Vec<DecompositionProduct>>,
    pub energy_type: Option<String>,
    pub entry_types: Option<Vec<String>>,
    /// Computed entries keyed by functional
    pub entries: Option<Map<String, Value>>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub last_updated: Option<DateTime<Utc>>,
    pub nsites: Option<u64>,
    pub elements: Option<Vec<String>>,
    pub nelements: Option<u64>,
    pub composition: Option<Map<String, Value>>,
    pub composition_reduced: Option<Map<String, Value>>,
    pub formula_pretty: Option<String>,
    pub formula_anonymous: Option<String>,
    pub chemsys: Option<String>,
    pub volume: Option<f64>,
    pub density: Option<f64>,
    pub density_atomic: Option<f64>,
}

impl DocumentModel for ThermoDoc {
    const NAME: &'static str = "ThermoDoc";
    const DESCRIPTION: &'static str = "Thermodynamic data of a material";
}
