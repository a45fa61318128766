//! Core material documents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{lenient_datetime, DocumentModel};

/// Symmetry of a crystal structure as determined by spglib.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct SymmetryData {
    /// Crystal system of the lattice
    pub crystal_system: Option<String>,
    /// Space group symbol
    pub symbol: Option<String>,
    /// Space group number
    pub number: Option<u32>,
    pub point_group: Option<String>,
    /// Symmetry precision used for the analysis
    pub symprec: Option<f64>,
    /// spglib version
    pub version: Option<String>,
}

/// Definition of a material, aggregated from the calculations (tasks) that describe it.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct MaterialsDoc {
    /// Identifier of the material, e.g. `mp-149`
    pub task_id: Option<String>,
    /// Relaxed structure, as a pymatgen `Structure` dictionary
    pub structure: Option<Value>,
    pub initial_structures: Option<Vec<Value>>,
    /// Calculations used to build this material
    pub task_ids: Option<Vec<String>>,
    /// Calculations superseded for this material
    pub deprecated_tasks: Option<Vec<String>>,
    pub task_types: Option<Map<String, Value>>,
    pub origins: Option<Vec<Value>>,
    pub deprecated: Option<bool>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub created_at: Option<DateTime<Utc>>,
    /// Number of sites in the structure
    pub nsites: Option<u64>,
    pub elements: Option<Vec<String>>,
    pub nelements: Option<u64>,
    pub composition: Option<Map<String, Value>>,
    pub composition_reduced: Option<Map<String, Value>>,
    /// Cleaned representation of the formula
    pub formula_pretty: Option<String>,
    /// Anonymized representation of the formula, e.g. `AB2`
    pub formula_anonymous: Option<String>,
    /// Dash-delimited sorted list of elements, e.g. `O-Si`
    pub chemsys: Option<String>,
    /// Cell volume in Å³
    pub volume: Option<f64>,
    /// Density in g/cm³
    pub density: Option<f64>,
    /// Volume per atom in Å³
    pub density_atomic: Option<f64>,
    pub symmetry: Option<SymmetryData>,
}

impl DocumentModel for MaterialsDoc {
    const NAME: &'static str = "MaterialsDoc";
    const DESCRIPTION: &'static str = "Core definition of a material";
}
