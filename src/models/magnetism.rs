//! Magnetic properties.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{lenient_datetime, DocumentModel};

/// Magnetic orderings.
pub const ORDERINGS: [&str; 4] = ["FM", "AFM", "FiM", "NM"];

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct MagnetismData {
    /// One of [ORDERINGS]
    pub ordering: Option<String>,
    pub is_magnetic: Option<bool>,
    pub exchange_symmetry: Option<u32>,
    pub num_magnetic_sites: Option<u64>,
    pub num_unique_magnetic_sites: Option<u64>,
    pub types_of_magnetic_species: Option<Vec<String>>,
    /// Magnetic moments per site in μB
    pub magmoms: Option<Vec<f64>>,
    pub total_magnetization: Option<f64>,
    pub total_magnetization_normalized_vol: Option<f64>,
    pub total_magnetization_normalized_formula_units: Option<f64>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct MagnetismDoc {
    pub task_id: Option<String>,
    pub magnetism: Option<MagnetismData>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub last_updated: Option<DateTime<Utc>>,
}

impl DocumentModel for MagnetismDoc {
    const NAME: &'static str = "MagnetismDoc";
    const DESCRIPTION: &'static str = "Magnetic ordering and moments of a material";
}
