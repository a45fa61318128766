//! X-ray absorption spectra.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{lenient_datetime, DocumentModel};

/// Absorption edges.
pub const EDGES: [&str; 4] = ["K", "L2", "L3", "L2,3"];

/// Spectrum types.
pub const SPECTRUM_TYPES: [&str; 3] = ["XANES", "EXAFS", "XAFS"];

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct XASSpectrum {
    /// X-ray energies
    pub x: Option<Vec<f64>>,
    /// Absorption in arbitrary units
    pub y: Option<Vec<f64>>,
    pub structure: Option<Value>,
    pub absorbing_element: Option<String>,
    pub edge: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct XASDoc {
    pub xas_id: Option<String>,
    pub task_id: Option<String>,
    pub xas_ids: Option<Vec<String>>,
    pub spectrum: Option<XASSpectrum>,
    /// One of [EDGES]
    pub edge: Option<String>,
    /// One of [SPECTRUM_TYPES]
    pub spectrum_type: Option<String>,
    pub absorbing_element: Option<String>,
    pub elements: Option<Vec<String>>,
    pub nelements: Option<u64>,
    pub composition: Option<Map<String, Value>>,
    pub composition_reduced: Option<Map<String, Value>>,
    pub formula_pretty: Option<String>,
    pub formula_anonymous: Option<String>,
    pub chemsys: Option<String>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub last_updated: Option<DateTime<Utc>>,
}

impl DocumentModel for XASDoc {
    const NAME: &'static str = "XASDoc";
    const DESCRIPTION: &'static str = "X-ray absorption spectrum of a material";
}
