//! Substrate matches for film growth.

use serde::{Deserialize, Serialize};

use super::DocumentModel;

/// A candidate substrate for a film material.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct SubstratesDoc {
    /// Reduced formula of the substrate
    pub sub_form: Option<String>,
    /// Identifier of the substrate material
    pub sub_id: Option<String>,
    /// Surface orientation of the film, as space separated Miller indices
    pub film_orient: Option<String>,
    /// Minimum coincident interface area in Å²
    pub area: Option<f64>,
    /// Elastic energy in meV
    pub energy: Option<f64>,
    /// Identifier of the film material
    pub film_id: Option<String>,
    /// Number of possible surface orientations
    pub norients: Option<u64>,
    /// Surface orientation of the substrate, as space separated Miller indices
    pub orient: Option<String>,
}

impl DocumentModel for SubstratesDoc {
    const NAME: &'static str = "SubstratesDoc";
    const DESCRIPTION: &'static str = "Substrate matches for a film material";
}
