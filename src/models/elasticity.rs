//! Elastic constants.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::DocumentModel;

/// Elastic moduli and tensors. Moduli are in GPa.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct ElasticityData {
    /// Voigt average of the bulk modulus
    pub k_voigt: Option<f64>,
    /// Reuss average of the bulk modulus
    pub k_reuss: Option<f64>,
    /// Voigt-Reuss-Hill average of the bulk modulus
    pub k_vrh: Option<f64>,
    /// Voigt average of the shear modulus
    pub g_voigt: Option<f64>,
    /// Reuss average of the shear modulus
    pub g_reuss: Option<f64>,
    /// Voigt-Reuss-Hill average of the shear modulus
    pub g_vrh: Option<f64>,
    pub universal_anisotropy: Option<f64>,
    pub homogeneous_poisson: Option<f64>,
    pub elastic_tensor: Option<Value>,
    pub compliance_tensor: Option<Value>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct ElasticityDoc {
    pub task_id: Option<String>,
    pub pretty_formula: Option<String>,
    pub chemsys: Option<String>,
    pub elasticity: Option<ElasticityData>,
}

impl DocumentModel for ElasticityDoc {
    const NAME: &'static str = "ElasticityDoc";
    const DESCRIPTION: &'static str = "Elastic constants of a material";
}
