use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{lenient_datetime, DocumentModel};

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct DielectricData {
    pub total: Option<Value>,
    pub ionic: Option<Value>,
    #[serde(rename = "static")]
    pub static_: Option<Value>,
    /// Total dielectric constant
    pub e_total: Option<f64>,
    /// Ionic contribution to the dielectric constant
    pub e_ionic: Option<f64>,
    /// Electronic contribution to the dielectric constant
    pub e_static: Option<f64>,
    /// Refractive index
    pub n: Option<f64>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct DielectricDoc {
    pub task_id: Option<String>,
    pub dielectric: Option<DielectricData>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub last_updated: Option<DateTime<Utc>>,
}

impl DocumentModel for DielectricDoc {
    const NAME: &'static str = "DielectricDoc";
    const DESCRIPTION: &'static str = "Dielectric tensors and refractive index of a material";
}
