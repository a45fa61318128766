use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{lenient_datetime, DocumentModel};

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct PiezoData {
    pub total: Option<Value>,
    pub ionic: Option<Value>,
    #[serde(rename = "static")]
    pub static_: Option<Value>,
    /// Largest piezoelectric modulus in C/m²
    pub e_ij_max: Option<f64>,
    pub max_direction: Option<Vec<i64>>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct PiezoDoc {
    pub task_id: Option<String>,
    pub piezo: Option<PiezoData>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub last_updated: Option<DateTime<Utc>>,
}

impl DocumentModel for PiezoDoc {
    const NAME: &'static str = "PiezoDoc";
    const DESCRIPTION: &'static str = "Piezoelectric tensors of a material";
}
