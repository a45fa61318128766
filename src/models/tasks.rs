//! Calculation (task) documents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{lenient_datetime, DocumentModel};

/// A single calculation and its inputs and outputs.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct TaskDoc {
    pub task_id: Option<String>,
    pub tags: Option<Vec<String>>,
    pub task_type: Option<String>,
    /// Calculation steps, most recent first
    pub calcs_reversed: Option<Vec<Value>>,
    pub nsites: Option<u64>,
    pub elements: Option<Vec<String>>,
    pub nelements: Option<u64>,
    pub composition: Option<Map<String, Value>>,
    pub composition_reduced: Option<Map<String, Value>>,
    pub formula_pretty: Option<String>,
    pub formula_anonymous: Option<String>,
    pub chemsys: Option<String>,
    pub orig_inputs: Option<Value>,
    pub input: Option<Value>,
    pub output: Option<Value>,
    pub custodian: Option<Vec<Value>>,
    pub analysis: Option<Value>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub last_updated: Option<DateTime<Utc>>,
}

impl DocumentModel for TaskDoc {
    const NAME: &'static str = "TaskDoc";
    const DESCRIPTION: &'static str = "Calculation task";
}
