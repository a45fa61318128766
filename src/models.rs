//! Response envelope and document models.
//!
//! Each route serves documents of one model. Models are plain data holders with every field
//! optional; nested scientific objects (structures, tensors, entries) are carried as raw JSON.
//! Models are registered by name so that configuration can refer to them.

pub mod dielectric;
pub mod elasticity;
pub mod magnetism;
pub mod materials;
pub mod piezo;
pub mod substrates;
pub mod surface_properties;
pub mod tasks;
pub mod thermo;
pub mod xas;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::ValidationError;

/// Response to a search or get-by-key request.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Response<T = Value> {
    /// Documents returned by the request
    pub data: Vec<T>,

    /// Metadata describing the request
    pub meta: Meta,
}

impl<T> Response<T> {
    pub fn new(data: Vec<T>, meta: Meta) -> Self {
        Response { data, meta }
    }
}

/// Metadata of a [Response].
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Meta {
    /// Version of the API server
    pub api_version: String,

    /// Time the response was produced
    pub time_stamp: DateTime<Utc>,

    /// Metadata contributed by query operators
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Meta {
    /// Return metadata stamped with the current time.
    pub fn new(extra: Map<String, Value>) -> Self {
        Meta {
            api_version: env!("CARGO_PKG_VERSION").to_string(),
            time_stamp: Utc::now(),
            extra,
        }
    }

    /// Total number of documents matching the query, if reported.
    pub fn total_doc(&self) -> Option<u64> {
        self.extra.get("total_doc").and_then(Value::as_u64)
    }
}

/// Deserialise an optional timestamp, accepting RFC 3339 as well as naive UTC timestamps such
/// as `2021-03-04T10:11:12.123`.
pub fn lenient_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let Some(text) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if let Ok(datetime) = DateTime::parse_from_rfc3339(&text) {
        return Ok(Some(datetime.with_timezone(&Utc)));
    }
    chrono::NaiveDateTime::parse_from_str(&text, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| chrono::NaiveDateTime::parse_from_str(&text, "%Y-%m-%d %H:%M:%S%.f"))
        .map(|naive| Some(naive.and_utc()))
        .map_err(serde::de::Error::custom)
}

/// A document model served by a resource.
pub trait DocumentModel: Default + Serialize + DeserializeOwned {
    /// Name used to refer to the model in configuration
    const NAME: &'static str;

    /// Human readable description
    const DESCRIPTION: &'static str;

    /// Top-level field names, in declaration order.
    fn field_names() -> Vec<String> {
        match serde_json::to_value(Self::default()) {
            Ok(Value::Object(fields)) => fields.keys().cloned().collect(),
            _ => Vec::new(),
        }
    }
}

/// Registry entry for a document model.
#[derive(Debug)]
pub struct ModelInfo {
    pub name: &'static str,
    pub description: &'static str,
    fields: fn() -> Vec<String>,
}

impl ModelInfo {
    pub fn fields(&self) -> Vec<String> {
        (self.fields)()
    }
}

macro_rules! model_info {
    ($model:ty) => {
        ModelInfo {
            name: <$model>::NAME,
            description: <$model>::DESCRIPTION,
            fields: <$model>::field_names,
        }
    };
}

static MODELS: [ModelInfo; 10] = [
    model_info!(dielectric::DielectricDoc),
    model_info!(elasticity::ElasticityDoc),
    model_info!(magnetism::MagnetismDoc),
    model_info!(materials::MaterialsDoc),
    model_info!(piezo::PiezoDoc),
    model_info!(substrates::SubstratesDoc),
    model_info!(surface_properties::SurfacePropDoc),
    model_info!(tasks::TaskDoc),
    model_info!(thermo::ThermoDoc),
    model_info!(xas::XASDoc),
];

/// Look up a registered model by name.
pub fn model_info(name: &str) -> Option<&'static ModelInfo> {
    MODELS.iter().find(|model| model.name == name)
}

/// Validate that `model` names a registered model.
pub fn validate_model_name(model: &str) -> Result<(), ValidationError> {
    if model_info(model).is_none() {
        let mut error = ValidationError::new("model is not registered");
        error.add_param("model".into(), &model);
        return Err(error);
    }
    Ok(())
}

/// All registered models.
pub fn registered_models() -> &'static [ModelInfo] {
    &MODELS
}
