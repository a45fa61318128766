//! OpenAPI document describing the served resources.

use std::sync::Arc;

use serde_json::{json, Map, Value};

use crate::config::AppConfig;
use crate::models;
use crate::query_operator::{ParamSpec, QueryOperator};
use crate::resource::Resource;

/// Name of the header carrying the API key.
pub const API_KEY_HEADER: &str = "X-API-KEY";

fn parameter(spec: &ParamSpec) -> Value {
    let mut schema = Map::new();
    schema.insert("type".to_string(), json!(spec.param_type));
    if let Some(default) = &spec.default {
        schema.insert("default".to_string(), default.clone());
    }
    if let Some(allowed) = &spec.allowed {
        schema.insert("enum".to_string(), json!(allowed));
    }
    json!({
        "name": spec.name,
        "in": "query",
        "description": spec.description,
        "required": spec.required,
        "schema": schema,
    })
}

fn schema_ref(model: &str) -> Value {
    json!({ "$ref": format!("#/components/schemas/{}", model) })
}

fn responses(model: &str) -> Value {
    let error = json!({"$ref": "#/components/schemas/Error"});
    json!({
        "200": {
            "description": "Successful response",
            "content": {"application/json": {"schema": {
                "type": "object",
                "properties": {
                    "data": {"type": "array", "items": schema_ref(model)},
                    "meta": {"$ref": "#/components/schemas/Meta"},
                },
            }}},
        },
        "400": {
            "description": "Invalid request parameters",
            "content": {"application/json": {"schema": error}},
        },
        "404": {
            "description": "Not found",
            "content": {"application/json": {"schema": error}},
        },
    })
}

fn search_operation(resource: &Resource) -> Value {
    let parameters: Vec<Value> = resource.search_parameters().iter().map(parameter).collect();
    json!({
        "get": {
            "tags": resource.tags(),
            "summary": format!("Get {} documents", resource.model()),
            "operationId": format!("search_{}", operation_name(resource.prefix())),
            "parameters": parameters,
            "responses": responses(resource.model()),
        }
    })
}

fn get_by_key_operation(resource: &Resource) -> Value {
    let key = resource.store().key();
    let mut parameters = vec![json!({
        "name": key,
        "in": "path",
        "description": format!("The {} of the document", key),
        "required": true,
        "schema": {"type": "string"},
    })];
    for op in resource.key_operators() {
        parameters.extend(op.parameters().iter().map(parameter));
    }
    json!({
        "get": {
            "tags": resource.tags(),
            "summary": format!("Get a {} document by {}", resource.model(), key),
            "operationId": format!("get_{}_by_key", operation_name(resource.prefix())),
            "parameters": parameters,
            "responses": responses(resource.model()),
        }
    })
}

fn operation_name(prefix: &str) -> String {
    prefix.replace(['/', '-', '.'], "_")
}

fn model_schemas() -> Map<String, Value> {
    let mut schemas = Map::new();
    for model in models::registered_models() {
        let properties: Map<String, Value> = model
            .fields()
            .into_iter()
            .map(|field| (field, json!({})))
            .collect();
        schemas.insert(
            model.name.to_string(),
            json!({
                "title": model.name,
                "description": model.description,
                "type": "object",
                "properties": properties,
            }),
        );
    }
    schemas.insert(
        "Meta".to_string(),
        json!({
            "type": "object",
            "properties": {
                "api_version": {"type": "string"},
                "time_stamp": {"type": "string", "format": "date-time"},
                "total_doc": {"type": "integer"},
                "max_limit": {"type": "integer"},
            },
        }),
    );
    schemas.insert(
        "Error".to_string(),
        json!({
            "type": "object",
            "properties": {"error": {
                "type": "object",
                "properties": {
                    "message": {"type": "string"},
                    "caused_by": {"type": "array", "items": {"type": "string"}},
                },
            }},
        }),
    );
    schemas
}

/// Build the OpenAPI 3.0 document for `resources`.
///
/// Resources excluded from the schema are left out.
pub fn openapi(config: &AppConfig, resources: &[Arc<Resource>]) -> Value {
    let mut paths = Map::new();
    for resource in resources.iter().filter(|r| r.include_in_schema()) {
        if resource.enable_default_search() {
            paths.insert(
                format!("/{}/", resource.prefix()),
                search_operation(resource),
            );
        }
        if resource.enable_get_by_key() {
            paths.insert(
                format!("/{}/{{{}}}/", resource.prefix(), resource.store().key()),
                get_by_key_operation(resource),
            );
        }
    }
    json!({
        "openapi": "3.0.2",
        "info": {
            "title": config.title,
            "description": config.description,
            "version": env!("CARGO_PKG_VERSION"),
        },
        "paths": paths,
        "components": {
            "schemas": model_schemas(),
            "securitySchemes": {
                "ApiKeyAuth": {
                    "type": "apiKey",
                    "in": "header",
                    "name": API_KEY_HEADER,
                }
            },
        },
        "security": [{"ApiKeyAuth": []}],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::tests::resource;
    use crate::store::{CollectionConfig, StoreConfig};

    async fn document() -> Value {
        let store = StoreConfig::MemoryStore(CollectionConfig::new("materials"));
        let mut resources = Vec::new();
        for config in crate::routes::materials::resources(store, Some("2021_03_22")) {
            resources.push(Arc::new(resource(config, Vec::new()).await));
        }
        let config = AppConfig {
            title: "Materials".to_string(),
            description: String::new(),
            heartbeat_meta: Map::new(),
            resources: Vec::new(),
        };
        openapi(&config, &resources)
    }

    fn parameter<'a>(operation: &'a Value, name: &str) -> &'a Value {
        operation["get"]["parameters"]
            .as_array()
            .unwrap()
            .iter()
            .find(|p| p["name"] == name)
            .unwrap()
    }

    #[tokio::test]
    async fn paths() {
        let document = document().await;
        let paths = document["paths"].as_object().unwrap();
        let names: Vec<&str> = paths.keys().map(String::as_str).collect();
        assert_eq!(
            vec!["/materials/", "/materials/{task_id}/", "/tasks/deprecation/"],
            names
        );
        assert_eq!("Materials", document["info"]["title"]);
    }

    #[tokio::test]
    async fn parameters() {
        let document = document().await;
        let search = &document["paths"]["/materials/"];
        assert_eq!(json!(["Materials"]), search["get"]["tags"]);
        let limit = parameter(search, "limit");
        assert_eq!(json!({"type": "integer", "default": 10}), limit["schema"]);
        let version = parameter(search, "version");
        assert_eq!(json!("2021_03_22"), version["schema"]["default"]);
        let system = parameter(search, "crystal_system");
        assert_eq!(7, system["schema"]["enum"].as_array().unwrap().len());

        let deprecation = &document["paths"]["/tasks/deprecation/"];
        assert_eq!(json!(true), parameter(deprecation, "task_ids")["required"]);

        let by_key = &document["paths"]["/materials/{task_id}/"];
        assert_eq!("path", parameter(by_key, "task_id")["in"]);
        assert_eq!("query", parameter(by_key, "fields")["in"]);
        assert_eq!("query", parameter(by_key, "version")["in"]);
    }

    #[tokio::test]
    async fn schemas() {
        let document = document().await;
        let schemas = &document["components"]["schemas"];
        assert!(schemas["ThermoDoc"]["properties"]["energy_above_hull"].is_object());
        assert_eq!(
            "X-API-KEY",
            document["components"]["securitySchemes"]["ApiKeyAuth"]["name"]
        );
    }
}
