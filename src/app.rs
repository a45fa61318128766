use crate::app_state::SharedAppState;
use crate::error::ApiError;
use crate::metrics;
use crate::openapi;

use axum::{
    body::Body,
    extract::State,
    http::{Request, Uri},
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use chrono::Utc;
use serde_json::{json, Value};

use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tower_http::validate_request::ValidateRequestHeaderLayer;

/// The service served by [crate::server::serve].
pub type Service = Router;

/// Return a router for the application.
///
/// Resource routes are mounted at their prefixes next to the `/heartbeat`, `/openapi.json`
/// and `/metrics` endpoints. When an API key is configured, resource routes require it in the
/// `X-API-KEY` header.
pub fn router(state: SharedAppState) -> Router {
    let mut resources = Router::new();
    for resource in &state.resources {
        resources = resources.merge(resource.clone().router());
    }
    if let Some(api_key) = state.args.api_key.clone() {
        resources = resources.layer(ValidateRequestHeaderLayer::custom(
            // Validate that the API key header matches.
            move |request: &mut Request<Body>| {
                let header = request.headers().get(openapi::API_KEY_HEADER);
                match header.and_then(|value| value.to_str().ok()) {
                    Some(key) if key == api_key => Ok(()),
                    _ => Err(ApiError::Unauthorized.into_response()),
                }
            },
        ));
    }

    Router::new()
        .route("/heartbeat", get(heartbeat))
        .route("/openapi.json", get(openapi_document))
        .route("/metrics", get(metrics::metrics_handler))
        .with_state(state)
        .merge(resources)
        .fallback(not_found)
        .layer(
            ServiceBuilder::new().layer(
                TraceLayer::new_for_http()
                    .on_request(metrics::request_counter)
                    .on_response(metrics::record_response_metrics),
            ),
        )
}

/// Return the application service.
pub fn service(state: SharedAppState) -> Service {
    router(state)
}

async fn heartbeat(State(state): State<SharedAppState>) -> Json<Value> {
    let mut body = json!({
        "status": "OK",
        "time": Utc::now(),
        "version": env!("CARGO_PKG_VERSION"),
    });
    if let Value::Object(fields) = &mut body {
        fields.extend(state.config.heartbeat_meta.clone());
    }
    Json(body)
}

async fn openapi_document(State(state): State<SharedAppState>) -> Json<Value> {
    Json(openapi::openapi(&state.config, &state.resources))
}

async fn not_found(uri: Uri) -> ApiError {
    ApiError::RouteNotFound {
        path: uri.path().to_string(),
    }
}
