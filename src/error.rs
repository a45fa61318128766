//! Error handling.

use axum::{
    http::header,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::error::Error;
use thiserror::Error;
use tracing::{event, Level};

use crate::composition::FormulaError;

/// Materials API server error type
///
/// This type encapsulates the various errors that may occur.
/// Each variant may result in a different API error response.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Background task panicked or was cancelled
    #[error("background task failed")]
    BackgroundTask(#[from] tokio::task::JoinError),

    /// Invalid application configuration
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Error validating application configuration
    #[error("configuration is not valid")]
    ConfigValidation(#[from] validator::ValidationErrors),

    /// Insertion would violate a unique index
    #[error("duplicate value {value} for unique index {field}")]
    DuplicateKey { field: String, value: String },

    /// Sort requested without both a field and a direction
    #[error("Must specify both a field and order for sorting.")]
    IncompleteSort,

    /// Store criteria that cannot be evaluated
    #[error("invalid criteria: {0}")]
    InvalidCriteria(String),

    /// Formula query parameter could not be interpreted
    #[error("invalid formula")]
    InvalidFormula(#[from] FormulaError),

    /// Query parameter with an invalid value
    #[error("invalid value for query parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    /// Error reading or writing store files
    #[error("store I/O error")]
    Io(#[from] std::io::Error),

    /// Error (de)serialising JSON documents
    #[error("failed to (de)serialise JSON")]
    Json(#[from] serde_json::Error),

    /// Document lacks the store key field
    #[error("document is missing key field {key}")]
    MissingKey { key: String },

    /// No document matches the requested key
    #[error("Item with {key} = {value} not found")]
    NotFound { key: String, value: String },

    /// No route matches the request path
    #[error("route {path} not found")]
    RouteNotFound { path: String },

    /// Missing or incorrect API key
    #[error("a valid API key is required in the X-API-KEY header")]
    Unauthorized,

    /// Error from the embedded database
    #[error("embedded database error")]
    Sled(#[from] sled::Error),

    /// Document model is not registered
    #[error("unknown document model {0}")]
    UnknownModel(String),

    /// Request contains query parameters that no operator consumes
    #[error("Request contains query parameters which cannot be used: {}", .0.join(", "))]
    UnknownParameters(Vec<String>),
}

impl ApiError {
    /// Return an [ApiError::InvalidParameter] for the parameter `name`.
    pub fn invalid_parameter(name: &str, reason: impl ToString) -> Self {
        ApiError::InvalidParameter {
            name: name.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    /// Convert from an `ApiError` into an [axum::response::Response].
    fn into_response(self) -> Response {
        ErrorResponse::from(self).into_response()
    }
}

/// Body of error response
///
/// Implements serde (de)serialise.
#[derive(Deserialize, Serialize)]
struct ErrorBody {
    /// Main error message
    message: String,

    /// Optional list of causes
    #[serde(skip_serializing_if = "Option::is_none")]
    caused_by: Option<Vec<String>>,
}

impl ErrorBody {
    /// Return a new ErrorBody
    ///
    /// # Arguments
    ///
    /// * `error`: The error that occurred
    fn new<E>(error: &E) -> Self
    where
        E: std::error::Error + Send + Sync,
    {
        let message = error.to_string();
        let mut causes = Vec::new();
        let mut current = error.source();
        while let Some(source) = current {
            causes.push(source.to_string());
            current = source.source();
        }
        causes.dedup();
        let caused_by = if causes.is_empty() {
            None
        } else {
            Some(causes)
        };
        ErrorBody { message, caused_by }
    }
}

/// A response to send in error cases
///
/// Implements serde (de)serialise.
#[derive(Deserialize, Serialize)]
struct ErrorResponse {
    /// HTTP status of the response
    #[serde(skip)]
    status: StatusCode,

    /// Response body
    error: ErrorBody,
}

impl ErrorResponse {
    /// Return a new ErrorResponse
    ///
    /// # Arguments
    ///
    /// * `status`: HTTP status of the response
    /// * `error`: The error that occurred. This will be formatted into a suitable `ErrorBody`
    fn new<E>(status: StatusCode, error: &E) -> Self
    where
        E: std::error::Error + Send + Sync,
    {
        ErrorResponse {
            status,
            error: ErrorBody::new(error),
        }
    }

    /// Return a 400 bad request ErrorResponse
    fn bad_request<E>(error: &E) -> Self
    where
        E: std::error::Error + Send + Sync,
    {
        Self::new(StatusCode::BAD_REQUEST, error)
    }

    /// Return a 404 not found ErrorResponse
    fn not_found<E>(error: &E) -> Self
    where
        E: std::error::Error + Send + Sync,
    {
        Self::new(StatusCode::NOT_FOUND, error)
    }

    /// Return a 401 unauthorized ErrorResponse
    fn unauthorized<E>(error: &E) -> Self
    where
        E: std::error::Error + Send + Sync,
    {
        Self::new(StatusCode::UNAUTHORIZED, error)
    }

    /// Return a 500 internal server error ErrorResponse
    fn internal_server_error<E>(error: &E) -> Self
    where
        E: std::error::Error + Send + Sync,
    {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, error)
    }
}

impl From<ApiError> for ErrorResponse {
    /// Convert from an `ApiError` into an `ErrorResponse`.
    fn from(error: ApiError) -> Self {
        let response = match &error {
            // Bad request
            ApiError::IncompleteSort
            | ApiError::InvalidFormula(_)
            | ApiError::InvalidParameter { .. }
            | ApiError::UnknownParameters(_) => Self::bad_request(&error),

            // Unauthorized
            ApiError::Unauthorized => Self::unauthorized(&error),

            // Not found
            ApiError::NotFound { .. } | ApiError::RouteNotFound { .. } => {
                Self::not_found(&error)
            }

            // Internal server error
            ApiError::BackgroundTask(_)
            | ApiError::Config(_)
            | ApiError::ConfigValidation(_)
            | ApiError::DuplicateKey { .. }
            | ApiError::InvalidCriteria(_)
            | ApiError::Io(_)
            | ApiError::Json(_)
            | ApiError::MissingKey { .. }
            | ApiError::Sled(_)
            | ApiError::UnknownModel(_) => Self::internal_server_error(&error),
        };

        // Log server errors.
        if response.status.is_server_error() {
            event!(Level::ERROR, "{}", error.to_string());
            let mut current = error.source();
            while let Some(source) = current {
                event!(Level::ERROR, "Caused by: {}", source.to_string());
                current = source.source();
            }
        }

        response
    }
}

impl IntoResponse for ErrorResponse {
    /// Convert from an `ErrorResponse` into an `axum::response::Response`.
    ///
    /// Renders the response as JSON.
    fn into_response(self) -> Response {
        let json_body = serde_json::to_string_pretty(&self);
        match json_body {
            Err(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to serialise error response: {}", err),
            )
                .into_response(),
            Ok(json_body) => (
                self.status,
                [(&header::CONTENT_TYPE, mime::APPLICATION_JSON.to_string())],
                json_body,
            )
                .into_response(),
        }
    }
}
