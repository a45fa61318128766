//! REST client for the Materials API.
//!
//! [MPRester] gives typed access to every route of the API through one shared HTTP client:
//!
//! ```no_run
//! # async fn example() -> Result<(), materials_api::client::RestError> {
//! use materials_api::client::{ClientSettings, MPRester};
//!
//! let mpr = MPRester::new(&ClientSettings::from_env())?;
//! let stable = mpr
//!     .thermo
//!     .search()
//!     .chemsys("Li-Fe-O")
//!     .is_stable(true)
//!     .energy_above_hull((0.0, 0.05))
//!     .send()
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod mprester;
pub mod rester;
pub mod resters;
pub mod settings;

pub use mprester::MPRester;
pub use rester::{BaseRester, Search};
pub use settings::ClientSettings;

use thiserror::Error;

/// Materials API client error type
#[derive(Debug, Error)]
pub enum RestError {
    /// Invalid client settings
    #[error("invalid client configuration: {0}")]
    Config(String),

    /// Error sending a request or reading its response
    #[error("HTTP request failed")]
    Http(#[from] reqwest::Error),

    /// Response body could not be interpreted
    #[error("failed to (de)serialise JSON")]
    Json(#[from] serde_json::Error),

    /// No document has the requested identifier
    #[error("no {suffix} document found for {id}")]
    NotFound { suffix: String, id: String },

    /// Server responded with a status other than 200
    #[error("REST query returned with error status code {status} on URL {url} with message: {message}")]
    Status {
        status: u16,
        url: String,
        message: String,
    },

    /// Invalid endpoint URL
    #[error("invalid URL")]
    Url(#[from] url::ParseError),
}
