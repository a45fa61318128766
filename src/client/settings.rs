//! Client settings read from the environment.

use std::str::FromStr;
use std::time::Duration;

use tracing::{event, Level};

/// Endpoint used when `MP_API_ENDPOINT` is not set.
pub const DEFAULT_ENDPOINT: &str = "https://api.materialsproject.org/";

/// Settings shared by the resters of a client.
#[derive(Clone, Debug, PartialEq)]
pub struct ClientSettings {
    /// Base URL of the API
    pub endpoint: String,
    /// Key sent in the `x-api-key` header
    pub api_key: Option<String>,
    /// Retries of a request answered with HTTP 429
    pub max_retries: u32,
    /// Timeout of each request
    pub timeout: Duration,
    /// Number of documents requested per page
    pub chunk_size: u64,
    /// Whether to send a user agent header
    pub include_user_agent: bool,
}

impl Default for ClientSettings {
    fn default() -> Self {
        ClientSettings {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: None,
            max_retries: 3,
            timeout: Duration::from_secs(60),
            chunk_size: 1000,
            include_user_agent: true,
        }
    }
}

impl ClientSettings {
    /// Return settings for `endpoint` with defaults otherwise.
    pub fn new(endpoint: &str, api_key: Option<&str>) -> Self {
        ClientSettings {
            endpoint: endpoint.to_string(),
            api_key: api_key.map(str::to_string),
            ..Default::default()
        }
    }

    /// Read settings from the environment.
    ///
    /// * `MP_API_ENDPOINT`: base URL of the API
    /// * `MP_API_KEY`: API key
    /// * `MAPI_CLIENT_MAX_RETRIES`: retries of rate limited requests (3)
    /// * `MAPI_CLIENT_TIMEOUT_SECS`: request timeout in seconds (60)
    /// * `MAPI_CLIENT_CHUNK_SIZE`: documents per page (1000)
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read settings using `lookup` to find variables.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        ClientSettings {
            endpoint: lookup("MP_API_ENDPOINT").unwrap_or(defaults.endpoint),
            api_key: lookup("MP_API_KEY").filter(|key| !key.is_empty()),
            max_retries: parse_var(&lookup, "MAPI_CLIENT_MAX_RETRIES", defaults.max_retries),
            timeout: Duration::from_secs(parse_var(
                &lookup,
                "MAPI_CLIENT_TIMEOUT_SECS",
                defaults.timeout.as_secs(),
            )),
            chunk_size: parse_var(&lookup, "MAPI_CLIENT_CHUNK_SIZE", defaults.chunk_size),
            include_user_agent: defaults.include_user_agent,
        }
    }
}

fn parse_var<F, T>(lookup: &F, name: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        Some(value) => value.trim().parse().unwrap_or_else(|_| {
            event!(Level::WARN, "ignoring invalid value {} of {}", value, name);
            default
        }),
        None => default,
    }
}
