//! Command Line Interface (CLI) arguments.

use clap::Parser;

/// Materials API server command line interface
#[derive(Clone, Debug, Default, Parser)]
pub struct CommandLineArgs {
    /// The IP address on which the server should listen
    #[arg(long, default_value = "0.0.0.0", env = "MAPI_HOST")]
    pub host: String,
    /// The port to which the server should bind
    #[arg(long, default_value_t = 8080, env = "MAPI_PORT")]
    pub port: u16,
    /// Flag indicating whether HTTPS should be used
    #[arg(long, default_value_t = false, env = "MAPI_HTTPS")]
    pub https: bool,
    /// Path to the certificate file to be used for HTTPS encryption
    #[arg(
        long,
        default_value = "~/.config/materials-api/certs/cert.pem",
        env = "MAPI_CERT_FILE"
    )]
    pub cert_file: String,
    /// Path to the key file to be used for HTTPS encryption
    #[arg(
        long,
        default_value = "~/.config/materials-api/certs/key.pem",
        env = "MAPI_KEY_FILE"
    )]
    pub key_file: String,
    /// Maximum time in seconds to wait for requests to complete upon receiving `ctrl+c` signal.
    #[arg(long, default_value_t = 60, env = "MAPI_SHUTDOWN_TIMEOUT")]
    pub graceful_shutdown_timeout: u64,
    /// Path to a JSON application definition. Overrides `--data-dir`.
    #[arg(long, env = "MAPI_APP_CONFIG")]
    pub app_config: Option<String>,
    /// Directory holding a `<route>_store.json` file for each route to serve
    #[arg(long, default_value = "~/.local/share/materials-api", env = "MAPI_DATA_DIR")]
    pub data_dir: String,
    /// API key required in the X-API-KEY header of resource requests
    #[arg(long, env = "MAPI_API_KEY")]
    pub api_key: Option<String>,
    /// Default database version of versioned resources
    #[arg(long, env = "MAPI_DB_VERSION")]
    pub db_version: Option<String>,
    /// Build store indexes for the query operators on startup
    #[arg(long, default_value_t = false, env = "MAPI_SETUP_INDEXES")]
    pub setup_indexes: bool,
    /// Write log events as JSON lines
    #[arg(long, default_value_t = false, env = "MAPI_LOG_JSON")]
    pub log_json: bool,
}

/// Returns parsed command line arguments.
pub fn parse() -> CommandLineArgs {
    CommandLineArgs::parse()
}
