use crate::cli::CommandLineArgs;
use crate::config::AppConfig;
use crate::error::ApiError;
use crate::resource::Resource;

use std::sync::Arc;
use tracing::{event, Level};

/// Shared application state passed to each request handler.
pub struct AppState {
    /// Command line arguments.
    pub args: CommandLineArgs,

    /// Application definition.
    pub config: AppConfig,

    /// Resources built from the application definition.
    pub resources: Vec<Arc<Resource>>,
}

impl AppState {
    /// Create and return an [AppState], building the resources of `config`.
    pub async fn new(args: &CommandLineArgs, config: AppConfig) -> Result<Self, ApiError> {
        let resources = config.build_resources().await?;
        if args.setup_indexes {
            for resource in &resources {
                resource.setup_indexes().await?;
            }
        }
        event!(Level::INFO, "serving {} resources", resources.len());
        Ok(Self {
            args: args.clone(),
            config,
            resources,
        })
    }

    /// Load the application definition named by the command line arguments.
    ///
    /// Uses `--app-config` if given, otherwise the stores found in `--data-dir`.
    pub fn load_config(args: &CommandLineArgs) -> Result<AppConfig, ApiError> {
        match &args.app_config {
            Some(path) => AppConfig::load(path),
            None => AppConfig::from_data_dir(&args.data_dir, args.db_version.as_deref()),
        }
    }
}

/// AppState wrapped in an Atomic Reference Count (Arc) to allow multiple references.
pub type SharedAppState = Arc<AppState>;
