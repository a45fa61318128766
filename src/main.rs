//! This file defines the materials-api binary entry point.

use materials_api::app;
use materials_api::app_state::AppState;
use materials_api::cli;
use materials_api::metrics;
use materials_api::server;
use materials_api::tracing;

use std::process::exit;
use std::sync::Arc;

/// Application entry point
#[tokio::main]
async fn main() {
    let args = cli::parse();
    tracing::init_tracing(&args);
    metrics::register_metrics();
    let state = match AppState::load_config(&args) {
        Ok(config) => AppState::new(&args, config).await,
        Err(err) => Err(err),
    };
    let state = match state {
        Ok(state) => Arc::new(state),
        Err(err) => {
            ::tracing::error!("failed to start: {}", err);
            exit(1)
        }
    };
    let service = app::service(state);
    if let Err(err) = server::serve(&args, service).await {
        ::tracing::error!("server error: {}", err);
        exit(1)
    }
}
