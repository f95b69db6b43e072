//! HTTP API server entry point: the producer side of the pipeline.

use log::*;
use service::config::Config;
use service::logging::Logger;
use service::AppState;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let config = Config::new();
    Logger::init_logger(&config);

    info!(
        "Starting Meeting Notes Platform API ({} environment)",
        config.runtime_env()
    );

    let db = service::init_database(&config)
        .await
        .expect("Failed to connect to the database");

    let app_state = AppState::new(config, &Arc::new(db));

    if let Err(err) = web::init(app_state).await {
        error!("Server exited with error: {err}");
        std::process::exit(1);
    }
}
