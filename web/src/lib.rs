//! HTTP layer: axum controllers, request params, response projections and
//! the router.

use log::info;

pub(crate) mod controller;
mod error;
pub(crate) mod params;
pub(crate) mod response;
pub mod router;

pub use self::error::{Error, Result};
pub use service::AppState;

/// Binds the configured interface/port and serves the API router until the
/// process is stopped.
pub async fn init(app_state: AppState) -> Result<()> {
    let interface = app_state
        .config
        .interface
        .clone()
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let address = format!("{}:{}", interface, app_state.config.port);

    let router = router::define_routes(app_state);

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .map_err(domain::error::Error::from)?;
    info!("Server starting... listening for connections on http://{address}");

    axum::serve(listener, router)
        .await
        .map_err(domain::error::Error::from)?;

    Ok(())
}
