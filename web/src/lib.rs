//! HTTP surface: routes, controllers and the response adapters that drive
//! producers from request handlers.
use log::*;
use std::sync::Arc;
use tokio::net::TcpListener;

pub use service::AppState;

mod controller;
mod error;
mod params;
mod response;
pub mod router;

pub use error::{Error, Result};

pub async fn init_server(app_state: AppState) -> std::io::Result<()> {
    let interface = app_state
        .config
        .interface
        .clone()
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let host = format!("{interface}:{}", app_state.config.port);

    info!(
        "Server starting ({} environment)... listening for connections on http://{host}",
        app_state.config.runtime_env()
    );

    let listener = TcpListener::bind(&host).await?;
    let stream_manager = Arc::clone(&app_state.stream_manager);
    let app = router::define_routes(app_state);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(stream_manager))
        .await
}

// Open event streams would keep graceful shutdown waiting, so they are
// cancelled as soon as the signal arrives.
async fn shutdown_signal(stream_manager: Arc<sse::Manager>) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received, closing open streams"),
        Err(e) => {
            error!("Unable to listen for the shutdown signal: {e}");
            std::future::pending::<()>().await;
        }
    }

    stream_manager.cancel_all();
}
