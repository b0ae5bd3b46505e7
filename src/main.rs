use log::*;
use service::{config::Config, logging::Logger, AppState};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let config = Config::new();
    if let Err(e) = Logger::init_logger(&config) {
        eprintln!("Failed to start logging: {e}");
    }

    info!("Starting up Person Stream API");

    let item_store = Arc::new(service::init_item_store(&config));
    let app_state = AppState::new(config, &item_store);

    if let Err(e) = web::init_server(app_state).await {
        error!("Server exited with error: {e}");
        std::process::exit(1);
    }
}
