use config::Config;
use domain::latency::{FixedLatency, Latency, NoLatency, RandomLatency};
use domain::ItemStore;
use log::info;
use std::sync::Arc;

pub mod config;
pub mod logging;

/// Populates the item store from configuration. Every lookup waits
/// `lookup_latency`, and every streamed person additionally waits a random delay
/// of up to `stream_max_delay`. A zero duration disables the respective delay.
pub fn init_item_store(config: &Config) -> ItemStore {
    let lookup: Arc<dyn Latency> = if config.lookup_latency().is_zero() {
        Arc::new(NoLatency)
    } else {
        Arc::new(FixedLatency(config.lookup_latency()))
    };
    let streaming: Arc<dyn Latency> = if config.stream_max_delay().is_zero() {
        Arc::new(NoLatency)
    } else {
        Arc::new(RandomLatency::up_to(config.stream_max_delay()))
    };

    info!(
        "Item store config: store_size={}, lookup_latency={:?}, stream_max_delay={:?}",
        config.store_size,
        config.lookup_latency(),
        config.stream_max_delay(),
    );

    ItemStore::populate(config.store_size, lookup, streaming)
}

// Service-level state containing only infrastructure concerns
// Needs to implement Clone to be able to be passed into Router as State
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub item_store: Arc<ItemStore>,
    pub stream_manager: Arc<sse::Manager>,
}

impl AppState {
    pub fn new(app_config: Config, item_store: &Arc<ItemStore>) -> Self {
        Self {
            config: app_config,
            item_store: Arc::clone(item_store),
            stream_manager: Arc::new(sse::Manager::new()),
        }
    }
}
