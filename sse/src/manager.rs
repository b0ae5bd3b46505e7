use crate::connection::{StreamId, StreamRegistry};
use log::*;
use reactive::Subscription;
use std::sync::Arc;

pub struct Manager {
    registry: Arc<StreamRegistry>,
}

impl Manager {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(StreamRegistry::new()),
        }
    }

    /// Register a new stream and return its unique ID
    pub fn register_stream(&self, route: &str, subscription: Subscription) -> StreamId {
        let stream_id = self.registry.register(route, subscription);
        info!("Registered new SSE stream {} on {}", stream_id.as_str(), route);
        stream_id
    }

    /// Unregister a stream by ID
    pub fn unregister_stream(&self, stream_id: &StreamId) {
        if let Some(info) = self.registry.unregister(stream_id) {
            info!(
                "Unregistered SSE stream {} on {} ({})",
                stream_id.as_str(),
                info.route,
                info.subscription.state()
            );
        }
    }

    /// Cancel every open stream, e.g. when the server shuts down
    pub fn cancel_all(&self) {
        let cancelled = self.registry.cancel_all();
        if cancelled > 0 {
            warn!("Cancelled {cancelled} open SSE stream(s)");
        }
    }

    pub fn active_streams(&self) -> usize {
        self.registry.len()
    }
}

impl Default for Manager {
    fn default() -> Self {
        Self::new()
    }
}
