use dashmap::DashMap;
use log::*;
use reactive::Subscription;

/// Unique identifier for an open event stream (server-generated)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StreamId(String);

impl StreamId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for StreamId {
    fn default() -> Self {
        Self::new()
    }
}

/// What the server knows about one open stream
#[derive(Debug, Clone)]
pub struct StreamInfo {
    pub route: String,
    pub subscription: Subscription,
}

/// Registry of every event stream currently being produced. Streams are
/// independent of each other; the registry exists so the server can see and
/// cancel in-flight productions (e.g. on shutdown).
pub struct StreamRegistry {
    streams: DashMap<StreamId, StreamInfo>,
}

impl StreamRegistry {
    pub fn new() -> Self {
        Self {
            streams: DashMap::new(),
        }
    }

    /// Register a new stream - O(1)
    pub fn register(&self, route: &str, subscription: Subscription) -> StreamId {
        let stream_id = StreamId::new();
        self.streams.insert(
            stream_id.clone(),
            StreamInfo {
                route: route.to_string(),
                subscription,
            },
        );
        stream_id
    }

    /// Unregister a stream - O(1)
    pub fn unregister(&self, stream_id: &StreamId) -> Option<StreamInfo> {
        self.streams.remove(stream_id).map(|(_, info)| info)
    }

    /// Cancel every registered stream - O(n)
    pub fn cancel_all(&self) -> usize {
        let mut cancelled = 0;
        for entry in self.streams.iter() {
            if !entry.value().subscription.state().is_terminal() {
                debug!(
                    "Cancelling stream {} on {}",
                    entry.key().as_str(),
                    entry.value().route
                );
                entry.value().subscription.cancel();
                cancelled += 1;
            }
        }
        cancelled
    }

    pub fn len(&self) -> usize {
        self.streams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }
}

impl Default for StreamRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reactive::{Handlers, MultiValue, NewThread, State};
    use std::sync::mpsc;
    use std::time::Duration;

    #[test]
    fn register_and_unregister_round_trip() {
        let registry = StreamRegistry::new();
        let mut producer = MultiValue::from_source(Vec::<i32>::new());
        let subscription = producer.subscribe(Handlers::new(|_| {})).unwrap();

        let id = registry.register("/person/sse", subscription);
        assert_eq!(registry.len(), 1);

        let info = registry.unregister(&id).unwrap();
        assert_eq!(info.route, "/person/sse");
        assert!(registry.is_empty());
        assert!(registry.unregister(&id).is_none());
    }

    #[test]
    fn cancel_all_skips_finished_streams() {
        let registry = StreamRegistry::new();

        let mut finished = MultiValue::from_source(vec![1]);
        registry.register("/done", finished.subscribe(Handlers::new(|_| {})).unwrap());

        let (release_tx, release_rx) = mpsc::channel::<()>();
        let mut parked = MultiValue::from_source(std::iter::from_fn(move || {
            release_rx.recv_timeout(Duration::from_secs(5)).ok().map(|_| 1)
        }));
        let subscription = parked
            .subscribe_on(&NewThread, Handlers::new(|_| {}))
            .unwrap();
        registry.register("/parked", subscription.clone());

        assert_eq!(registry.cancel_all(), 1);
        assert_eq!(subscription.state(), State::Cancelled);
        drop(release_tx);
    }
}
