use log::*;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::Error;
use crate::latency::Latency;
use crate::person::Person;

/// Read-only, in-memory person records keyed by id.
///
/// Populated once at construction and never mutated afterward, so concurrent
/// reads need no locking. Share it behind an `Arc`.
///
/// Two latencies are injected: `lookup_latency` is paid by every single-record
/// [`get`](Self::get), `stream_latency` by every record pulled into a stream.
#[derive(Debug)]
pub struct ItemStore {
    people: BTreeMap<i32, Person>,
    lookup_latency: Arc<dyn Latency>,
    stream_latency: Arc<dyn Latency>,
}

impl ItemStore {
    /// Creates `size` synthetic records with keys `0..size`, each named `person_<key>`.
    pub fn populate(
        size: i32,
        lookup_latency: Arc<dyn Latency>,
        stream_latency: Arc<dyn Latency>,
    ) -> Self {
        let store = Self::from_people(
            (0..size).map(|key| Person::new(key, format!("person_{key}"))),
            lookup_latency,
            stream_latency,
        );
        info!("Item store populated with {} people", store.len());
        store
    }

    pub fn from_people(
        people: impl IntoIterator<Item = Person>,
        lookup_latency: Arc<dyn Latency>,
        stream_latency: Arc<dyn Latency>,
    ) -> Self {
        Self {
            people: people.into_iter().map(|person| (person.id(), person)).collect(),
            lookup_latency,
            stream_latency,
        }
    }

    /// Looks up one record after the lookup latency.
    pub fn get(&self, key: i32) -> Result<Person, Error> {
        self.lookup_latency.pause();
        self.lookup(key)
    }

    /// Looks up one record after the stream latency.
    pub fn get_streamed(&self, key: i32) -> Result<Person, Error> {
        self.stream_latency.pause();
        self.lookup(key)
    }

    /// Every record in key order. Lazy: the stream latency is paid per record
    /// as the iterator is advanced.
    pub fn all(self: &Arc<Self>) -> impl Iterator<Item = Person> + Send + 'static {
        let store = Arc::clone(self);
        let keys: Vec<i32> = self.people.keys().copied().collect();
        keys.into_iter().filter_map(move |key| {
            store.stream_latency.pause();
            store.people.get(&key).cloned()
        })
    }

    pub fn len(&self) -> usize {
        self.people.len()
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }

    fn lookup(&self, key: i32) -> Result<Person, Error> {
        self.people.get(&key).cloned().ok_or_else(|| {
            debug!("Person {key} not found");
            Error::not_found(key)
        })
    }
}
