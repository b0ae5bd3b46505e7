//! Person records and the producers that serve them.
//!
//! Every function here only describes work: nothing touches the item store
//! until the returned producer is subscribed to.
use log::*;
use reactive::{MultiValue, SingleValue};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::item_store::ItemStore;

/// Constant payload of the minimal single-value endpoints.
pub const GREETING: &str = "haha";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Person {
    id: i32,
    name: String,
}

impl Person {
    pub fn new(id: i32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Person {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Person(id={}, name={})", self.id, self.name)
    }
}

/// A single person looked up by key. Fails with `NotFound` rather than
/// completing empty when the key is absent.
pub fn find(store: &Arc<ItemStore>, key: i32) -> SingleValue<Person> {
    let store = Arc::clone(store);
    SingleValue::from_fn(move || store.get(key))
        .do_on_subscribe(move || debug!("Person {key}: subscribed"))
        .do_on_next(|person| debug!("Person data: {person}"))
        .do_on_success(move || debug!("Person {key}: success"))
}

pub fn greeting() -> SingleValue<String> {
    SingleValue::just(GREETING.to_string())
}

/// People with the given ids, fetched one at a time in order.
pub fn stream_range(store: &Arc<ItemStore>, ids: RangeInclusive<i32>) -> MultiValue<Person> {
    let store = Arc::clone(store);
    let first = *ids.start();
    let last = *ids.end();
    MultiValue::try_from_source(ids.map(move |id| store.get_streamed(id)))
        .do_on_subscribe(move || debug!("Person stream {first}..={last}: subscribed"))
        .do_on_next(|person| debug!("Person stream data: {person}"))
        .do_on_complete(move || debug!("Person stream {first}..={last}: complete"))
}

/// Every person in the store, in key order.
pub fn stream_all(store: &Arc<ItemStore>) -> MultiValue<Person> {
    let total = store.len();
    MultiValue::from_source(store.all())
        .do_on_subscribe(move || debug!("All {total} people: subscribed"))
        .do_on_complete(move || debug!("All {total} people: complete"))
}
