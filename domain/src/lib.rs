//! Domain layer: the person records, the store that holds them, and the
//! producers request handlers hand to the transport.

pub mod error;
pub mod item_store;
pub mod latency;
pub mod person;

pub use item_store::ItemStore;
pub use person::Person;
