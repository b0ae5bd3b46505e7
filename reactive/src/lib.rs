//! Push-based producers that defer their work until a consumer subscribes.
//!
//! # Producers
//!
//! - [`SingleValue`]: emits at most one value, then completes.
//! - [`MultiValue`]: emits a lazy, finite, single-pass sequence of values.
//!
//! Constructing a producer only stores a description of the work. Subscribing
//! attaches exactly one [`Subscriber`] and triggers production; a second
//! subscription fails with [`ErrorKind::AlreadySubscribed`].
//!
//! # Callback ordering
//!
//! For every subscription:
//!
//! 1. `on_subscribe` fires once, before any work begins
//! 2. `on_next` fires once per produced value, each before the next value is produced
//! 3. exactly one terminal callback fires: `on_complete` or `on_error`
//!
//! Producer hooks (`do_on_subscribe`, `do_on_next`, ...) fire just before the
//! subscriber's callback of the same kind. Nothing fires after the terminal
//! callback, and nothing fires after a [`Subscription`] is cancelled.
//!
//! # Threading
//!
//! `subscribe` drives production on the calling thread. `subscribe_on` runs
//! `on_subscribe` on the calling thread and hands production to a [`Scheduler`],
//! returning before the terminal event. Callbacks then run on the scheduler's
//! thread but never overlap.
//!
//! ```
//! use reactive::{Handlers, MultiValue, NewThread};
//! use std::sync::mpsc;
//!
//! let (tx, rx) = mpsc::channel();
//! let mut numbers = MultiValue::from_source(1..4).do_on_complete(|| println!("complete"));
//! numbers
//!     .subscribe_on(&NewThread, Handlers::new(move |n| tx.send(n).unwrap()))
//!     .unwrap();
//!
//! assert_eq!(rx.iter().collect::<Vec<_>>(), vec![1, 2, 3]);
//! ```

mod emitter;
pub mod error;
pub mod lifecycle;
mod multi;
pub mod scheduler;
mod single;
mod subscriber;
mod subscription;

#[cfg(test)]
mod testing;

pub use error::{BoxError, Error, ErrorKind};
pub use lifecycle::State;
pub use multi::MultiValue;
pub use scheduler::{BlockingPool, Immediate, NewThread, Scheduler};
pub use single::{SingleSink, SingleValue};
pub use subscriber::{Handlers, Subscriber};
pub use subscription::{CancelGuard, Subscription};
