//! Execution contexts a producer can be driven on.
//!
//! `Immediate` runs production on the subscribing thread, so `subscribe` returns
//! only after the terminal event. The other schedulers hand production off and
//! let `subscribe_on` return as soon as `on_subscribe` has fired.
use std::thread;
use tokio::runtime::{Handle, TryCurrentError};

pub type Work = Box<dyn FnOnce() + Send + 'static>;

pub trait Scheduler {
    fn schedule(&self, work: Work);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Immediate;

impl Scheduler for Immediate {
    fn schedule(&self, work: Work) {
        work();
    }
}

/// Runs each production on a dedicated OS thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct NewThread;

impl Scheduler for NewThread {
    fn schedule(&self, work: Work) {
        thread::spawn(work);
    }
}

/// Runs each production as a task on a tokio runtime's blocking pool, which is
/// where build functions that sleep or block belong.
#[derive(Debug, Clone)]
pub struct BlockingPool {
    handle: Handle,
}

impl BlockingPool {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    pub fn try_current() -> Result<Self, TryCurrentError> {
        Handle::try_current().map(Self::new)
    }
}

impl Scheduler for BlockingPool {
    fn schedule(&self, work: Work) {
        // Detached: completion is observed through the subscriber callbacks.
        drop(self.handle.spawn_blocking(work));
    }
}
