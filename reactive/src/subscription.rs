use std::fmt;
use std::sync::Arc;

use crate::lifecycle::State;

/// Control surface a producer exposes to its subscription handle.
pub(crate) trait Control: Send + Sync {
    fn cancel(&self);
    fn state(&self) -> State;
}

/// The relationship between one producer and its single consumer.
///
/// Handles are cheap to clone; every clone controls the same subscription.
#[derive(Clone)]
pub struct Subscription {
    control: Arc<dyn Control>,
}

impl Subscription {
    pub(crate) fn new(control: Arc<dyn Control>) -> Self {
        Self { control }
    }

    /// Stops production. No callback fires after cancellation takes effect and
    /// cancelling a finished subscription is a no-op.
    pub fn cancel(&self) {
        self.control.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.state() == State::Cancelled
    }

    pub fn state(&self) -> State {
        self.control.state()
    }

    /// Returns a guard that cancels this subscription when dropped.
    pub fn cancel_on_drop(&self) -> CancelGuard {
        CancelGuard {
            subscription: self.clone(),
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("state", &self.state())
            .finish()
    }
}

/// Cancels the wrapped subscription on drop, e.g. when a response future is
/// dropped because the client went away.
#[derive(Debug)]
pub struct CancelGuard {
    subscription: Subscription,
}

impl Drop for CancelGuard {
    fn drop(&mut self) {
        if !self.subscription.state().is_terminal() {
            self.subscription.cancel();
        }
    }
}
