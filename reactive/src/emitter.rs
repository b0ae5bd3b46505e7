use log::*;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::Error;
use crate::lifecycle::{Lifecycle, Signal, State};
use crate::subscriber::Subscriber;
use crate::subscription::{Control, Subscription};

/// Producer-side lifecycle hooks, fired before the subscriber's callback of the
/// same kind.
pub(crate) struct Hooks<T> {
    pub(crate) on_subscribe: Vec<Box<dyn FnMut() + Send>>,
    pub(crate) on_next: Vec<Box<dyn FnMut(&T) + Send>>,
    pub(crate) on_complete: Vec<Box<dyn FnMut() + Send>>,
    pub(crate) on_error: Vec<Box<dyn FnMut(&Error) + Send>>,
}

impl<T> Default for Hooks<T> {
    fn default() -> Self {
        Self {
            on_subscribe: Vec::new(),
            on_next: Vec::new(),
            on_complete: Vec::new(),
            on_error: Vec::new(),
        }
    }
}

struct Delivery<T> {
    hooks: Hooks<T>,
    subscriber: Option<Box<dyn Subscriber<T>>>,
}

impl<T> Delivery<T> {
    // Drops the subscriber and hooks along with anything they captured.
    fn release(&mut self) {
        self.subscriber = None;
        self.hooks = Hooks::default();
    }
}

/// Shared core of both producer kinds: owns the lifecycle and routes signals to
/// hooks and the subscriber.
///
/// The delivery lock is held for the duration of every callback, which is what
/// serializes callbacks of one subscription. Cancellation only takes the
/// lifecycle lock so it can be requested from inside a callback.
pub(crate) struct Emitter<T> {
    kind: &'static str,
    lifecycle: Mutex<Lifecycle>,
    delivery: Mutex<Delivery<T>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<T: Send + 'static> Emitter<T> {
    pub(crate) fn new(kind: &'static str) -> Arc<Self> {
        Arc::new(Self {
            kind,
            lifecycle: Mutex::new(Lifecycle::new()),
            delivery: Mutex::new(Delivery {
                hooks: Hooks::default(),
                subscriber: None,
            }),
        })
    }

    pub(crate) fn with_hooks(&self, f: impl FnOnce(&mut Hooks<T>)) {
        f(&mut lock(&self.delivery).hooks);
    }

    pub(crate) fn state(&self) -> State {
        lock(&self.lifecycle).state()
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.state() == State::Cancelled
    }

    fn advance(&self, signal: Signal) -> Result<State, Error> {
        lock(&self.lifecycle).advance(signal)
    }

    /// Performs the subscribe transition and fires `on_subscribe`.
    pub(crate) fn attach(
        self: &Arc<Self>,
        mut subscriber: Box<dyn Subscriber<T>>,
    ) -> Result<Subscription, Error> {
        let mut delivery = lock(&self.delivery);
        self.advance(Signal::Subscribe)?;
        debug!("{} producer subscribed", self.kind);

        let control: Arc<dyn Control> = self.clone();
        let subscription = Subscription::new(control);

        for hook in delivery.hooks.on_subscribe.iter_mut() {
            hook();
        }
        subscriber.on_subscribe(&subscription);
        delivery.subscriber = Some(subscriber);

        Ok(subscription)
    }

    /// Delivers one value. Returns `false` once the subscription no longer
    /// accepts values, in which case production should stop.
    pub(crate) fn emit(&self, value: T) -> bool {
        let mut delivery = lock(&self.delivery);
        if let Err(e) = self.advance(Signal::Emit) {
            trace!("{} producer dropped a value: {e}", self.kind);
            delivery.release();
            return false;
        }

        for hook in delivery.hooks.on_next.iter_mut() {
            hook(&value);
        }
        if let Some(subscriber) = delivery.subscriber.as_mut() {
            subscriber.on_next(value);
        }

        // The subscriber may have cancelled from inside on_next.
        if self.is_cancelled() {
            delivery.release();
            return false;
        }
        true
    }

    pub(crate) fn complete(&self) {
        let mut delivery = lock(&self.delivery);
        if let Err(e) = self.advance(Signal::Complete) {
            trace!("{} producer completion ignored: {e}", self.kind);
            delivery.release();
            return;
        }
        debug!("{} producer completed", self.kind);

        for hook in delivery.hooks.on_complete.iter_mut() {
            hook();
        }
        if let Some(mut subscriber) = delivery.subscriber.take() {
            subscriber.on_complete();
        }
        delivery.release();
    }

    pub(crate) fn fail(&self, error: Error) {
        let mut delivery = lock(&self.delivery);
        if let Err(e) = self.advance(Signal::Fail) {
            warn!(
                "{} producer failure after termination ({e}): {error}",
                self.kind
            );
            delivery.release();
            return;
        }
        debug!("{} producer failed: {error}", self.kind);

        for hook in delivery.hooks.on_error.iter_mut() {
            hook(&error);
        }
        if let Some(mut subscriber) = delivery.subscriber.take() {
            subscriber.on_error(error);
        }
        delivery.release();
    }
}

impl<T: Send + 'static> Control for Emitter<T> {
    fn cancel(&self) {
        if self.advance(Signal::Cancel).is_err() {
            return;
        }
        debug!("{} producer cancelled", self.kind);

        // Release eagerly when no callback is running; otherwise the running
        // callback's emitter releases on its way out.
        if let Ok(mut delivery) = self.delivery.try_lock() {
            delivery.release();
        }
    }

    fn state(&self) -> State {
        Emitter::state(self)
    }
}
