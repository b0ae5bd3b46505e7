use std::sync::{Arc, Mutex};

use crate::error::{Error, ErrorKind};
use crate::subscriber::Subscriber;
use crate::subscription::Subscription;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Recorded<T> {
    Hook(&'static str),
    Subscribe,
    Next(T),
    Error(ErrorKind),
    Complete,
}

pub(crate) struct Events<T>(Arc<Mutex<Vec<Recorded<T>>>>);

// Derived Clone would require `T: Clone`; only the handle is cloned.
impl<T> Clone for Events<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T> Events<T> {
    pub(crate) fn push(&self, event: Recorded<T>) {
        self.0.lock().unwrap().push(event);
    }

    pub(crate) fn take(&self) -> Vec<Recorded<T>> {
        std::mem::take(&mut *self.0.lock().unwrap())
    }
}

/// Subscriber that records every callback, optionally cancelling itself after
/// a number of values.
pub(crate) struct Recorder<T> {
    events: Events<T>,
    subscription: Option<Subscription>,
    cancel_after: Option<usize>,
    seen: usize,
}

impl<T> Recorder<T> {
    pub(crate) fn new() -> (Self, Events<T>) {
        let events = Events(Arc::new(Mutex::new(Vec::new())));
        let recorder = Recorder {
            events: events.clone(),
            subscription: None,
            cancel_after: None,
            seen: 0,
        };
        (recorder, events)
    }

    pub(crate) fn cancelling_after(count: usize) -> (Self, Events<T>) {
        let (mut recorder, events) = Self::new();
        recorder.cancel_after = Some(count);
        (recorder, events)
    }
}

impl<T: Send> Subscriber<T> for Recorder<T> {
    fn on_subscribe(&mut self, subscription: &Subscription) {
        self.subscription = Some(subscription.clone());
        self.events.push(Recorded::Subscribe);
    }

    fn on_next(&mut self, value: T) {
        self.events.push(Recorded::Next(value));
        self.seen += 1;
        if self.cancel_after == Some(self.seen) {
            if let Some(subscription) = self.subscription.as_ref() {
                subscription.cancel();
            }
        }
    }

    fn on_error(&mut self, error: Error) {
        self.events.push(Recorded::Error(error.kind()));
    }

    fn on_complete(&mut self) {
        self.events.push(Recorded::Complete);
    }
}
