use log::*;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::emitter::Emitter;
use crate::error::{BoxError, Error};
use crate::lifecycle::State;
use crate::scheduler::{Immediate, Scheduler};
use crate::subscriber::Subscriber;
use crate::subscription::Subscription;

type Source<T> = Box<dyn Iterator<Item = Result<T, Error>> + Send>;

/// A lazy, finite, single-pass sequence of values pushed to one subscriber.
///
/// Items are pulled from the wrapped source only while the subscription is live,
/// one at a time, each delivered before the next is pulled. Once consumed the
/// sequence cannot be replayed: subscribing again fails with `AlreadySubscribed`.
pub struct MultiValue<T: Send + 'static> {
    emitter: Arc<Emitter<T>>,
    source: Option<Source<T>>,
}

enum Drained {
    Exhausted,
    Stopped,
}

impl<T: Send + 'static> MultiValue<T> {
    /// Wraps any finite ordered source, e.g. a range mapped to records.
    pub fn from_source<I>(source: I) -> Self
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: Send + 'static,
    {
        Self::with_source(Box::new(source.into_iter().map(Ok)))
    }

    /// Like `from_source`, for sources whose items can fail. The first `Err`
    /// terminates the sequence with `on_error`.
    pub fn try_from_source<I, E>(source: I) -> Self
    where
        I: IntoIterator<Item = Result<T, E>>,
        I::IntoIter: Send + 'static,
        E: Into<BoxError>,
    {
        Self::with_source(Box::new(
            source.into_iter().map(|item| item.map_err(Error::producer)),
        ))
    }

    fn with_source(source: Source<T>) -> Self {
        Self {
            emitter: Emitter::new("multi"),
            source: Some(source),
        }
    }

    pub fn do_on_subscribe<F>(self, f: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        self.emitter
            .with_hooks(|hooks| hooks.on_subscribe.push(Box::new(f)));
        self
    }

    pub fn do_on_next<F>(self, f: F) -> Self
    where
        F: FnMut(&T) + Send + 'static,
    {
        self.emitter.with_hooks(|hooks| hooks.on_next.push(Box::new(f)));
        self
    }

    pub fn do_on_complete<F>(self, f: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        self.emitter
            .with_hooks(|hooks| hooks.on_complete.push(Box::new(f)));
        self
    }

    pub fn do_on_error<F>(self, f: F) -> Self
    where
        F: FnMut(&Error) + Send + 'static,
    {
        self.emitter.with_hooks(|hooks| hooks.on_error.push(Box::new(f)));
        self
    }

    pub fn state(&self) -> State {
        self.emitter.state()
    }

    /// Subscribes and drains the source on the calling thread.
    pub fn subscribe<S>(&mut self, subscriber: S) -> Result<Subscription, Error>
    where
        S: Subscriber<T> + 'static,
    {
        self.subscribe_on(&Immediate, subscriber)
    }

    /// Subscribes on the calling thread, then drains the source on `scheduler`.
    pub fn subscribe_on<S>(
        &mut self,
        scheduler: &impl Scheduler,
        subscriber: S,
    ) -> Result<Subscription, Error>
    where
        S: Subscriber<T> + 'static,
    {
        let subscription = self.emitter.attach(Box::new(subscriber))?;
        let Some(mut source) = self.source.take() else {
            return Err(Error::already_subscribed());
        };

        let emitter = Arc::clone(&self.emitter);
        scheduler.schedule(Box::new(move || {
            let drained = panic::catch_unwind(AssertUnwindSafe(|| drain(&emitter, &mut source)));
            // Release the source before the terminal callback fires.
            drop(source);

            match drained {
                Ok(Ok(Drained::Exhausted)) => emitter.complete(),
                Ok(Ok(Drained::Stopped)) => {
                    debug!("multi producer stopped after cancellation");
                    emitter.complete();
                }
                Ok(Err(error)) => emitter.fail(error),
                Err(payload) => emitter.fail(Error::panicked(payload)),
            }
        }));

        Ok(subscription)
    }
}

fn drain<T: Send + 'static>(
    emitter: &Emitter<T>,
    source: &mut Source<T>,
) -> Result<Drained, Error> {
    loop {
        if emitter.is_cancelled() {
            return Ok(Drained::Stopped);
        }
        match source.next() {
            Some(Ok(value)) => {
                if !emitter.emit(value) {
                    return Ok(Drained::Stopped);
                }
            }
            Some(Err(error)) => return Err(error),
            None => return Ok(Drained::Exhausted),
        }
    }
}

impl<T: Send + 'static> fmt::Debug for MultiValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("MultiValue")
            .field("state", &self.state())
            .finish()
    }
}
