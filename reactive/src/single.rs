use log::*;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;

use crate::emitter::Emitter;
use crate::error::{BoxError, Error};
use crate::lifecycle::State;
use crate::scheduler::{Immediate, Scheduler};
use crate::subscriber::Subscriber;
use crate::subscription::Subscription;

type Build<T> = Box<dyn FnOnce(SingleSink<T>) + Send>;

/// A deferred computation that emits at most one value and then completes.
///
/// Constructing a `SingleValue` never runs its build function; that happens only
/// once a subscriber attaches, and only once per instance.
pub struct SingleValue<T: Send + 'static> {
    emitter: Arc<Emitter<T>>,
    build: Option<Build<T>>,
}

impl<T: Send + 'static> SingleValue<T> {
    /// Stores `build` without invoking it. The build function signals its result
    /// through the sink, from any thread.
    pub fn create<F>(build: F) -> Self
    where
        F: FnOnce(SingleSink<T>) + Send + 'static,
    {
        Self {
            emitter: Emitter::new("single"),
            build: Some(Box::new(build)),
        }
    }

    pub fn just(value: T) -> Self {
        Self::create(move |sink| sink.success(value))
    }

    /// Runs the fallible `f` on subscription; an `Err` becomes a producer failure.
    pub fn from_fn<F, E>(f: F) -> Self
    where
        F: FnOnce() -> Result<T, E> + Send + 'static,
        E: Into<BoxError>,
    {
        Self::create(move |sink| match f() {
            Ok(value) => sink.success(value),
            Err(e) => sink.error(Error::producer(e)),
        })
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

    pub fn do_on_success<F>(self, f: F) -> Self
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

    /// Subscribes and runs the build function on the calling thread.
    pub fn subscribe<S>(&mut self, subscriber: S) -> Result<Subscription, Error>
    where
        S: Subscriber<T> + 'static,
    {
        self.subscribe_on(&Immediate, subscriber)
    }

    /// Subscribes on the calling thread, then hands the build function to
    /// `scheduler`. Returns without waiting for the terminal event unless the
    /// scheduler runs work inline.
    pub fn subscribe_on<S>(
        &mut self,
        scheduler: &impl Scheduler,
        subscriber: S,
    ) -> Result<Subscription, Error>
    where
        S: Subscriber<T> + 'static,
    {
        let subscription = self.emitter.attach(Box::new(subscriber))?;
        let Some(build) = self.build.take() else {
            return Err(Error::already_subscribed());
        };

        let emitter = Arc::clone(&self.emitter);
        let sink = SingleSink {
            emitter: Some(Arc::clone(&emitter)),
        };
        scheduler.schedule(Box::new(move || {
            if emitter.is_cancelled() {
                trace!("single producer cancelled before build");
                return;
            }
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(move || build(sink))) {
                emitter.fail(Error::panicked(payload));
            }
        }));

        Ok(subscription)
    }
}

impl<T: Send + 'static> fmt::Debug for SingleValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("SingleValue")
            .field("state", &self.state())
            .finish()
    }
}

/// Handed to a `SingleValue` build function to signal its one result.
///
/// Dropping the sink without signalling completes the producer without a value.
pub struct SingleSink<T: Send + 'static> {
    emitter: Option<Arc<Emitter<T>>>,
}

impl<T: Send + 'static> SingleSink<T> {
    pub fn success(mut self, value: T) {
        if let Some(emitter) = self.emitter.take() {
            if emitter.emit(value) {
                emitter.complete();
            }
        }
    }

    pub fn complete_empty(mut self) {
        if let Some(emitter) = self.emitter.take() {
            emitter.complete();
        }
    }

    pub fn error(mut self, error: Error) {
        if let Some(emitter) = self.emitter.take() {
            emitter.fail(error);
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.emitter
            .as_ref()
            .map_or(true, |emitter| emitter.is_cancelled())
    }
}

impl<T: Send + 'static> Drop for SingleSink<T> {
    fn drop(&mut self) {
        // A panicking build function is reported as a failure by the driver.
        if thread::panicking() {
            return;
        }
        if let Some(emitter) = self.emitter.take() {
            emitter.complete();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::scheduler::{BlockingPool, NewThread};
    use crate::subscriber::Handlers;
    use crate::testing::{Recorded, Recorder};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc;
    use std::time::Duration;

    #[test]
    fn construction_does_not_run_build() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counted = Arc::clone(&calls);
        let single = SingleValue::create(move |sink| {
            counted.fetch_add(1, Ordering::SeqCst);
            sink.success(1);
        });

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(single.state(), State::Created);
    }

    #[test]
    fn lifecycle_fires_in_order() {
        let (recorder, events) = Recorder::new();
        let mut single = SingleValue::just(7);

        single.subscribe(recorder).unwrap();

        assert_eq!(
            events.take(),
            vec![Recorded::Subscribe, Recorded::Next(7), Recorded::Complete]
        );
        assert_eq!(single.state(), State::Completed);
    }

    #[test]
    fn hooks_fire_before_subscriber_callbacks() {
        let (recorder, events) = Recorder::new();
        let on_subscribe = events.clone();
        let on_next = events.clone();
        let on_success = events.clone();

        let mut single = SingleValue::just(1)
            .do_on_subscribe(move || on_subscribe.push(Recorded::Hook("subscribe")))
            .do_on_next(move |_| on_next.push(Recorded::Hook("next")))
            .do_on_success(move || on_success.push(Recorded::Hook("success")));
        single.subscribe(recorder).unwrap();

        assert_eq!(
            events.take(),
            vec![
                Recorded::Hook("subscribe"),
                Recorded::Subscribe,
                Recorded::Hook("next"),
                Recorded::Next(1),
                Recorded::Hook("success"),
                Recorded::Complete,
            ]
        );
    }

    #[test]
    fn second_subscribe_fails_with_already_subscribed() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counted = Arc::clone(&calls);
        let mut single = SingleValue::from_fn(move || {
            counted.fetch_add(1, Ordering::SeqCst);
            Ok::<_, BoxError>(5)
        });

        let (first, _) = Recorder::new();
        single.subscribe(first).unwrap();

        let (second, events) = Recorder::new();
        let err = single.subscribe(second).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::AlreadySubscribed);
        assert!(events.take().is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn build_error_reaches_on_error() {
        let (recorder, events) = Recorder::new();
        let mut single: SingleValue<i32> = SingleValue::from_fn(|| Err("store unavailable"));

        single.subscribe(recorder).unwrap();

        assert_eq!(
            events.take(),
            vec![
                Recorded::Subscribe,
                Recorded::Error(ErrorKind::ProducerFailure)
            ]
        );
        assert_eq!(single.state(), State::Errored);
    }

    #[test]
    fn panic_in_build_reaches_on_error() {
        let (recorder, events) = Recorder::new();
        let mut single: SingleValue<i32> = SingleValue::create(|_sink| panic!("boom"));

        single.subscribe(recorder).unwrap();

        assert_eq!(
            events.take(),
            vec![
                Recorded::Subscribe,
                Recorded::Error(ErrorKind::ProducerFailure)
            ]
        );
    }

    #[test]
    fn dropped_sink_completes_empty() {
        let (recorder, events) = Recorder::new();
        let mut single: SingleValue<i32> = SingleValue::create(drop);

        single.subscribe(recorder).unwrap();

        assert_eq!(events.take(), vec![Recorded::Subscribe, Recorded::Complete]);
    }

    #[test]
    fn subscribe_on_new_thread_returns_before_terminal_event() {
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let (done_tx, done_rx) = mpsc::channel();
        let mut single = SingleValue::create(move |sink| {
            release_rx.recv().unwrap();
            sink.success(thread::current().id());
        });

        let caller = thread::current().id();
        let subscription = single
            .subscribe_on(
                &NewThread,
                Handlers::new(move |worker| done_tx.send(worker).unwrap()),
            )
            .unwrap();

        // Production is parked on the worker; subscribe has already returned.
        assert_eq!(subscription.state(), State::Subscribed);
        release_tx.send(()).unwrap();

        let worker = done_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_ne!(worker, caller);
    }

    #[test]
    fn cancel_before_value_suppresses_callbacks() {
        let (started_tx, started_rx) = mpsc::channel::<()>();
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let (finished_tx, finished_rx) = mpsc::channel();
        let (recorder, events) = Recorder::new();
        let mut single = SingleValue::create(move |sink: SingleSink<i32>| {
            started_tx.send(()).unwrap();
            release_rx.recv().unwrap();
            let cancelled = sink.is_cancelled();
            sink.success(3);
            finished_tx.send(cancelled).unwrap();
        });

        let subscription = single.subscribe_on(&NewThread, recorder).unwrap();
        started_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        subscription.cancel();
        release_tx.send(()).unwrap();

        assert!(finished_rx.recv_timeout(Duration::from_secs(5)).unwrap());
        assert_eq!(events.take(), vec![Recorded::Subscribe]);
        assert_eq!(single.state(), State::Cancelled);
    }

    #[tokio::test]
    async fn blocking_pool_delivers_from_worker() {
        let (tx, rx) = tokio::sync::oneshot::channel();
        let mut tx = Some(tx);
        let mut single = SingleValue::create(|sink| {
            thread::sleep(Duration::from_millis(10));
            sink.success("late");
        });

        single
            .subscribe_on(
                &BlockingPool::try_current().unwrap(),
                Handlers::new(move |value| {
                    if let Some(tx) = tx.take() {
                        let _ = tx.send(value);
                    }
                }),
            )
            .unwrap();

        assert_eq!(rx.await.unwrap(), "late");
    }
}
