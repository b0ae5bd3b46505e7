use crate::error::Error;
use crate::subscription::Subscription;

/// Consumer side of a producer.
///
/// Callbacks for one subscription never overlap: `on_subscribe` first, then
/// zero or more `on_next`, then exactly one of `on_complete` or `on_error`
/// (unless the subscription is cancelled, in which case callbacks simply stop).
pub trait Subscriber<T>: Send {
    fn on_subscribe(&mut self, _subscription: &Subscription) {}

    fn on_next(&mut self, value: T);

    fn on_error(&mut self, _error: Error) {}

    fn on_complete(&mut self) {}
}

impl<T, S> Subscriber<T> for Box<S>
where
    S: Subscriber<T> + ?Sized,
{
    fn on_subscribe(&mut self, subscription: &Subscription) {
        (**self).on_subscribe(subscription)
    }

    fn on_next(&mut self, value: T) {
        (**self).on_next(value)
    }

    fn on_error(&mut self, error: Error) {
        (**self).on_error(error)
    }

    fn on_complete(&mut self) {
        (**self).on_complete()
    }
}

type OnSubscribe = Box<dyn FnMut(&Subscription) + Send>;
type OnNext<T> = Box<dyn FnMut(T) + Send>;
type OnError = Box<dyn FnMut(Error) + Send>;
type OnComplete = Box<dyn FnMut() + Send>;

/// Closure based subscriber.
///
/// ```
/// use reactive::{Handlers, SingleValue};
///
/// let mut greeting = SingleValue::just("hello");
/// greeting
///     .subscribe(
///         Handlers::new(|value| println!("data: {value}"))
///             .on_complete(|| println!("complete")),
///     )
///     .unwrap();
/// ```
pub struct Handlers<T> {
    on_subscribe: Option<OnSubscribe>,
    on_next: OnNext<T>,
    on_error: Option<OnError>,
    on_complete: Option<OnComplete>,
}

impl<T> Handlers<T> {
    pub fn new<F>(on_next: F) -> Self
    where
        F: FnMut(T) + Send + 'static,
    {
        Self {
            on_subscribe: None,
            on_next: Box::new(on_next),
            on_error: None,
            on_complete: None,
        }
    }

    pub fn on_subscribe<F>(mut self, f: F) -> Self
    where
        F: FnMut(&Subscription) + Send + 'static,
    {
        self.on_subscribe = Some(Box::new(f));
        self
    }

    pub fn on_error<F>(mut self, f: F) -> Self
    where
        F: FnMut(Error) + Send + 'static,
    {
        self.on_error = Some(Box::new(f));
        self
    }

    pub fn on_complete<F>(mut self, f: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        self.on_complete = Some(Box::new(f));
        self
    }
}

impl<T> Subscriber<T> for Handlers<T> {
    fn on_subscribe(&mut self, subscription: &Subscription) {
        if let Some(f) = self.on_subscribe.as_mut() {
            f(subscription);
        }
    }

    fn on_next(&mut self, value: T) {
        (self.on_next)(value);
    }

    fn on_error(&mut self, error: Error) {
        if let Some(f) = self.on_error.as_mut() {
            f(error);
        }
    }

    fn on_complete(&mut self) {
        if let Some(f) = self.on_complete.as_mut() {
            f();
        }
    }
}
