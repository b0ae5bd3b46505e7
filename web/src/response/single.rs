//! Awaits the one value of a `SingleValue` producer for a response body.
use domain::error::{Error as DomainError, StreamErrorKind};
use log::*;
use reactive::{BlockingPool, Error as ReactiveError, SingleValue, Subscriber};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::timeout;

use crate::Error;

type Outcome<T> = Result<Option<T>, ReactiveError>;

/// Subscribes to `producer` on the blocking pool and waits for its terminal
/// event.
///
/// Fails with `NotFound` when the producer completes empty and with `Timeout`
/// when nothing arrives within `idle_timeout`. If the calling future is dropped
/// (the client disconnected) the subscription is cancelled.
pub(crate) async fn respond<T>(
    mut producer: SingleValue<T>,
    idle_timeout: Duration,
) -> Result<T, Error>
where
    T: Send + 'static,
{
    let scheduler = BlockingPool::try_current().map_err(ReactiveError::producer)?;
    let (tx, rx) = oneshot::channel();

    let subscription = producer.subscribe_on(&scheduler, Reply { tx: Some(tx) })?;
    let _guard = subscription.cancel_on_drop();

    match timeout(idle_timeout, rx).await {
        Ok(Ok(Ok(Some(value)))) => Ok(value),
        Ok(Ok(Ok(None))) => Err(DomainError::no_value().into()),
        Ok(Ok(Err(err))) => Err(err.into()),
        Ok(Err(_)) => {
            warn!("Single value producer dropped its subscriber without a terminal event");
            Err(DomainError::stream(StreamErrorKind::ProducerFailure).into())
        }
        Err(_) => {
            warn!("No value after {idle_timeout:?}, cancelling subscription");
            Err(DomainError::stream(StreamErrorKind::Timeout).into())
        }
    }
}

/// Forwards the first terminal outcome to the waiting request.
struct Reply<T> {
    tx: Option<oneshot::Sender<Outcome<T>>>,
}

impl<T> Reply<T> {
    fn send(&mut self, outcome: Outcome<T>) {
        if let Some(tx) = self.tx.take() {
            if tx.send(outcome).is_err() {
                debug!("Request went away before the single value was ready");
            }
        }
    }
}

impl<T: Send> Subscriber<T> for Reply<T> {
    fn on_next(&mut self, value: T) {
        self.send(Ok(Some(value)));
    }

    fn on_error(&mut self, error: ReactiveError) {
        self.send(Err(error));
    }

    fn on_complete(&mut self) {
        self.send(Ok(None));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread;

    const IDLE: Duration = Duration::from_secs(5);

    fn status(err: Error) -> StatusCode {
        err.into_response().status()
    }

    #[tokio::test]
    async fn returns_the_emitted_value() {
        let value = respond(SingleValue::just(42), IDLE).await.unwrap();
        assert_eq!(value, 42);
    }

    #[tokio::test]
    async fn empty_completion_is_not_found() {
        let producer = SingleValue::<i32>::create(|sink| sink.complete_empty());
        let err = respond(producer, IDLE).await.unwrap_err();
        assert_eq!(status(err), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn build_error_is_mapped() {
        let producer = SingleValue::<i32>::from_fn(|| Err(DomainError::not_found(5)));
        let err = respond(producer, IDLE).await.unwrap_err();
        assert_eq!(status(err), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn second_subscription_is_a_conflict() {
        let mut producer = SingleValue::just(1);
        producer.subscribe(reactive::Handlers::new(|_| {})).unwrap();

        let err = respond(producer, IDLE).await.unwrap_err();
        assert_eq!(status(err), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn slow_producer_times_out_and_is_cancelled() {
        let emitted = Arc::new(AtomicBool::new(false));
        let observed = Arc::clone(&emitted);
        let producer = SingleValue::from_fn(|| {
            thread::sleep(Duration::from_millis(300));
            Ok::<_, DomainError>(1)
        })
        .do_on_next(move |_| observed.store(true, Ordering::SeqCst));

        let err = respond(producer, Duration::from_millis(50)).await.unwrap_err();
        assert_eq!(status(err), StatusCode::GATEWAY_TIMEOUT);

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert!(!emitted.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn dropping_the_request_cancels_the_subscription() {
        let emitted = Arc::new(AtomicBool::new(false));
        let observed = Arc::clone(&emitted);
        let (started_tx, started_rx) = std::sync::mpsc::channel();
        let producer = SingleValue::from_fn(move || {
            let _ = started_tx.send(());
            thread::sleep(Duration::from_millis(200));
            Ok::<_, DomainError>(1)
        })
        .do_on_next(move |_| observed.store(true, Ordering::SeqCst));

        let request = tokio::spawn(respond(producer, IDLE));
        tokio::task::spawn_blocking(move || started_rx.recv())
            .await
            .unwrap()
            .unwrap();
        request.abort();
        assert!(request.await.unwrap_err().is_cancelled());

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert!(!emitted.load(Ordering::SeqCst));
    }
}
