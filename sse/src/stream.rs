//! Bridges a `MultiValue` producer to an event-stream response body.
//!
//! Production runs on the blocking pool. Each emitted value is encoded into one
//! [`Frame`] and handed to the response together with an acknowledgement. The
//! producer waits for that acknowledgement, which is sent once the body asks for
//! the frame after it, so no value is produced before the previous frame has
//! been written. Dropping the returned stream (the client went away) cancels the subscription
//! and unregisters it.
use async_stream::stream;
use axum::response::sse::Event;
use futures::{Stream, StreamExt};
use log::*;
use reactive::{BlockingPool, Error, MultiValue, Subscriber, Subscription};
use serde::Serialize;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;

use crate::connection::StreamId;
use crate::message::Frame;
use crate::Manager;

/// Subscribes to `producer` and returns the SSE events for a response body.
pub fn event_stream<T>(
    manager: &Arc<Manager>,
    route: &str,
    producer: MultiValue<T>,
    idle_timeout: Duration,
) -> Result<impl Stream<Item = Result<Event, Infallible>> + Send + 'static, Error>
where
    T: Serialize + Send + 'static,
{
    let frames = frame_stream(manager, route, producer, idle_timeout)?;
    Ok(frames.map(|frame| Ok::<_, Infallible>(frame.into_event())))
}

/// Same as [`event_stream`], yielding the encoded frames themselves.
pub fn frame_stream<T>(
    manager: &Arc<Manager>,
    route: &str,
    mut producer: MultiValue<T>,
    idle_timeout: Duration,
) -> Result<impl Stream<Item = Frame> + Send + 'static, Error>
where
    T: Serialize + Send + 'static,
{
    let scheduler = BlockingPool::try_current().map_err(Error::producer)?;
    let (tx, mut rx) = mpsc::channel(1);

    let subscription = producer.subscribe_on(
        &scheduler,
        FrameForwarder {
            route: route.to_string(),
            tx: Some(tx),
            subscription: None,
        },
    )?;

    let stream_id = manager.register_stream(route, subscription.clone());
    let guard = StreamGuard {
        manager: Arc::clone(manager),
        stream_id,
        subscription,
    };
    let route = route.to_string();

    Ok(stream! {
        // Moved into the stream so that dropping the stream runs the cleanup.
        let guard = guard;

        loop {
            match timeout(idle_timeout, rx.recv()).await {
                Ok(Some((frame, written))) => {
                    yield frame;
                    // Resumed: the writer took the frame and wants the next one.
                    let _ = written.send(());
                }
                Ok(None) => break,
                Err(_) => {
                    warn!("SSE stream on {route} idle for {idle_timeout:?}, cancelling");
                    guard.subscription.cancel();
                    break;
                }
            }
        }

        debug!("SSE stream on {route} closed");
    })
}

/// Cancels the subscription (if still live) and unregisters the stream when the
/// response stream is dropped, whether it finished or the client disconnected.
struct StreamGuard {
    manager: Arc<Manager>,
    stream_id: StreamId,
    subscription: Subscription,
}

impl Drop for StreamGuard {
    fn drop(&mut self) {
        if !self.subscription.state().is_terminal() {
            debug!(
                "SSE stream {} dropped before completion, cancelling",
                self.stream_id.as_str()
            );
            self.subscription.cancel();
        }
        self.manager.unregister_stream(&self.stream_id);
    }
}

/// Subscriber that encodes each value and forwards it to the response stream.
/// Dropping the sender ends the response.
struct FrameForwarder {
    route: String,
    tx: Option<mpsc::Sender<(Frame, oneshot::Sender<()>)>>,
    subscription: Option<Subscription>,
}

impl FrameForwarder {
    fn stop(&mut self) {
        self.tx = None;
        if let Some(subscription) = self.subscription.as_ref() {
            subscription.cancel();
        }
    }
}

impl<T: Serialize> Subscriber<T> for FrameForwarder {
    fn on_subscribe(&mut self, subscription: &Subscription) {
        debug!("SSE stream on {} subscribed", self.route);
        self.subscription = Some(subscription.clone());
    }

    fn on_next(&mut self, value: T) {
        let Some(tx) = self.tx.as_ref() else {
            return;
        };

        let frame = match Frame::encode(&value) {
            Ok(frame) => frame,
            Err(e) => {
                error!("Failed to serialize SSE frame on {}: {e}", self.route);
                self.stop();
                return;
            }
        };

        // Runs on a blocking-pool thread, so waiting on the writer is fine.
        let (written_tx, written_rx) = oneshot::channel();
        let delivered = tx.blocking_send((frame, written_tx)).is_ok()
            && written_rx.blocking_recv().is_ok();
        if !delivered {
            debug!("SSE client on {} disconnected", self.route);
            self.stop();
        }
    }

    fn on_error(&mut self, error: Error) {
        error!("SSE stream on {} failed: {error}", self.route);
        self.tx = None;
    }

    fn on_complete(&mut self) {
        debug!("SSE stream on {} complete", self.route);
        self.tx = None;
    }
}
