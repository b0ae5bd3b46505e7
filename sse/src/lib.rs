//! Server-Sent Events (SSE) transport for multi-value producers.
//!
//! This crate turns a [`reactive::MultiValue`] into the body of a long-lived
//! `text/event-stream` response, writing one frame per emitted value as soon as
//! it is produced rather than after the whole sequence is computed.
//!
//! # Architecture
//!
//! - **One subscription per request**: every response subscribes to its own
//!   producer; nothing is shared between streams except what the producer reads.
//! - **Production off the request path**: producers are driven on the tokio
//!   blocking pool, so slow or sleeping sources never stall request handling.
//! - **Cancellation on disconnect**: dropping the response stream cancels the
//!   subscription; the producer stops before pulling its next item.
//! - **Idle timeout**: a stream that produces nothing for the configured period
//!   is cancelled and closed.
//! - **Stream registry**: open streams are tracked so the server can report and
//!   cancel them (e.g. on shutdown).
//!
//! # Example
//!
//! ```rust,ignore
//! use axum::response::sse::{KeepAlive, Sse};
//!
//! let people = domain::person::stream_range(&store, 1..=9);
//! let events = sse::stream::event_stream(&manager, "/person/sse", people, idle_timeout)?;
//! Sse::new(events).keep_alive(KeepAlive::default())
//! ```
//!
//! # Modules
//!
//! - `connection`: StreamRegistry and type-safe StreamId
//! - `manager`: High-level stream bookkeeping (delegates to StreamRegistry)
//! - `message`: Frame encoding
//! - `stream`: MultiValue to event stream bridge

pub mod connection;
pub mod manager;
pub mod message;
pub mod stream;

pub use manager::Manager;
