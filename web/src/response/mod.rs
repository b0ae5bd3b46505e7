//! Adapters that turn producers into HTTP responses.
//!
//! Multi-value producers are streamed by the `sse` crate; this module holds
//! the single-value side.

pub(crate) mod single;
