//! Error types for the `reactive` layer.
use std::any::Any;
use std::error::Error as StdError;
use std::fmt;

use crate::lifecycle::{Signal, State};

/// Any error a build function or source may fail with.
pub type BoxError = Box<dyn StdError + Send + Sync>;

/// Errors raised while subscribing to or driving a producer.
/// The `source` field holds the original failure (for example the error a build
/// function returned) so that outer layers can recover their own error kinds from it.
#[derive(Debug)]
pub struct Error {
    pub source: Option<BoxError>,
    pub error_kind: ErrorKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    // A second subscription on a single-consumer producer
    AlreadySubscribed,
    // Fault raised while building or emitting a value
    ProducerFailure,
    // Lifecycle signal not allowed in the current state
    InvalidTransition { from: State, signal: Signal },
}

impl Error {
    pub fn already_subscribed() -> Self {
        Error {
            source: None,
            error_kind: ErrorKind::AlreadySubscribed,
        }
    }

    pub fn producer<E: Into<BoxError>>(err: E) -> Self {
        Error {
            source: Some(err.into()),
            error_kind: ErrorKind::ProducerFailure,
        }
    }

    pub(crate) fn invalid_transition(from: State, signal: Signal) -> Self {
        Error {
            source: None,
            error_kind: ErrorKind::InvalidTransition { from, signal },
        }
    }

    /// Converts a caught panic payload into a producer failure.
    pub(crate) fn panicked(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(message) = payload.downcast_ref::<&str>() {
            (*message).to_string()
        } else if let Some(message) = payload.downcast_ref::<String>() {
            message.clone()
        } else {
            "producer panicked".to_string()
        };
        Self::producer(message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.error_kind
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.error_kind {
            ErrorKind::AlreadySubscribed => write!(f, "producer already subscribed"),
            ErrorKind::ProducerFailure => match &self.source {
                Some(source) => write!(f, "producer failure: {source}"),
                None => write!(f, "producer failure"),
            },
            ErrorKind::InvalidTransition { from, signal } => {
                write!(f, "invalid lifecycle transition: {signal} while {from}")
            }
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}
