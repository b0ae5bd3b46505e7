//! Error types for the `domain` layer.
use reactive::{Error as ReactiveError, ErrorKind as ReactiveErrorKind};
use std::error::Error as StdError;
use std::fmt;

/// Top-level domain error type.
/// Errors in the Domain layer are modeled as a tree structure
/// with `domain::error::Error` as the root type holding a tree of `error_kind`
/// enums that represent the kinds of errors that can occur in the domain layer or
/// in lower layers. The `source` field is used to hold the original error that caused
/// the domain error. `web` depends on `domain` but not on `reactive` error kinds, so
/// producer failures are translated here and `web` maps the resulting kinds to HTTP
/// status codes.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: DomainErrorKind,
}

/// Enum representing the major categories of errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum DomainErrorKind {
    Internal(InternalErrorKind),
    External(ExternalErrorKind),
}

/// Enum representing the various kinds of internal errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum InternalErrorKind {
    Item(ItemErrorKind),
    Stream(StreamErrorKind),
    Other(String),
}

/// Errors raised by the item store.
#[derive(Debug, PartialEq)]
pub enum ItemErrorKind {
    NotFound,
}

/// Errors raised while subscribing to or draining a producer. A client that
/// disconnects is not an error: its subscription is cancelled and nothing is
/// reported.
#[derive(Debug, PartialEq)]
pub enum StreamErrorKind {
    AlreadySubscribed,
    ProducerFailure,
    Timeout,
}

/// Enum representing the various kinds of external errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum ExternalErrorKind {
    Session,
}

impl Error {
    pub fn not_found(key: i32) -> Self {
        Error {
            source: Some(format!("no person with key {key}").into()),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Item(ItemErrorKind::NotFound)),
        }
    }

    /// A single-value producer completed without emitting anything.
    pub fn no_value() -> Self {
        Error {
            source: Some("producer completed without a value".into()),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Item(ItemErrorKind::NotFound)),
        }
    }

    pub fn stream(kind: StreamErrorKind) -> Self {
        Error {
            source: None,
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Stream(kind)),
        }
    }

    /// Wraps a failure of the session store collaborator.
    pub fn session<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Error {
            source: Some(Box::new(err)),
            error_kind: DomainErrorKind::External(ExternalErrorKind::Session),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Domain Error: {self:?}")
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

// This is where we translate errors from the `reactive` layer to the `domain` layer.
// A producer failure whose source is itself a domain error (e.g. NotFound raised by
// a build function) is unwrapped so its kind survives the trip through the producer.
impl From<ReactiveError> for Error {
    fn from(err: ReactiveError) -> Self {
        let stream_error_kind = match err.error_kind {
            ReactiveErrorKind::AlreadySubscribed => StreamErrorKind::AlreadySubscribed,
            ReactiveErrorKind::ProducerFailure => StreamErrorKind::ProducerFailure,
            ReactiveErrorKind::InvalidTransition { .. } => {
                return Error {
                    error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(
                        err.to_string(),
                    )),
                    source: Some(Box::new(err)),
                };
            }
        };

        if stream_error_kind == StreamErrorKind::ProducerFailure {
            if let Some(source) = err.source {
                return match source.downcast::<Error>() {
                    Ok(domain_error) => *domain_error,
                    Err(source) => Error {
                        source: Some(source),
                        error_kind: DomainErrorKind::Internal(InternalErrorKind::Stream(
                            StreamErrorKind::ProducerFailure,
                        )),
                    },
                };
            }
        }

        Error {
            source: Some(Box::new(err)),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Stream(stream_error_kind)),
        }
    }
}
