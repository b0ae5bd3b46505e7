use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use domain::error::{
    DomainErrorKind, Error as DomainError, ExternalErrorKind, InternalErrorKind, ItemErrorKind,
    StreamErrorKind,
};
use log::*;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug)]
pub struct Error(DomainError);

impl StdError for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> core::result::Result<(), std::fmt::Error> {
        write!(fmt, "{self:?}")
    }
}

// List of possible StatusCode variants https://docs.rs/http/latest/http/status/struct.StatusCode.html#associatedconstant.UNPROCESSABLE_ENTITY
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self.0.error_kind {
            DomainErrorKind::Internal(internal_error_kind) => match internal_error_kind {
                InternalErrorKind::Item(ItemErrorKind::NotFound) => {
                    debug!("Responding NOT FOUND: {:?}", self.0.source);
                    (StatusCode::NOT_FOUND, "NOT FOUND").into_response()
                }
                InternalErrorKind::Stream(stream_error_kind) => match stream_error_kind {
                    StreamErrorKind::AlreadySubscribed => {
                        warn!("Producer was subscribed to more than once");
                        (StatusCode::CONFLICT, "CONFLICT").into_response()
                    }
                    StreamErrorKind::ProducerFailure => {
                        error!("Producer failed: {:?}", self.0.source);
                        internal_server_error()
                    }
                    StreamErrorKind::Timeout => {
                        warn!("Producer timed out before emitting a value");
                        (StatusCode::GATEWAY_TIMEOUT, "GATEWAY TIMEOUT").into_response()
                    }
                },
                InternalErrorKind::Other(message) => {
                    error!("Internal error: {message}");
                    internal_server_error()
                }
            },
            DomainErrorKind::External(ExternalErrorKind::Session) => {
                error!("Session store failure: {:?}", self.0.source);
                internal_server_error()
            }
        }
    }
}

fn internal_server_error() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL SERVER ERROR").into_response()
}

impl<E> From<E> for Error
where
    E: Into<DomainError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
