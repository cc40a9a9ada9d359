//! The boundary between the connection task and application code.

use std::future::{Future, ready};

use thiserror::Error;

use crate::http::error::OrderingError;
use crate::http::request::Request;
use crate::http::response::{StatusCode, default_headers};
use crate::http::writer::ResponseWriter;

/// An error descriptor returned by a handler instead of writing a response.
///
/// The connection renders it as a plain-text response whose body is the
/// message followed by a newline. A handler returning one must not have
/// written anything to its writer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{status}: {message}")]
pub struct HandlerError {
    pub status: StatusCode,
    pub message: String,
}

impl HandlerError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// The response sent for requests that fail to parse.
    pub fn bad_request() -> Self {
        Self::new(StatusCode::BadRequest, "Bad Request")
    }

    /// Writes the status line, default headers and `"<message>\n"` body.
    pub fn write_to(&self, writer: &mut ResponseWriter) -> Result<(), OrderingError> {
        let body = format!("{}\n", self.message);

        writer.write_status_line(self.status)?;
        writer.write_headers(&default_headers(body.len()))?;
        writer.write_body(body.as_bytes())
    }
}

/// Application code invoked once per parsed request.
///
/// Returning `None` means the handler drove `writer` through a complete
/// response itself. Returning `Some` asks the connection to send the error
/// response instead.
pub trait Handler: Send + Sync + 'static {
    fn handle<'a>(
        &'a self,
        writer: &'a mut ResponseWriter,
        request: &'a Request,
    ) -> impl Future<Output = Option<HandlerError>> + Send + 'a;
}

/// A [`Handler`] backed by a synchronous closure. See [`handler_fn`].
#[derive(Debug, Clone, Copy)]
pub struct HandlerFn<F> {
    f: F,
}

/// Wraps a closure as a [`Handler`].
///
/// ```
/// use httpwire::http::response::{StatusCode, default_headers};
/// use httpwire::server::handler::{HandlerError, handler_fn};
///
/// let hello = handler_fn(|w, _req| {
///     let body = b"hello\n";
///     w.write_status_line(StatusCode::Ok)
///         .and_then(|_| w.write_headers(&default_headers(body.len())))
///         .and_then(|_| w.write_body(body))
///         .err()
///         .map(|e| HandlerError::new(StatusCode::InternalServerError, e.to_string()))
/// });
/// # let _ = hello;
/// ```
pub fn handler_fn<F>(f: F) -> HandlerFn<F>
where
    F: Fn(&mut ResponseWriter, &Request) -> Option<HandlerError> + Send + Sync + 'static,
{
    HandlerFn { f }
}

impl<F> Handler for HandlerFn<F>
where
    F: Fn(&mut ResponseWriter, &Request) -> Option<HandlerError> + Send + Sync + 'static,
{
    fn handle<'a>(
        &'a self,
        writer: &'a mut ResponseWriter,
        request: &'a Request,
    ) -> impl Future<Output = Option<HandlerError>> + Send + 'a {
        ready((self.f)(writer, request))
    }
}
