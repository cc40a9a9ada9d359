//! Protocol errors raised while parsing requests and writing responses.

use thiserror::Error;

use crate::http::writer::WriteState;

/// Errors produced while turning raw bytes into a [`Request`](crate::http::request::Request).
///
/// Any of these aborts parsing for the connection; nothing is retried.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The request line does not split into exactly three non-empty tokens.
    #[error("malformed request line")]
    MalformedRequestLine,

    /// The version token is anything other than `HTTP/1.1`.
    #[error("unsupported HTTP version")]
    UnsupportedHttpVersion,

    /// A header line has no colon, or its name is empty after trimming.
    #[error("no field name: malformed header line")]
    NoFieldName,

    /// A header name contains a character outside the RFC 7230 token set.
    #[error("invalid field name")]
    InvalidFieldName,

    /// The stream ended before the request was complete, or the body ran past
    /// its declared `Content-Length`.
    #[error("incomplete request")]
    IncompleteRequest,

    #[error("failed to read request: {0}")]
    Io(#[from] std::io::Error),
}

/// A [`ResponseWriter`](crate::http::writer::ResponseWriter) method was called
/// outside the state that permits it. No bytes were emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid order of writing response: {operation} called in state {state:?}")]
pub struct OrderingError {
    /// Name of the rejected write operation.
    pub operation: &'static str,
    /// State the writer was in when the call was rejected.
    pub state: WriteState,
}
