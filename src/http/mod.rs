//! HTTP/1.1 protocol implementation.
//!
//! Requests are parsed incrementally from raw bytes and responses are
//! serialized through a writer that enforces framing order. One request is
//! served per connection.
//!
//! # Architecture
//!
//! - **`headers`**: case-insensitive, multi-valued header store with a resumable line parser
//! - **`request`**: request line, request value and parse state
//! - **`parser`**: the request state machine and the stream-reading loop that feeds it
//! - **`response`**: status codes and the default header set
//! - **`writer`**: the response state machine (content-length and chunked bodies, trailers)
//! - **`connection`**: drives one accepted connection from request to close
//! - **`error`**: parse and ordering errors
//!
//! # Request parsing
//!
//! ```text
//!        ┌─────────────┐
//!        │    Init     │ ← Wait for METHOD SP TARGET SP HTTP/1.1 CRLF
//!        └──────┬──────┘
//!               ▼
//!        ┌─────────────┐
//!        │   Headers   │ ← One field line at a time until the blank line
//!        └──────┬──────┘
//!               ├─ Content-Length > 0 ─┐
//!               │                      ▼
//!               │               ┌─────────────┐
//!               │               │    Body     │ ← Exactly Content-Length bytes
//!               │               └──────┬──────┘
//!               ▼                      │
//!        ┌─────────────┐               │
//!        │    Done     │ ◄─────────────┘
//!        └─────────────┘
//! ```
//!
//! # Connection State Machine
//!
//! ```text
//!   Reading ──► Processing ──► Writing ──► Closed
//!      │                          ▲
//!      └── parse error (400) ─────┘
//! ```

pub mod connection;
pub mod error;
pub mod headers;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;
