//! httpwire - HTTP/1.1 from raw TCP
//!
//! Incremental request parsing, ordered response writing and a
//! connection-per-task server, without an HTTP library underneath.

pub mod config;
pub mod demo;
pub mod http;
pub mod proxy;
pub mod server;
