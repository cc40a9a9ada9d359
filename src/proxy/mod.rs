//! Upstream fetching for handlers that relay another server's response.

pub mod upstream;

pub use upstream::{Upstream, UpstreamResponse};
