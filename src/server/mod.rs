//! Connection server: listening socket, accept loop and handler dispatch.

pub mod handler;
pub mod listener;

pub use handler::{Handler, HandlerError, HandlerFn, handler_fn};
pub use listener::{Server, serve};
