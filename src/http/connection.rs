use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

use crate::http::headers::Headers;
use crate::http::parser::read_request;
use crate::http::request::Request;
use crate::http::writer::{ResponseWriter, WriteState};
use crate::server::handler::{Handler, HandlerError};

/// Drives one accepted connection through exactly one request and response.
///
/// The connection owns its parser state and writer outright; nothing here is
/// shared with other connections except the handler.
pub struct Connection<S, H> {
    stream: S,
    handler: Arc<H>,
    state: ConnectionState,
}

pub enum ConnectionState {
    Reading,
    Processing(Request),
    Writing(ResponseWriter),
    Closed,
}

impl<S, H> Connection<S, H>
where
    S: AsyncRead + AsyncWrite + Unpin,
    H: Handler,
{
    pub fn new(stream: S, handler: Arc<H>) -> Self {
        Self {
            stream,
            handler,
            state: ConnectionState::Reading,
        }
    }

    /// Reads the request, dispatches it, flushes the response and closes.
    ///
    /// A request that fails to parse is answered with `400 Bad Request`.
    /// The stream is always shut down afterwards; there is no keep-alive.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        loop {
            match std::mem::replace(&mut self.state, ConnectionState::Closed) {
                ConnectionState::Reading => {
                    self.state = match read_request(&mut self.stream).await {
                        Ok(req) => ConnectionState::Processing(req),
                        Err(e) => {
                            tracing::debug!(error = %e, "Rejecting request");
                            ConnectionState::Writing(error_response(&HandlerError::bad_request()))
                        }
                    };
                }

                ConnectionState::Processing(req) => {
                    let writer = self.dispatch(&req).await;
                    self.state = ConnectionState::Writing(writer);
                }

                ConnectionState::Writing(mut writer) => {
                    writer.write_to_stream(&mut self.stream).await?;
                }

                ConnectionState::Closed => {
                    if let Err(e) = self.stream.shutdown().await {
                        tracing::trace!(error = %e, "Shutdown after response failed");
                    }
                    break;
                }
            }
        }

        Ok(())
    }

    async fn dispatch(&self, req: &Request) -> ResponseWriter {
        let mut writer = ResponseWriter::new();

        match self.handler.handle(&mut writer, req).await {
            Some(err) => {
                tracing::debug!(
                    method = req.method(),
                    target = req.target(),
                    status = err.status.as_u16(),
                    "Handler returned an error"
                );
                error_response(&err)
            }
            None => {
                // Close a trailer section the handler left open.
                if writer.state() == WriteState::Trailers {
                    if let Err(e) = writer.write_trailers(&Headers::new()) {
                        tracing::error!(error = %e, "Failed to finish trailer section");
                    }
                }

                tracing::debug!(
                    method = req.method(),
                    target = req.target(),
                    state = ?writer.state(),
                    "Request handled"
                );
                writer
            }
        }
    }
}

/// A fresh writer holding the response for `err`.
///
/// Anything the handler wrote to its own writer is discarded.
fn error_response(err: &HandlerError) -> ResponseWriter {
    let mut writer = ResponseWriter::new();

    if let Err(e) = err.write_to(&mut writer) {
        tracing::error!(error = %e, "Failed to render error response");
    }

    writer
}
