use bytes::BytesMut;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::http::error::OrderingError;
use crate::http::headers::Headers;
use crate::http::response::StatusCode;

const HTTP_VERSION: &str = "HTTP/1.1";
const CRLF: &[u8] = b"\r\n";

/// Where a [`ResponseWriter`] is in the response.
///
/// ```text
/// StatusLine → Headers ─┬→ Body ────────────────────────→ Done
///                       ├→ ChunkedBody ─┬───────────────→ Done
///                       │               └→ Trailers ────→ Done
///                       └───────────────────────────────→ Done
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteState {
    StatusLine,
    Headers,
    /// `Content-Length` framing: one body write expected.
    Body,
    /// `Transfer-Encoding: chunked` framing.
    ChunkedBody,
    /// Terminal chunk written, trailer fields expected.
    Trailers,
    Done,
}

/// Serializes one response into an in-memory buffer, enforcing that the
/// status line, headers and body are written in order.
///
/// Every framed write checks the state first and returns an
/// [`OrderingError`] without touching the buffer when called out of turn.
#[derive(Debug)]
pub struct ResponseWriter {
    buffer: BytesMut,
    written: usize,
    state: WriteState,
    trailers_declared: bool,
}

impl Default for ResponseWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseWriter {
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::new(),
            written: 0,
            state: WriteState::StatusLine,
            trailers_declared: false,
        }
    }

    pub fn state(&self) -> WriteState {
        self.state
    }

    /// Everything written so far, including bytes already flushed.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Appends raw bytes regardless of state.
    ///
    /// Does not advance or check the state machine.
    pub fn write(&mut self, bytes: &[u8]) -> usize {
        self.buffer.extend_from_slice(bytes);
        bytes.len()
    }

    /// Writes `HTTP/1.1 <code> <reason>\r\n`.
    pub fn write_status_line(&mut self, status: StatusCode) -> Result<(), OrderingError> {
        self.expect(WriteState::StatusLine, "write_status_line")?;

        let status_line = format!(
            "{} {} {}\r\n",
            HTTP_VERSION,
            status.as_u16(),
            status.reason_phrase()
        );
        self.buffer.extend_from_slice(status_line.as_bytes());

        self.state = WriteState::Headers;
        Ok(())
    }

    /// Writes the header block and picks the body framing.
    ///
    /// `Transfer-Encoding: chunked` selects chunked framing, otherwise a
    /// non-empty `Content-Length` selects a single body write, otherwise the
    /// response has no body and the writer is done.
    pub fn write_headers(&mut self, headers: &Headers) -> Result<(), OrderingError> {
        self.expect(WriteState::Headers, "write_headers")?;

        write_field_block(&mut self.buffer, headers);

        self.state = if is_chunked(headers) {
            self.trailers_declared = headers.contains("trailer");
            WriteState::ChunkedBody
        } else if headers
            .get_first("content-length")
            .is_some_and(|v| !v.is_empty())
        {
            WriteState::Body
        } else {
            WriteState::Done
        };

        Ok(())
    }

    /// Writes the whole `Content-Length` body.
    ///
    /// Matching the declared length is up to the caller.
    pub fn write_body(&mut self, body: &[u8]) -> Result<(), OrderingError> {
        self.expect(WriteState::Body, "write_body")?;

        self.buffer.extend_from_slice(body);
        self.state = WriteState::Done;
        Ok(())
    }

    /// Writes one chunk frame, `<hex len>\r\n<data>\r\n`.
    ///
    /// Empty input writes nothing: a zero-size frame would end the body.
    /// Returns the number of data bytes written.
    pub fn write_chunked_body(&mut self, data: &[u8]) -> Result<usize, OrderingError> {
        self.expect(WriteState::ChunkedBody, "write_chunked_body")?;

        if data.is_empty() {
            return Ok(0);
        }

        self.buffer
            .extend_from_slice(format!("{:x}\r\n", data.len()).as_bytes());
        self.buffer.extend_from_slice(data);
        self.buffer.extend_from_slice(CRLF);
        Ok(data.len())
    }

    /// Ends a chunked body.
    ///
    /// If the headers declared a `Trailer` field only the `0\r\n` terminator
    /// is written and the writer waits for [`write_trailers`]; otherwise the
    /// closing blank line follows and the response is done.
    ///
    /// [`write_trailers`]: ResponseWriter::write_trailers
    pub fn write_chunked_body_done(&mut self) -> Result<(), OrderingError> {
        self.expect(WriteState::ChunkedBody, "write_chunked_body_done")?;

        if self.trailers_declared {
            self.buffer.extend_from_slice(b"0\r\n");
            self.state = WriteState::Trailers;
        } else {
            self.buffer.extend_from_slice(b"0\r\n\r\n");
            self.state = WriteState::Done;
        }
        Ok(())
    }

    /// Writes trailer fields after the terminal chunk, then the final blank line.
    ///
    /// Only valid when the headers declared a `Trailer` field. Without one,
    /// [`write_chunked_body_done`] has already written the closing blank line
    /// and moved to [`WriteState::Done`], so trailers written then would land
    /// after the end of the message; this returns an [`OrderingError`]
    /// instead of accepting them.
    ///
    /// [`write_chunked_body_done`]: ResponseWriter::write_chunked_body_done
    pub fn write_trailers(&mut self, trailers: &Headers) -> Result<(), OrderingError> {
        self.expect(WriteState::Trailers, "write_trailers")?;

        write_field_block(&mut self.buffer, trailers);
        self.state = WriteState::Done;
        Ok(())
    }

    /// Writes any bytes not yet flushed to `stream`.
    pub async fn write_to_stream<W>(&mut self, stream: &mut W) -> std::io::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        while self.written < self.buffer.len() {
            let n = stream.write(&self.buffer[self.written..]).await?;

            if n == 0 {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::WriteZero,
                    "connection closed while writing",
                ));
            }

            self.written += n;
        }

        stream.flush().await
    }

    fn expect(&self, state: WriteState, operation: &'static str) -> Result<(), OrderingError> {
        if self.state == state {
            Ok(())
        } else {
            Err(OrderingError {
                operation,
                state: self.state,
            })
        }
    }
}

/// `name: value\r\n` per value, then the blank line.
fn write_field_block(buf: &mut BytesMut, headers: &Headers) {
    for (name, values) in headers.iter() {
        for value in values {
            buf.extend_from_slice(name.as_bytes());
            buf.extend_from_slice(b": ");
            buf.extend_from_slice(value.as_bytes());
            buf.extend_from_slice(CRLF);
        }
    }

    buf.extend_from_slice(CRLF);
}

fn is_chunked(headers: &Headers) -> bool {
    headers.get("transfer-encoding").is_some_and(|values| {
        values
            .iter()
            .flat_map(|v| v.split(','))
            .any(|coding| coding.trim().eq_ignore_ascii_case("chunked"))
    })
}
