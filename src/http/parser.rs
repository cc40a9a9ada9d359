use bytes::{Buf, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::http::error::ParseError;
use crate::http::headers::find_crlf;
use crate::http::request::{ParseState, Request, RequestLine};

const CRLF_LEN: usize = 2;
const READ_BUFFER_SIZE: usize = 4096;
const SUPPORTED_VERSION: &str = "1.1";

impl Request {
    /// Feeds buffered bytes into the request state machine.
    ///
    /// Returns how many bytes of `data` were consumed. The caller drops
    /// exactly that many bytes from the front of its buffer and calls again
    /// once more bytes have arrived. A single call advances through as many
    /// states as `data` allows. Once `Done`, every call consumes nothing.
    pub fn parse(&mut self, data: &[u8]) -> Result<usize, ParseError> {
        let mut consumed = 0;

        loop {
            let n = self.parse_step(&data[consumed..])?;
            if n == 0 {
                return Ok(consumed);
            }
            consumed += n;
        }
    }

    /// Runs the current state once. Returns 0 when it needs more data.
    fn parse_step(&mut self, data: &[u8]) -> Result<usize, ParseError> {
        match self.state {
            ParseState::Init => {
                let Some((request_line, n)) = parse_request_line(data)? else {
                    return Ok(0);
                };

                self.request_line = request_line;
                self.state = ParseState::Headers;
                Ok(n)
            }

            ParseState::Headers => {
                let (n, done) = self.headers.parse(data)?;

                if done {
                    self.state = if self.declared_length() > 0 {
                        ParseState::Body
                    } else {
                        ParseState::Done
                    };
                }

                Ok(n)
            }

            ParseState::Body => {
                let declared = self.declared_length();

                // The declared length is a hard cap.
                if self.body.len() > declared {
                    return Err(ParseError::IncompleteRequest);
                }

                let take = data.len().min(declared - self.body.len());
                self.body.extend_from_slice(&data[..take]);

                if self.body.len() == declared {
                    self.state = ParseState::Done;
                }

                Ok(take)
            }

            ParseState::Done => Ok(0),
        }
    }

    fn declared_length(&self) -> usize {
        self.headers
            .get_first("content-length")
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(0)
    }
}

/// Parses `METHOD SP TARGET SP HTTP/1.1 CRLF`.
///
/// Returns `Ok(None)` when no full line is buffered yet.
fn parse_request_line(buf: &[u8]) -> Result<Option<(RequestLine, usize)>, ParseError> {
    let Some(end) = find_crlf(buf) else {
        return Ok(None);
    };

    let line = std::str::from_utf8(&buf[..end]).map_err(|_| ParseError::MalformedRequestLine)?;

    let parts: Vec<&str> = line.split(' ').collect();
    let [method, target, version] = parts.as_slice() else {
        return Err(ParseError::MalformedRequestLine);
    };

    if method.is_empty() || target.is_empty() {
        return Err(ParseError::MalformedRequestLine);
    }

    match version.split_once('/') {
        Some(("HTTP", SUPPORTED_VERSION)) => {}
        _ => return Err(ParseError::UnsupportedHttpVersion),
    }

    let request_line = RequestLine {
        method: method.to_string(),
        target: target.to_string(),
        version: SUPPORTED_VERSION.to_string(),
    };

    Ok(Some((request_line, end + CRLF_LEN)))
}

/// Reads one complete request from `reader`.
///
/// Bytes are fed to the parser as they arrive; a read is only issued when
/// the buffered bytes cannot complete the request. Reaching end of stream
/// before the request is `Done` fails with `IncompleteRequest`. Bytes past
/// the end of the request are discarded.
pub async fn read_request<R>(reader: &mut R) -> Result<Request, ParseError>
where
    R: AsyncRead + Unpin,
{
    let mut request = Request::new();
    let mut buffer = BytesMut::with_capacity(READ_BUFFER_SIZE);

    loop {
        if !buffer.is_empty() {
            let consumed = request.parse(&buffer)?;
            buffer.advance(consumed);
        }

        if request.is_done() {
            return Ok(request);
        }

        buffer.reserve(READ_BUFFER_SIZE);
        let n = reader.read_buf(&mut buffer).await?;

        if n == 0 {
            tracing::debug!(
                state = ?request.state,
                buffered = buffer.len(),
                "Stream ended before request was complete"
            );
            return Err(ParseError::IncompleteRequest);
        }
    }
}
