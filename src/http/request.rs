use crate::http::error::ParseError;
use crate::http::headers::Headers;

/// The first line of a request: `METHOD SP TARGET SP HTTP/1.1`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestLine {
    /// The request method token (e.g. "GET"). Not validated against a list.
    pub method: String,
    /// The request target exactly as sent (e.g. "/search?q=rust").
    pub target: String,
    /// The version identifier without the `HTTP/` prefix; always "1.1".
    pub version: String,
}

/// Progress of a request through the parser.
///
/// Only ever advances: `Init` → `Headers` → (`Body` →) `Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum ParseState {
    /// Waiting for the request line.
    #[default]
    Init,
    /// Request line read, consuming header lines.
    Headers,
    /// Headers complete, collecting `Content-Length` bytes of body.
    Body,
    /// The request is complete.
    Done,
}

/// A request being read from, or fully read from, a connection.
///
/// Owned by the connection task that parses it.
#[derive(Debug, Clone, Default)]
pub struct Request {
    pub request_line: RequestLine,
    pub headers: Headers,
    /// Request body, exactly `Content-Length` bytes once `Done`.
    pub body: Vec<u8>,
    pub state: ParseState,
}

impl Request {
    /// An empty request in the `Init` state, ready to be fed bytes.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_done(&self) -> bool {
        self.state == ParseState::Done
    }

    pub fn method(&self) -> &str {
        &self.request_line.method
    }

    pub fn target(&self) -> &str {
        &self.request_line.target
    }

    /// Retrieves the first value of a header (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get_first(name)
    }

    /// Retrieves the Content-Length header value and parses it as a usize.
    ///
    /// Returns 0 if the header is missing or not a valid number.
    pub fn content_length(&self) -> usize {
        self.header("content-length")
            .and_then(|v| v.parse().ok())
            .unwrap_or(0)
    }
}

/// Builder for already-complete requests, for handlers and tests that need a
/// [`Request`] without going through the wire.
#[derive(Debug, Default)]
pub struct RequestBuilder {
    method: Option<String>,
    target: Option<String>,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Builds a request in the `Done` state.
    ///
    /// Fails with `MalformedRequestLine` if the method or target is missing
    /// or empty, and with the header errors for invalid header names.
    pub fn build(self) -> Result<Request, ParseError> {
        let method = self
            .method
            .filter(|m| !m.is_empty())
            .ok_or(ParseError::MalformedRequestLine)?;
        let target = self
            .target
            .filter(|t| !t.is_empty())
            .ok_or(ParseError::MalformedRequestLine)?;

        let mut headers = Headers::new();
        for (name, value) in self.headers {
            headers.append(&name, value)?;
        }

        Ok(Request {
            request_line: RequestLine {
                method,
                target,
                version: "1.1".to_string(),
            },
            headers,
            body: self.body,
            state: ParseState::Done,
        })
    }
}
