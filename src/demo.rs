//! Demo handler served by the `httpwire` binary.
//!
//! - `/yourproblem` answers 400 with an HTML page
//! - `/myproblem` answers 500 with an HTML page
//! - `/httpbin/<path>` relays `<upstream>/<path>` as a chunked body with
//!   `X-Content-SHA256` and `X-Content-Length` trailers
//! - anything else answers 200 with an HTML page

use std::future::Future;

use sha2::{Digest, Sha256};

use crate::http::error::OrderingError;
use crate::http::headers::Headers;
use crate::http::request::Request;
use crate::http::response::{StatusCode, default_headers};
use crate::http::writer::ResponseWriter;
use crate::proxy::upstream::{Upstream, UpstreamResponse};
use crate::server::handler::{Handler, HandlerError};

const RELAY_PREFIX: &str = "/httpbin/";

const OK_PAGE: &str = "<html>\n  <head>\n    <title>200 OK</title>\n  </head>\n  <body>\n    <h1>Success!</h1>\n    <p>Your request was an absolute banger.</p>\n  </body>\n</html>\n";
const BAD_REQUEST_PAGE: &str = "<html>\n  <head>\n    <title>400 Bad Request</title>\n  </head>\n  <body>\n    <h1>Bad Request</h1>\n    <p>Your request honestly kinda sucked.</p>\n  </body>\n</html>\n";
const SERVER_ERROR_PAGE: &str = "<html>\n  <head>\n    <title>500 Internal Server Error</title>\n  </head>\n  <body>\n    <h1>Internal Server Error</h1>\n    <p>Okay, you know what? This one is on me.</p>\n  </body>\n</html>\n";

#[derive(Debug, Clone)]
pub struct DemoHandler {
    upstream: Upstream,
}

impl DemoHandler {
    pub fn new(upstream: Upstream) -> Self {
        Self { upstream }
    }

    async fn respond(&self, w: &mut ResponseWriter, req: &Request) -> Result<(), OrderingError> {
        let target = req.target();

        if target == "/yourproblem" {
            return write_html(w, StatusCode::BadRequest, BAD_REQUEST_PAGE);
        }
        if target == "/myproblem" {
            return write_html(w, StatusCode::InternalServerError, SERVER_ERROR_PAGE);
        }

        let Some(path) = target.strip_prefix(RELAY_PREFIX) else {
            return write_html(w, StatusCode::Ok, OK_PAGE);
        };

        match self.upstream.get(path).await {
            Ok(upstream) => relay_chunked(w, upstream).await,
            Err(e) => {
                tracing::warn!(error = %e, path, "Upstream request failed");
                write_html(w, StatusCode::InternalServerError, SERVER_ERROR_PAGE)
            }
        }
    }
}

impl Handler for DemoHandler {
    fn handle<'a>(
        &'a self,
        writer: &'a mut ResponseWriter,
        request: &'a Request,
    ) -> impl Future<Output = Option<HandlerError>> + Send + 'a {
        async move {
            // An ordering error means the writer was misdriven above.
            self.respond(writer, request).await.err().map(|e| {
                HandlerError::new(StatusCode::InternalServerError, e.to_string())
            })
        }
    }
}

fn write_html(w: &mut ResponseWriter, status: StatusCode, page: &str) -> Result<(), OrderingError> {
    let mut headers = default_headers(page.len());
    headers.set_static("content-type", "text/html");

    w.write_status_line(status)?;
    w.write_headers(&headers)?;
    w.write_body(page.as_bytes())
}

/// Streams the upstream body as chunks, then trails it with its digest and
/// length.
async fn relay_chunked(w: &mut ResponseWriter, mut upstream: UpstreamResponse) -> Result<(), OrderingError> {
    let mut headers = default_headers(0);
    headers.remove("content-length");
    headers.set_static("transfer-encoding", "chunked");
    headers.set_static("trailer", "X-Content-SHA256, X-Content-Length");

    w.write_status_line(StatusCode::Ok)?;
    w.write_headers(&headers)?;

    let mut hasher = Sha256::new();
    let mut total = 0usize;

    loop {
        match upstream.next_chunk().await {
            Ok(Some(chunk)) => {
                hasher.update(&chunk);
                total += w.write_chunked_body(&chunk)?;
            }
            Ok(None) => break,
            Err(e) => {
                // Headers are already out; end the body with what we have.
                tracing::warn!(error = %e, relayed = total, "Upstream body interrupted");
                break;
            }
        }
    }

    w.write_chunked_body_done()?;

    let mut trailers = Headers::new();
    trailers.set_static("x-content-sha256", format!("{:x}", hasher.finalize()));
    trailers.set_static("x-content-length", total.to_string());
    w.write_trailers(&trailers)
}
