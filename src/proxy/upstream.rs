//! Upstream connection and response relaying
//!
//! Fetches a resource from a plain-HTTP upstream and exposes its body as a
//! sequence of byte chunks so it can be re-framed on the way out.

use anyhow::{Context, Result};
use bytes::{Bytes, BytesMut};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use url::Url;

/// Largest chunk handed out by [`UpstreamResponse::next_chunk`].
pub const CHUNK_SIZE: usize = 1024;

/// Cap on the upstream status line plus headers.
const MAX_HEAD_SIZE: usize = 64 * 1024;

/// Client for a single upstream base URL.
#[derive(Debug, Clone)]
pub struct Upstream {
    base: Url,
    connection_timeout: Duration,
    request_timeout: Duration,
}

/// An upstream response whose head has been read and whose body is still
/// on the socket.
#[derive(Debug)]
pub struct UpstreamResponse {
    /// Numeric status from the upstream status line.
    pub status: u16,
    stream: TcpStream,
    buffered: BytesMut,
    request_timeout: Duration,
}

impl Upstream {
    /// Create a client for `base`. Only `http` URLs are supported.
    pub fn new(base: &str, connection_timeout: Duration, request_timeout: Duration) -> Result<Self> {
        let base = Url::parse(base).context("Invalid upstream URL")?;

        if base.scheme() != "http" {
            anyhow::bail!("Unsupported upstream scheme: {}", base.scheme());
        }
        base.host_str().context("Upstream URL missing host")?;

        Ok(Self {
            base,
            connection_timeout,
            request_timeout,
        })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Connect, send `GET <path>` and read the response head.
    pub async fn get(&self, path: &str) -> Result<UpstreamResponse> {
        let host = self.base.host_str().context("Upstream URL missing host")?;
        let port = self.base.port_or_known_default().unwrap_or(80);
        let addr = format!("{}:{}", host, port);

        let mut stream = timeout(self.connection_timeout, TcpStream::connect(&addr))
            .await
            .context("Connection timeout")?
            .context("Failed to connect to upstream")?;

        tracing::trace!(upstream = %addr, "Connected to upstream");

        let request_bytes = self.build_http_request(path);
        let (status, buffered) = timeout(
            self.request_timeout,
            send_request_and_read_head(&mut stream, &request_bytes),
        )
        .await
        .context("Request timeout")??;

        tracing::debug!(upstream = %addr, path, status, "Upstream responded");

        Ok(UpstreamResponse {
            status,
            stream,
            buffered,
            request_timeout: self.request_timeout,
        })
    }

    /// Build the request bytes for `path`, relative to the base URL's path.
    ///
    /// The request is sent as HTTP/1.0 with `Connection: close`, so the
    /// upstream delimits the body by closing the connection rather than
    /// chunking it.
    pub fn build_http_request(&self, path: &str) -> Vec<u8> {
        let base_path = self.base.path().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        let target = format!("{}/{}", base_path, path);

        let host = match (self.base.host_str(), self.base.port()) {
            (Some(host), Some(port)) => format!("{}:{}", host, port),
            (Some(host), None) => host.to_string(),
            (None, _) => String::new(),
        };

        format!(
            "GET {} HTTP/1.0\r\nHost: {}\r\nConnection: close\r\nAccept: */*\r\n\r\n",
            target, host
        )
        .into_bytes()
    }
}

impl UpstreamResponse {
    /// The next piece of the body, or `None` once the upstream has closed.
    pub async fn next_chunk(&mut self) -> Result<Option<Bytes>> {
        if !self.buffered.is_empty() {
            let take = self.buffered.len().min(CHUNK_SIZE);
            return Ok(Some(self.buffered.split_to(take).freeze()));
        }

        let mut buf = BytesMut::with_capacity(CHUNK_SIZE);
        let n = timeout(self.request_timeout, self.stream.read_buf(&mut buf))
            .await
            .context("Upstream body timeout")??;

        if n == 0 {
            return Ok(None);
        }

        Ok(Some(buf.freeze()))
    }
}

async fn send_request_and_read_head(stream: &mut TcpStream, request: &[u8]) -> Result<(u16, BytesMut)> {
    stream.write_all(request).await?;
    stream.flush().await?;

    tracing::trace!("Request sent to upstream");

    read_response_head(stream).await
}

/// Read up to the blank line ending the head. Returns the status code and
/// any body bytes read past it.
async fn read_response_head(stream: &mut TcpStream) -> Result<(u16, BytesMut)> {
    let mut buffer = BytesMut::with_capacity(CHUNK_SIZE);

    loop {
        if let Some(headers_end) = buffer
            .windows(4)
            .position(|window| window == b"\r\n\r\n")
        {
            let head = buffer.split_to(headers_end + 4);
            let status = parse_status_line(&head)?;
            return Ok((status, buffer));
        }

        // Prevent unbounded header growth
        if buffer.len() > MAX_HEAD_SIZE {
            anyhow::bail!("Upstream response headers too large");
        }

        let n = stream.read_buf(&mut buffer).await?;
        if n == 0 {
            anyhow::bail!("Connection closed before complete response received");
        }
    }
}

fn parse_status_line(head: &[u8]) -> Result<u16> {
    let head = std::str::from_utf8(head).context("Invalid UTF-8 in response headers")?;
    let status_line = head.lines().next().context("Empty response")?;
    let parts: Vec<&str> = status_line.splitn(3, ' ').collect();

    if parts.len() < 2 || !parts[0].starts_with("HTTP/") {
        anyhow::bail!("Invalid status line: {}", status_line);
    }

    parts[1].parse().context("Invalid status code")
}
