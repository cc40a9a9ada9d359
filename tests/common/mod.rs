//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, ReadBuf};

/// Reader that hands out at most `chunk_size` bytes per read, then EOF.
pub struct ChunkReader {
    data: Vec<u8>,
    chunk_size: usize,
    pos: usize,
}

impl ChunkReader {
    pub fn new(data: impl Into<Vec<u8>>, chunk_size: usize) -> Self {
        Self {
            data: data.into(),
            chunk_size,
            pos: 0,
        }
    }
}

impl AsyncRead for ChunkReader {
    fn poll_read(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let start = self.pos;
        let n = (self.data.len() - start)
            .min(self.chunk_size)
            .min(buf.remaining());

        buf.put_slice(&self.data[start..start + n]);
        self.pos += n;

        Poll::Ready(Ok(()))
    }
}

/// Splits a serialized response into its head (status line and headers,
/// without the blank line) and everything after it.
pub fn split_head(response: &[u8]) -> (String, Vec<u8>) {
    let end = response
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .expect("response has no blank line");

    (
        String::from_utf8(response[..end].to_vec()).unwrap(),
        response[end + 4..].to_vec(),
    )
}

/// Decodes a chunked body. Returns the data and the raw trailer section
/// (the bytes after the `0\r\n` terminator).
pub fn dechunk(mut body: &[u8]) -> (Vec<u8>, String) {
    let mut data = Vec::new();

    loop {
        let line_end = body
            .windows(2)
            .position(|w| w == b"\r\n")
            .expect("chunk size line");
        let size_line = std::str::from_utf8(&body[..line_end]).unwrap();
        let size = usize::from_str_radix(size_line, 16).expect("hex chunk size");
        body = &body[line_end + 2..];

        if size == 0 {
            return (data, String::from_utf8(body.to_vec()).unwrap());
        }

        data.extend_from_slice(&body[..size]);
        assert_eq!(&body[size..size + 2], b"\r\n", "chunk data must end in CRLF");
        body = &body[size + 2..];
    }
}
