/*
 * connection.rs
 * Copyright (C) 2026 Chris Burdess
 *
 * This file is part of Httpcall, an HTTP request library for embedding hosts.
 *
 * Httpcall is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Httpcall is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Httpcall.  If not, see <http://www.gnu.org/licenses/>.
 */

//! HTTP connection: one TCP or TLS stream, drives the H1 parser, invokes ResponseHandler.
//! Every wait on the network is interleaved with progress ticks so a handler can stop it.

use bytes::BytesMut;
use std::future::Future;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, ReadBuf};
use tokio::net::TcpStream;
use tokio_rustls::client::TlsStream as TokioTlsStream;

use crate::headers::HeaderCollection;
use crate::protocol::http::h1::{H1ResponseHandler, ParseState, ResponseParser};
use crate::protocol::http::handler::{BodyAction, ResponseHandler};
use crate::protocol::http::request::RequestBuilder;
use crate::transport::{Progress, TransportError};

/// Unified stream: plain TCP or TLS. Implements AsyncRead + AsyncWrite.
pub enum HttpStream {
    Plain(TcpStream),
    Tls(TokioTlsStream<TcpStream>),
}

impl AsyncRead for HttpStream {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match &mut *self {
            HttpStream::Plain(s) => Pin::new(s).poll_read(cx, buf),
            HttpStream::Tls(s) => Pin::new(s).poll_read(cx, buf),
        }
    }
}

impl AsyncWrite for HttpStream {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match &mut *self {
            HttpStream::Plain(s) => Pin::new(s).poll_write(cx, buf),
            HttpStream::Tls(s) => Pin::new(s).poll_write(cx, buf),
        }
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match &mut *self {
            HttpStream::Plain(s) => Pin::new(s).poll_flush(cx),
            HttpStream::Tls(s) => Pin::new(s).poll_flush(cx),
        }
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match &mut *self {
            HttpStream::Plain(s) => Pin::new(s).poll_shutdown(cx),
            HttpStream::Tls(s) => Pin::new(s).poll_shutdown(cx),
        }
    }
}

/// Drive `fut` to completion, calling `progress` every `interval` while it is pending.
/// An `Abort` answer drops the future and yields `TransportError::Aborted`.
pub async fn with_progress<F, P>(
    fut: F,
    interval: Duration,
    mut progress: P,
) -> Result<F::Output, TransportError>
where
    F: Future,
    P: FnMut() -> Progress,
{
    tokio::pin!(fut);
    loop {
        tokio::select! {
            out = &mut fut => return Ok(out),
            _ = tokio::time::sleep(interval) => {
                if progress() == Progress::Abort {
                    return Err(TransportError::Aborted);
                }
            }
        }
    }
}

/// Bridges H1 parser callbacks to the framing headers and the caller's ResponseHandler.
struct H1Driver<'a> {
    status: &'a mut Option<u16>,
    headers: &'a mut HeaderCollection,
    /// The line following `status` is the status line; keep it out of the framing view.
    status_line_pending: bool,
    handler: &'a mut dyn ResponseHandler,
}

impl H1ResponseHandler for H1Driver<'_> {
    fn status(&mut self, code: u16) {
        *self.status = Some(code);
        self.status_line_pending = true;
        self.handler.status(code);
    }

    fn header_line(&mut self, line: &[u8]) {
        if self.status_line_pending {
            self.status_line_pending = false;
        } else {
            self.headers.fold_line(line);
        }
        self.handler.header_line(line);
    }

    fn body_chunk(&mut self, data: &[u8]) -> Progress {
        self.handler.body_chunk(data)
    }
}

/// Responses that never carry a body regardless of their framing headers.
fn bodiless(method: &str, code: u16) -> bool {
    method.eq_ignore_ascii_case("HEAD") || code == 204 || code == 304 || (100..200).contains(&code)
}

fn body_mode(headers: &HeaderCollection) -> Result<(Option<u64>, bool), TransportError> {
    let chunked = headers
        .get("transfer-encoding")
        .map(|v| v.values().iter().any(|s| s.to_ascii_lowercase().contains("chunked")))
        .unwrap_or(false);
    if chunked {
        return Ok((None, true));
    }
    match headers.get("content-length").and_then(|v| v.first()) {
        Some(cl) => cl
            .trim()
            .parse::<u64>()
            .map(|n| (Some(n), false))
            .map_err(|_| TransportError::Protocol(format!("invalid content-length: {}", cl))),
        None => Ok((None, false)),
    }
}

/// HTTP connection: holds the stream and drives the read loop. Call send() to issue a request.
pub struct HttpConnection {
    stream: HttpStream,
    read_buf: BytesMut,
    parser: ResponseParser,
    progress_interval: Duration,
}

impl HttpConnection {
    /// Wrap an already-connected stream. Used by HttpClient::connect().
    pub fn new(stream: HttpStream, progress_interval: Duration) -> Self {
        Self {
            stream,
            read_buf: BytesMut::with_capacity(8192),
            parser: ResponseParser::new(),
            progress_interval,
        }
    }

    /// Send the request and run the read loop until the final response is complete (or the
    /// handler skips its body). Returns the final status code.
    pub async fn send(
        &mut self,
        request: &RequestBuilder,
        handler: &mut dyn ResponseHandler,
    ) -> Result<u16, TransportError> {
        self.parser.reset();
        self.read_buf.clear();

        let interval = self.progress_interval;
        let write = Self::write_request(&mut self.stream, request);
        with_progress(write, interval, || handler.progress()).await??;

        let mut status: Option<u16> = None;
        let mut headers = HeaderCollection::new();
        loop {
            let mut tmp = [0u8; 8192];
            let n = with_progress(self.stream.read(&mut tmp), interval, || handler.progress())
                .await??;
            if n == 0 {
                self.parser.finish()?;
                return status.ok_or_else(|| {
                    TransportError::Io(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "HTTP connection closed",
                    ))
                });
            }
            self.read_buf.extend_from_slice(&tmp[..n]);
            if handler.progress() == Progress::Abort {
                return Err(TransportError::Aborted);
            }

            loop {
                let mut driver = H1Driver {
                    status: &mut status,
                    headers: &mut headers,
                    status_line_pending: false,
                    handler: &mut *handler,
                };
                self.parser.receive(&mut self.read_buf, &mut driver)?;

                match self.parser.state() {
                    ParseState::HeadersComplete => {
                        let code = status.unwrap_or(0);
                        let action = handler.end_headers(code, &headers);
                        if (100..200).contains(&code) && code != 101 {
                            // Interim response; the real one follows on the same stream.
                            self.parser.reset();
                            headers = HeaderCollection::new();
                            status = None;
                            continue;
                        }
                        if action == BodyAction::Skip || bodiless(&request.method, code) {
                            return Ok(code);
                        }
                        let (content_length, chunked) = body_mode(&headers)?;
                        self.parser.set_body_mode(content_length, chunked);
                    }
                    ParseState::Idle => return Ok(status.unwrap_or(0)),
                    _ => break,
                }
            }
        }
    }

    async fn write_request(stream: &mut HttpStream, request: &RequestBuilder) -> io::Result<()> {
        stream.write_all(request.encode_head().as_bytes()).await?;
        if let Some(body) = &request.body {
            if request.use_chunked() {
                if !body.is_empty() {
                    let hex_len = format!("{:x}\r\n", body.len());
                    stream.write_all(hex_len.as_bytes()).await?;
                    stream.write_all(body).await?;
                    stream.write_all(b"\r\n").await?;
                }
                stream.write_all(b"0\r\n\r\n").await?;
            } else {
                stream.write_all(body).await?;
            }
        }
        stream.flush().await
    }
}
