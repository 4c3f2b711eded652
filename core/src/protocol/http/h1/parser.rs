/*
 * parser.rs
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

//! HTTP/1.1 response push parser: status line, raw header lines, body (Content-Length,
//! chunked, or read until close).

use bytes::Buf;
use bytes::BytesMut;

use crate::transport::{Progress, TransportError};

/// Callback for HTTP/1.1 response events. The connection implements this and forwards to its
/// `ResponseHandler`.
pub trait H1ResponseHandler {
    /// Status code, before the status line itself is passed to `header_line`.
    fn status(&mut self, code: u16);
    /// Raw line including its terminator: status line, each header, the blank line ending the
    /// head, and chunked trailers.
    fn header_line(&mut self, line: &[u8]);
    fn body_chunk(&mut self, data: &[u8]) -> Progress;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseState {
    Idle,
    StatusLine,
    Headers,
    /// Headers done; connection must call set_body_mode().
    HeadersComplete,
    Body,
    ChunkSize,
    ChunkData,
    ChunkTrailer,
}

/// Push parser for one HTTP/1.1 response. Feed bytes via `receive`; the handler is invoked as
/// complete tokens are parsed.
pub struct ResponseParser {
    state: ParseState,
    /// Content-Length when known (None for chunked or read-until-close).
    content_length: Option<u64>,
    bytes_received: u64,
    /// Current chunk size (for chunked encoding).
    chunk_remaining: u64,
}

impl ResponseParser {
    pub fn new() -> Self {
        Self {
            state: ParseState::StatusLine,
            content_length: None,
            bytes_received: 0,
            chunk_remaining: 0,
        }
    }

    pub fn state(&self) -> ParseState {
        self.state
    }

    pub fn reset(&mut self) {
        self.state = ParseState::StatusLine;
        self.content_length = None;
        self.bytes_received = 0;
        self.chunk_remaining = 0;
    }

    /// Length of the next line including its LF, or None if no complete line is buffered.
    fn line_len(buf: &[u8]) -> Option<usize> {
        buf.iter().position(|&b| b == b'\n').map(|i| i + 1)
    }

    fn is_blank(line: &[u8]) -> bool {
        line == b"\r\n" || line == b"\n"
    }

    fn trim_eol(line: &[u8]) -> &[u8] {
        let mut line = line;
        while let [rest @ .., b'\r' | b'\n'] = line {
            line = rest;
        }
        line
    }

    /// Hex digits only: no sign, no `0x` prefix, no overflow.
    fn parse_chunk_size(hex: &str) -> Option<u64> {
        if hex.is_empty() || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        u64::from_str_radix(hex, 16).ok()
    }

    fn parse_status_code(line: &[u8]) -> Result<u16, TransportError> {
        let text = String::from_utf8_lossy(Self::trim_eol(line));
        let mut parts = text.splitn(3, ' ');
        let version = parts.next().unwrap_or("");
        if !version.starts_with("HTTP/") {
            return Err(TransportError::Protocol(format!("invalid status line: {}", text)));
        }
        parts
            .next()
            .and_then(|s| s.parse::<u16>().ok())
            .filter(|code| (100..1000).contains(code))
            .ok_or_else(|| TransportError::Protocol(format!("invalid status code: {}", text)))
    }

    /// Consume and parse as much as possible from buf. Partial data remains in buf.
    pub fn receive<H: H1ResponseHandler + ?Sized>(
        &mut self,
        buf: &mut BytesMut,
        handler: &mut H,
    ) -> Result<(), TransportError> {
        while !buf.is_empty() {
            match self.state {
                ParseState::StatusLine => {
                    let n = match Self::line_len(buf) {
                        Some(n) => n,
                        None => return Ok(()),
                    };
                    let line = buf.split_to(n);
                    // Tolerate stray blank lines before the status line.
                    if Self::is_blank(&line) {
                        continue;
                    }
                    let code = Self::parse_status_code(&line)?;
                    handler.status(code);
                    handler.header_line(&line);
                    self.state = ParseState::Headers;
                }
                ParseState::Headers => {
                    let n = match Self::line_len(buf) {
                        Some(n) => n,
                        None => return Ok(()),
                    };
                    let line = buf.split_to(n);
                    handler.header_line(&line);
                    if Self::is_blank(&line) {
                        self.state = ParseState::HeadersComplete;
                        return Ok(()); // Connection will set_body_mode and call receive again
                    }
                }
                ParseState::Body => {
                    if let Some(content_length) = self.content_length {
                        let remaining = content_length - self.bytes_received;
                        let to_read = remaining.min(buf.len() as u64) as usize;
                        if to_read > 0 {
                            let chunk = buf.split_to(to_read);
                            Self::deliver(handler, &chunk)?;
                            self.bytes_received += to_read as u64;
                        }
                        if self.bytes_received >= content_length {
                            self.state = ParseState::Idle;
                        }
                    } else {
                        // Read until close: deliver all available
                        let chunk = buf.split_to(buf.len());
                        Self::deliver(handler, &chunk)?;
                        return Ok(());
                    }
                }
                ParseState::ChunkSize => {
                    let n = match Self::line_len(buf) {
                        Some(n) => n,
                        None => return Ok(()),
                    };
                    let line = buf.split_to(n);
                    let text = String::from_utf8_lossy(Self::trim_eol(&line)).into_owned();
                    let hex_part = text.split(';').next().unwrap_or("").trim();
                    self.chunk_remaining = Self::parse_chunk_size(hex_part).ok_or_else(|| {
                        TransportError::Protocol(format!("invalid chunk size: {}", text))
                    })?;
                    if self.chunk_remaining == 0 {
                        self.state = ParseState::ChunkTrailer;
                    } else {
                        self.state = ParseState::ChunkData;
                    }
                }
                ParseState::ChunkData => {
                    if self.chunk_remaining > 0 {
                        let to_read = self.chunk_remaining.min(buf.len() as u64) as usize;
                        let chunk = buf.split_to(to_read);
                        Self::deliver(handler, &chunk)?;
                        self.chunk_remaining -= to_read as u64;
                    }
                    if self.chunk_remaining > 0 {
                        return Ok(());
                    }
                    // Chunk data is followed by CRLF
                    match Self::line_len(buf) {
                        Some(n) => {
                            buf.advance(n);
                            self.state = ParseState::ChunkSize;
                        }
                        None => return Ok(()),
                    }
                }
                ParseState::HeadersComplete => {
                    // Waiting for connection to call set_body_mode()
                    return Ok(());
                }
                ParseState::ChunkTrailer => {
                    let n = match Self::line_len(buf) {
                        Some(n) => n,
                        None => return Ok(()),
                    };
                    let line = buf.split_to(n);
                    if Self::is_blank(&line) {
                        self.state = ParseState::Idle;
                    } else {
                        handler.header_line(&line);
                    }
                }
                ParseState::Idle => return Ok(()),
            }
        }
        Ok(())
    }

    fn deliver<H: H1ResponseHandler + ?Sized>(
        handler: &mut H,
        data: &[u8],
    ) -> Result<(), TransportError> {
        match handler.body_chunk(data) {
            Progress::Continue => Ok(()),
            Progress::Abort => Err(TransportError::SinkAborted),
        }
    }

    /// Called by the connection once the head is complete (state HeadersComplete).
    /// `None` content length without chunking means read until the connection closes.
    pub fn set_body_mode(&mut self, content_length: Option<u64>, chunked: bool) {
        if self.state != ParseState::HeadersComplete {
            return;
        }
        if chunked {
            self.content_length = None;
            self.state = ParseState::ChunkSize;
        } else if let Some(cl) = content_length {
            self.content_length = Some(cl);
            self.bytes_received = 0;
            if cl == 0 {
                self.state = ParseState::Idle;
            } else {
                self.state = ParseState::Body;
            }
        } else {
            self.content_length = None;
            self.state = ParseState::Body; // read until close
        }
    }

    /// The peer closed the connection. Completes a read-until-close body; anything else is a
    /// truncated response.
    pub fn finish(&mut self) -> Result<(), TransportError> {
        match self.state {
            ParseState::Idle => Ok(()),
            ParseState::Body if self.content_length.is_none() => {
                self.state = ParseState::Idle;
                Ok(())
            }
            _ => Err(TransportError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "HTTP connection closed",
            ))),
        }
    }
}

impl Default for ResponseParser {
    fn default() -> Self {
        Self::new()
    }
}
