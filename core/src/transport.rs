/*
 * transport.rs
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

//! Transport capability: performs one exchange, pushing header lines and body chunks into a
//! sink and offering a progress tick for cooperative cancellation.

use std::io;

/// Answer from a sink callback: keep going, or stop the transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    Continue,
    Abort,
}

/// Receiver for one transfer's response data. Called synchronously on the transfer's thread,
/// each callback in arrival order.
pub trait TransferSink {
    /// One raw header line of the final response, line terminator included.
    fn header_line(&mut self, line: &[u8]);

    /// One chunk of (decoded transfer-coding) body data.
    fn body_chunk(&mut self, chunk: &[u8]) -> Progress;

    /// Periodic tick while the transfer is in flight.
    fn progress(&mut self) -> Progress;
}

/// A configured request, ready for the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportRequest {
    pub method: String,
    pub url: String,
    /// Wire header lines, `Name: Value`, in send order.
    pub header_lines: Vec<String>,
    /// Only set for a non-empty body.
    pub body: Option<Vec<u8>>,
}

/// Blocking exchange. Returns the final response's status code once the response is complete.
pub trait Transport {
    fn perform(
        &mut self,
        request: &TransportRequest,
        sink: &mut dyn TransferSink,
    ) -> Result<u16, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn perform(
        &mut self,
        request: &TransportRequest,
        sink: &mut dyn TransferSink,
    ) -> Result<u16, TransportError> {
        (**self).perform(request, sink)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn perform(
        &mut self,
        request: &TransportRequest,
        sink: &mut dyn TransferSink,
    ) -> Result<u16, TransportError> {
        (**self).perform(request, sink)
    }
}

/// Transport-level failure. Every variant ends the transfer in the aborted state.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("too many redirects ({0})")]
    TooManyRedirects(usize),

    /// Progress tick answered `Abort` (interrupt requested).
    #[error("aborted by progress callback")]
    Aborted,

    /// Body sink refused a chunk.
    #[error("body sink refused data")]
    SinkAborted,
}
