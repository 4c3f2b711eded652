/*
 * handler.rs
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

//! HTTP response handler trait.
//!
//! Events: status → header_line (×n, blank line last) → end_headers → body_chunk (×n) →
//! header_line for trailers. `progress` is called between reads and while blocked.

use crate::headers::HeaderCollection;
use crate::transport::Progress;

/// What the connection should do with the body once the head is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyAction {
    Read,
    /// Stop after the head (e.g. a redirect about to be followed).
    Skip,
}

/// Handler for HTTP response events (push model). The connection drives this as data arrives.
///
/// Interim `1xx` responses go through the same calls; `end_headers` then sees the `1xx` code
/// and the connection carries on to the next response on the stream.
pub trait ResponseHandler {
    /// Status code of the response about to be delivered.
    fn status(&mut self, code: u16);

    /// Raw header line: status line, each field, the blank terminator, and trailers.
    fn header_line(&mut self, line: &[u8]);

    /// Head complete. `headers` is the folded view of the lines just delivered.
    fn end_headers(&mut self, code: u16, headers: &HeaderCollection) -> BodyAction;

    /// One chunk of body data, transfer coding already removed.
    fn body_chunk(&mut self, data: &[u8]) -> Progress;

    /// Tick: after every read and at least every progress interval while waiting.
    fn progress(&mut self) -> Progress;
}
