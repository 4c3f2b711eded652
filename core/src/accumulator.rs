/*
 * accumulator.rs
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

//! Response body accumulator: append chunks as the transport delivers them, finalize once.

use crate::error::AccumulationError;

/// Append-only body buffer owned by a single transfer.
///
/// Growth is fallible (`try_reserve`), so running out of memory surfaces as an
/// `AccumulationError` instead of aborting the host process.
#[derive(Debug, Default)]
pub struct ResponseAccumulator {
    buf: Vec<u8>,
}

impl ResponseAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one chunk of any size (including zero).
    pub fn append(&mut self, chunk: &[u8]) -> Result<(), AccumulationError> {
        self.buf
            .try_reserve(chunk.len())
            .map_err(|source| AccumulationError {
                buffered: self.buf.len(),
                source,
            })?;
        self.buf.extend_from_slice(chunk);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Finalize into the response body. Invalid UTF-8 is replaced with U+FFFD; an empty
    /// accumulator yields an empty string.
    pub fn finalize(self) -> String {
        match String::from_utf8(self.buf) {
            Ok(s) => s,
            Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
        }
    }
}
