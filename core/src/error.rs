/*
 * error.rs
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

//! Request validation errors and internal transfer-abort reasons.

use std::collections::TryReserveError;

use crate::transport::TransportError;

/// Input validation failure. Reported to the host before any network activity; never paired
/// with a partial result.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    /// Method or URL missing, empty, or not readable as a string.
    #[error("{argument} must be a non-empty string")]
    Precondition { argument: &'static str },

    /// Header argument is neither a dictionary nor null, or the body is not a string.
    #[error("invalid argument type for {argument}")]
    InvalidArgumentType { argument: &'static str },

    /// A header value is neither a string nor a list of strings.
    #[error("invalid value for header '{key}': header values must be string or list of string")]
    InvalidHeaderValue { key: String },
}

/// The response buffer could not grow to hold the next chunk.
#[derive(Debug, thiserror::Error)]
#[error("cannot buffer response body beyond {buffered} bytes: {source}")]
pub struct AccumulationError {
    pub buffered: usize,
    #[source]
    pub source: TryReserveError,
}

/// Why a transfer ended in the `Aborted` state. Logged only; callers see the canonical
/// failure shape whatever the reason.
#[derive(Debug, thiserror::Error)]
pub enum TransferFailure {
    #[error("transport failure: {0}")]
    Transport(#[from] TransportError),

    #[error("accumulation failure: {0}")]
    Accumulation(#[from] AccumulationError),
}

impl TransferFailure {
    /// True when the transfer stopped because the interrupt signal was observed.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, TransferFailure::Transport(TransportError::Aborted))
    }
}
