/*
 * config.rs
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

//! Transport configuration. Built in code; nothing is read from files or the environment.

use std::time::Duration;

/// Redirect hops followed before giving up (matches the usual client default).
pub const DEFAULT_MAX_REDIRECTS: usize = 30;

/// TCP connect timeout applied by the transport itself.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

/// Longest wait between two progress ticks while the transport is blocked on I/O.
pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_millis(100);

/// Settings for `HttpTransport`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    /// Maximum number of redirects followed for one call.
    pub max_redirects: usize,
    pub connect_timeout: Duration,
    pub progress_interval: Duration,
    /// `Accept` header sent when the caller supplies none. `None` sends nothing.
    pub default_accept: Option<String>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            max_redirects: DEFAULT_MAX_REDIRECTS,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            default_accept: Some("*/*".to_string()),
        }
    }
}

impl TransportConfig {
    pub fn with_max_redirects(mut self, max_redirects: usize) -> Self {
        self.max_redirects = max_redirects;
        self
    }

    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }
}
