/*
 * mod.rs
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

//! HTTP client: HTTP/1.1 over plain TCP or TLS with a push-parsed response.
//!
//! - Callback-based response API: `ResponseHandler` sees the status, every raw header line,
//!   then body chunks, with a progress tick while waiting on the network.
//! - Buffers: `bytes` crate (BytesMut for the parse buffer).
//! - TLS with ALPN `http/1.1` only.
//! - `HttpTransport` wraps all of it behind the blocking `Transport` trait and follows redirects.

mod handler;
mod request;
mod transport;

pub mod client;
pub mod connection;
pub mod h1;
pub mod url;

pub use client::HttpClient;
pub use connection::{HttpConnection, HttpStream};
pub use h1::H1ResponseHandler;
pub use handler::{BodyAction, ResponseHandler};
pub use request::RequestBuilder;
pub use transport::HttpTransport;
pub use url::UrlParts;
