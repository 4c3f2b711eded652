/*
 * lib.rs
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

//! Httpcall core: one blocking HTTP exchange per call, shaped for scripting hosts.
//!
//! Pipeline for a single call:
//! - `HostValue` arguments are validated and the outgoing headers encoded (`headers`).
//! - `TransferController` configures a `Transport`, feeds response header lines into a
//!   `HeaderCollection` and body chunks into a `ResponseAccumulator`, and polls an `Interrupt`
//!   at every progress tick (`transfer`).
//! - `RequestOrchestrator` turns the outcome into a `TransferResult`; every abort collapses to
//!   the canonical failure shape (`orchestrator`).
//!
//! The concrete transport is an HTTP/1.1 client over tokio + rustls (`protocol::http`).

pub mod accumulator;
pub mod cancel;
pub mod config;
pub mod error;
pub mod headers;
pub mod host;
pub mod net;
pub mod orchestrator;
pub mod protocol;
pub mod transfer;
pub mod transport;

pub use accumulator::ResponseAccumulator;
pub use cancel::{CancelToken, Interrupt, NeverInterrupt};
pub use config::TransportConfig;
pub use error::{AccumulationError, RequestError, TransferFailure};
pub use headers::{HeaderCollection, HeaderValue};
pub use host::HostValue;
pub use orchestrator::{http_request, PendingRequest, RequestOrchestrator, TransferResult};
pub use protocol::http::HttpTransport;
pub use transfer::{TransferController, TransferOutcome, TransferState};
pub use transport::{Progress, TransferSink, Transport, TransportError, TransportRequest};
