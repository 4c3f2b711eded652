/*
 * orchestrator.rs
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

//! Request orchestrator: the host-facing `httpRequest(method, url, headers?, body?)` operation.
//!
//! Validation happens before any network activity. A completed exchange yields
//! `success: true` whatever the status code; every abort yields the canonical failure shape.

use crate::cancel::Interrupt;
use crate::error::RequestError;
use crate::headers::HeaderCollection;
use crate::host::HostValue;
use crate::transfer::{TransferController, TransferOutcome};
use crate::transport::Transport;

/// Validated input bundle for one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRequest {
    pub method: String,
    pub url: String,
    pub headers: HeaderCollection,
    /// Empty when the host passed no body.
    pub body: String,
}

impl PendingRequest {
    /// Validate host arguments. Method and URL first, then headers, then body.
    pub fn from_host(
        method: Option<&HostValue>,
        url: Option<&HostValue>,
        headers: Option<&HostValue>,
        body: Option<&HostValue>,
    ) -> Result<PendingRequest, RequestError> {
        let method = required_string(method, "method")?;
        let url = required_string(url, "url")?;
        let headers = match headers {
            Some(arg) => HeaderCollection::from_host(arg)?,
            None => HeaderCollection::new(),
        };
        let body = match body {
            None | Some(HostValue::Null) => String::new(),
            Some(arg) => arg
                .as_host_string()
                .ok_or(RequestError::InvalidArgumentType { argument: "body" })?
                .into_owned(),
        };
        Ok(PendingRequest {
            method,
            url,
            headers,
            body,
        })
    }
}

fn required_string(arg: Option<&HostValue>, argument: &'static str) -> Result<String, RequestError> {
    arg.and_then(HostValue::as_host_string)
        .filter(|s| !s.is_empty())
        .map(|s| s.into_owned())
        .ok_or(RequestError::Precondition { argument })
}

/// Outcome returned to the host. `body` is never absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferResult {
    pub success: bool,
    pub status: u16,
    pub headers: HeaderCollection,
    pub body: String,
}

impl TransferResult {
    /// `{success: false, status: 0, headers: {}, body: ""}`.
    pub fn failure() -> Self {
        Self {
            success: false,
            status: 0,
            headers: HeaderCollection::new(),
            body: String::new(),
        }
    }

    /// Host dictionary with exactly `success`, `status`, `headers`, `body`.
    pub fn into_host_value(self) -> HostValue {
        HostValue::Dict(vec![
            ("success".to_string(), HostValue::Bool(self.success)),
            ("status".to_string(), HostValue::Number(i64::from(self.status))),
            ("headers".to_string(), self.headers.to_host_value()),
            ("body".to_string(), HostValue::String(self.body)),
        ])
    }
}

/// Entry point. Holds the transport capability and the interrupt source for the calls it
/// executes; each call gets fresh transfer state.
pub struct RequestOrchestrator<'a, T: Transport> {
    transport: T,
    interrupt: &'a dyn Interrupt,
}

impl<'a, T: Transport> RequestOrchestrator<'a, T> {
    pub fn new(transport: T, interrupt: &'a dyn Interrupt) -> Self {
        Self {
            transport,
            interrupt,
        }
    }

    /// Validate, encode headers, perform exactly one exchange, assemble the result.
    pub fn execute(
        &mut self,
        method: Option<&HostValue>,
        url: Option<&HostValue>,
        headers: Option<&HostValue>,
        body: Option<&HostValue>,
    ) -> Result<TransferResult, RequestError> {
        let request = PendingRequest::from_host(method, url, headers, body)?;
        Ok(self.perform(request))
    }

    /// Perform an already validated request.
    pub fn perform(&mut self, request: PendingRequest) -> TransferResult {
        let header_lines = request.headers.encode_lines();
        let mut controller = TransferController::new(
            &mut self.transport,
            self.interrupt,
            &request.method,
            &request.url,
            header_lines,
            &request.body,
        );
        match controller.run() {
            TransferOutcome::Completed {
                status,
                headers,
                body,
            } => TransferResult {
                success: true,
                status,
                headers,
                body,
            },
            TransferOutcome::Aborted(_) => TransferResult::failure(),
        }
    }
}

/// One-shot convenience: `httpRequest(method, url, headers, body)` returning the host dictionary.
pub fn http_request<T: Transport>(
    transport: T,
    interrupt: &dyn Interrupt,
    method: &HostValue,
    url: &HostValue,
    headers: Option<&HostValue>,
    body: Option<&HostValue>,
) -> Result<HostValue, RequestError> {
    RequestOrchestrator::new(transport, interrupt)
        .execute(Some(method), Some(url), headers, body)
        .map(TransferResult::into_host_value)
}
