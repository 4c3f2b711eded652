/*
 * transfer.rs
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

//! Transfer controller: owns one request lifecycle.
//!
//! `Configured` → `InFlight` → `Completed` | `Aborted`. The transport drives every transition;
//! the controller only supplies the sinks, polls the interrupt at each progress tick, and
//! discards everything received when the transfer aborts.

use log::{debug, warn};

use crate::accumulator::ResponseAccumulator;
use crate::cancel::Interrupt;
use crate::error::{AccumulationError, TransferFailure};
use crate::headers::HeaderCollection;
use crate::transport::{Progress, TransferSink, Transport, TransportRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferState {
    Configured,
    InFlight,
    Completed,
    Aborted,
}

/// Result of one transfer.
#[derive(Debug)]
pub enum TransferOutcome {
    /// Exchange finished; any status code, including 4xx/5xx.
    Completed {
        status: u16,
        headers: HeaderCollection,
        body: String,
    },
    /// Exchange failed or was interrupted. Partial data has already been dropped.
    Aborted(TransferFailure),
}

/// Header and body sinks for one in-flight transfer.
struct Sinks<'a> {
    headers: HeaderCollection,
    body: ResponseAccumulator,
    interrupt: &'a dyn Interrupt,
    accumulation_failure: Option<AccumulationError>,
}

impl TransferSink for Sinks<'_> {
    fn header_line(&mut self, line: &[u8]) {
        self.headers.fold_line(line);
    }

    fn body_chunk(&mut self, chunk: &[u8]) -> Progress {
        match self.body.append(chunk) {
            Ok(()) => Progress::Continue,
            Err(e) => {
                self.accumulation_failure = Some(e);
                Progress::Abort
            }
        }
    }

    fn progress(&mut self) -> Progress {
        if self.interrupt.is_interrupted() {
            Progress::Abort
        } else {
            Progress::Continue
        }
    }
}

/// Drives exactly one exchange over a transport. Not reusable; `run` consumes the request.
pub struct TransferController<'a, T: Transport> {
    transport: T,
    interrupt: &'a dyn Interrupt,
    request: TransportRequest,
    state: TransferState,
}

impl<'a, T: Transport> TransferController<'a, T> {
    /// Configure a transfer: method, URL, header lines, optional body. Redirects are always
    /// followed.
    pub fn new(
        transport: T,
        interrupt: &'a dyn Interrupt,
        method: &str,
        url: &str,
        header_lines: Vec<String>,
        body: &str,
    ) -> Self {
        let request = TransportRequest {
            method: method.to_string(),
            url: url.to_string(),
            header_lines,
            body: if body.is_empty() {
                None
            } else {
                Some(body.as_bytes().to_vec())
            },
        };
        Self {
            transport,
            interrupt,
            request,
            state: TransferState::Configured,
        }
    }

    pub fn state(&self) -> TransferState {
        self.state
    }

    /// Perform the exchange once. No retries.
    pub fn run(&mut self) -> TransferOutcome {
        if self.state != TransferState::Configured {
            return TransferOutcome::Aborted(TransferFailure::Transport(
                crate::transport::TransportError::Protocol("transfer already performed".into()),
            ));
        }
        let mut sinks = Sinks {
            headers: HeaderCollection::new(),
            body: ResponseAccumulator::new(),
            interrupt: self.interrupt,
            accumulation_failure: None,
        };
        self.state = TransferState::InFlight;
        debug!("[http] {} {}", self.request.method, self.request.url);
        let result = self.transport.perform(&self.request, &mut sinks);
        match result {
            Ok(status) => {
                self.state = TransferState::Completed;
                debug!(
                    "[http] {} {} -> {} ({} bytes)",
                    self.request.method,
                    self.request.url,
                    status,
                    sinks.body.len()
                );
                TransferOutcome::Completed {
                    status,
                    headers: sinks.headers,
                    body: sinks.body.finalize(),
                }
            }
            Err(transport_error) => {
                self.state = TransferState::Aborted;
                // A refused chunk shows up as a transport error; report the real cause.
                let failure = match sinks.accumulation_failure.take() {
                    Some(e) => TransferFailure::Accumulation(e),
                    None => TransferFailure::Transport(transport_error),
                };
                if failure.is_cancellation() {
                    debug!("[http] {} {} interrupted", self.request.method, self.request.url);
                } else {
                    warn!(
                        "[http] {} {} failed after {} bytes: {}",
                        self.request.method,
                        self.request.url,
                        sinks.body.len(),
                        failure
                    );
                }
                TransferOutcome::Aborted(failure)
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::cancel::{CancelToken, NeverInterrupt};
    use crate::headers::HeaderValue;
    use crate::transport::TransportError;

    /// Scripted transport: replays header lines and chunks, then reports `end`.
    pub(crate) struct ScriptedTransport {
        pub header_lines: Vec<&'static str>,
        pub chunks: Vec<&'static str>,
        /// `Ok(status)` to complete, `Err(message)` to fail after all chunks.
        pub end: Result<u16, &'static str>,
        pub performed: usize,
        pub seen: Option<TransportRequest>,
    }

    impl ScriptedTransport {
        pub fn new(
            header_lines: Vec<&'static str>,
            chunks: Vec<&'static str>,
            end: Result<u16, &'static str>,
        ) -> Self {
            Self {
                header_lines,
                chunks,
                end,
                performed: 0,
                seen: None,
            }
        }
    }

    impl Transport for ScriptedTransport {
        fn perform(
            &mut self,
            request: &TransportRequest,
            sink: &mut dyn TransferSink,
        ) -> Result<u16, TransportError> {
            self.performed += 1;
            self.seen = Some(request.clone());
            for line in &self.header_lines {
                sink.header_line(line.as_bytes());
            }
            for chunk in &self.chunks {
                if sink.progress() == Progress::Abort {
                    return Err(TransportError::Aborted);
                }
                if sink.body_chunk(chunk.as_bytes()) == Progress::Abort {
                    return Err(TransportError::SinkAborted);
                }
            }
            match self.end {
                Ok(status) => Ok(status),
                Err(msg) => Err(TransportError::Protocol(msg.to_string())),
            }
        }
    }

    #[test]
    fn completed_transfer_collects_headers_and_body() {
        let mut transport = ScriptedTransport::new(
            vec!["HTTP/1.1 404 Not Found\r\n", "Set-Cookie: a\r\n", "Set-Cookie: b\r\n", "\r\n"],
            vec!["not ", "here"],
            Ok(404),
        );
        let mut controller =
            TransferController::new(&mut transport, &NeverInterrupt, "GET", "http://h/", vec![], "");
        assert_eq!(controller.state(), TransferState::Configured);
        match controller.run() {
            TransferOutcome::Completed { status, headers, body } => {
                assert_eq!(status, 404);
                assert_eq!(body, "not here");
                assert_eq!(
                    headers.get("set-cookie"),
                    Some(&HeaderValue::Multi(vec!["a".into(), "b".into()]))
                );
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(controller.state(), TransferState::Completed);
        assert_eq!(transport.performed, 1);
    }

    #[test]
    fn body_only_sent_when_non_empty() {
        let mut transport = ScriptedTransport::new(vec![], vec![], Ok(200));
        TransferController::new(&mut transport, &NeverInterrupt, "POST", "http://h/", vec![], "")
            .run();
        let seen = transport.seen.take().unwrap();
        assert_eq!(seen.body, None);

        TransferController::new(
            &mut transport,
            &NeverInterrupt,
            "POST",
            "http://h/",
            vec!["X-A: 1".into()],
            "a=b",
        )
        .run();
        let seen = transport.seen.take().unwrap();
        assert_eq!(seen.body.as_deref(), Some(&b"a=b"[..]));
        assert_eq!(seen.header_lines, vec!["X-A: 1"]);
    }

    #[test]
    fn interrupt_aborts_at_progress_tick() {
        let token = CancelToken::new();
        token.cancel();
        let mut transport = ScriptedTransport::new(vec!["X: y\r\n"], vec!["a", "b"], Ok(200));
        let mut controller =
            TransferController::new(&mut transport, &token, "GET", "http://h/", vec![], "");
        match controller.run() {
            TransferOutcome::Aborted(failure) => assert!(failure.is_cancellation()),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(controller.state(), TransferState::Aborted);
    }

    #[test]
    fn failure_after_chunks_discards_partial_data() {
        let mut transport =
            ScriptedTransport::new(vec!["X: y\r\n"], vec!["1", "2", "3"], Err("reset"));
        let mut controller =
            TransferController::new(&mut transport, &NeverInterrupt, "GET", "http://h/", vec![], "");
        match controller.run() {
            TransferOutcome::Aborted(TransferFailure::Transport(TransportError::Protocol(m))) => {
                assert_eq!(m, "reset")
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn controller_runs_once() {
        let mut transport = ScriptedTransport::new(vec![], vec![], Ok(200));
        let mut controller =
            TransferController::new(&mut transport, &NeverInterrupt, "GET", "http://h/", vec![], "");
        assert!(matches!(controller.run(), TransferOutcome::Completed { .. }));
        assert!(matches!(controller.run(), TransferOutcome::Aborted(_)));
        drop(controller);
        assert_eq!(transport.performed, 1);
    }
}
