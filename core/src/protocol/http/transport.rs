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

//! Blocking HTTP transport: one `perform` call runs the whole exchange, redirects included, on a
//! tokio runtime and returns when the final response is complete.

use log::{debug, warn};
use tokio::runtime::Handle;

use crate::config::TransportConfig;
use crate::headers::HeaderCollection;
use crate::protocol::http::client::HttpClient;
use crate::protocol::http::connection::with_progress;
use crate::protocol::http::handler::{BodyAction, ResponseHandler};
use crate::protocol::http::request::RequestBuilder;
use crate::protocol::http::url::UrlParts;
use crate::transport::{Progress, TransferSink, Transport, TransportError, TransportRequest};

/// Any 3xx with a `Location` is followed; 304 carries no target.
fn is_redirect(code: u16) -> bool {
    (300..400).contains(&code) && code != 304
}

/// Caller headers not carried to a different host on redirect.
fn is_credential_line(line: &str) -> bool {
    line.split_once(':')
        .map(|(name, _)| {
            let name = name.trim();
            name.eq_ignore_ascii_case("authorization") || name.eq_ignore_ascii_case("cookie")
        })
        .unwrap_or(false)
}

/// Per-hop handler. Lines of interim and redirect responses are held back and dropped, so the
/// sink only ever sees the final response.
struct HopHandler<'s> {
    sink: &'s mut dyn TransferSink,
    holding: bool,
    held: Vec<Vec<u8>>,
    redirect: Option<String>,
}

impl<'s> HopHandler<'s> {
    fn new(sink: &'s mut dyn TransferSink) -> Self {
        Self {
            sink,
            holding: false,
            held: Vec::new(),
            redirect: None,
        }
    }
}

impl ResponseHandler for HopHandler<'_> {
    fn status(&mut self, code: u16) {
        self.held.clear();
        self.holding = (100..200).contains(&code) || is_redirect(code);
    }

    fn header_line(&mut self, line: &[u8]) {
        if self.holding {
            self.held.push(line.to_vec());
        } else {
            self.sink.header_line(line);
        }
    }

    fn end_headers(&mut self, code: u16, headers: &HeaderCollection) -> BodyAction {
        if !self.holding {
            return BodyAction::Read;
        }
        self.holding = false;
        if (100..200).contains(&code) {
            self.held.clear();
            return BodyAction::Read;
        }
        match headers.get("location").and_then(|v| v.first()) {
            Some(location) if !location.trim().is_empty() => {
                self.redirect = Some(location.trim().to_string());
                self.held.clear();
                BodyAction::Skip
            }
            // A 3xx without a target is the final response.
            _ => {
                for line in self.held.drain(..) {
                    self.sink.header_line(&line);
                }
                BodyAction::Read
            }
        }
    }

    fn body_chunk(&mut self, data: &[u8]) -> Progress {
        self.sink.body_chunk(data)
    }

    fn progress(&mut self) -> Progress {
        self.sink.progress()
    }
}

/// HTTP/1.1 transport over the shared TLS connector. Blocks the calling thread on the given
/// runtime; must not be called from a thread that is itself driving that runtime.
pub struct HttpTransport {
    runtime_handle: Handle,
    config: TransportConfig,
}

impl HttpTransport {
    pub fn with_runtime_handle(runtime_handle: Handle) -> Self {
        Self {
            runtime_handle,
            config: TransportConfig::default(),
        }
    }

    pub fn with_config(mut self, config: TransportConfig) -> Self {
        self.config = config;
        self
    }

    fn build_request(
        &self,
        url: &UrlParts,
        method: &str,
        header_lines: &[String],
        body: Option<&[u8]>,
    ) -> RequestBuilder {
        let mut req = RequestBuilder::new(method, url.target.clone());
        for line in header_lines {
            req.header_line(line.clone());
        }
        if !req.has_header("host") {
            req.header_lines.insert(0, format!("Host: {}", url.authority()));
        }
        if let Some(auth) = url.basic_auth() {
            req.default_header("Authorization", &auth);
        }
        if let Some(accept) = &self.config.default_accept {
            req.default_header("Accept", accept);
        }
        if let Some(body) = body {
            req.body(body.to_vec());
        }
        req
    }

    async fn perform_async(
        &self,
        request: &TransportRequest,
        sink: &mut dyn TransferSink,
    ) -> Result<u16, TransportError> {
        let mut url = UrlParts::parse(&request.url)?;
        let mut method = request.method.clone();
        let mut body = request.body.clone();
        let mut header_lines = request.header_lines.clone();
        let mut hops = 0usize;
        loop {
            // Host is a default only on the first hop; later hops address the new authority.
            if hops > 0 {
                header_lines.retain(|line| {
                    line.split_once(':')
                        .map(|(n, _)| !n.trim().eq_ignore_ascii_case("host"))
                        .unwrap_or(true)
                });
            }
            let req = self.build_request(&url, &method, &header_lines, body.as_deref());
            debug!("[http] hop {}: {} {}", hops, method, url.to_url());

            let mut hop = HopHandler::new(&mut *sink);
            let connect = HttpClient::connect(&url, &self.config);
            let mut conn = with_progress(connect, self.config.progress_interval, || hop.progress())
                .await??;
            let status = conn.send(&req, &mut hop).await?;

            let location = match hop.redirect.take() {
                Some(location) => location,
                None => return Ok(status),
            };
            hops += 1;
            if hops > self.config.max_redirects {
                warn!("[http] giving up after {} redirects", self.config.max_redirects);
                return Err(TransportError::TooManyRedirects(self.config.max_redirects));
            }
            let next = url.resolve(&location)?;
            debug!("[http] {} redirect to {}", status, next.to_url());
            if status == 303 && !method.eq_ignore_ascii_case("HEAD") {
                method = "GET".to_string();
                body = None;
            }
            if next.host != url.host || next.port != url.port {
                header_lines.retain(|line| !is_credential_line(line));
            }
            url = next;
        }
    }
}

impl Transport for HttpTransport {
    fn perform(
        &mut self,
        request: &TransportRequest,
        sink: &mut dyn TransferSink,
    ) -> Result<u16, TransportError> {
        let handle = self.runtime_handle.clone();
        handle.block_on(self.perform_async(request, sink))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct LineSink {
        lines: Vec<String>,
        body: Vec<u8>,
    }

    impl TransferSink for LineSink {
        fn header_line(&mut self, line: &[u8]) {
            self.lines.push(String::from_utf8_lossy(line).into_owned());
        }
        fn body_chunk(&mut self, chunk: &[u8]) -> Progress {
            self.body.extend_from_slice(chunk);
            Progress::Continue
        }
        fn progress(&mut self) -> Progress {
            Progress::Continue
        }
    }

    fn headers_of(lines: &[&str]) -> HeaderCollection {
        let mut headers = HeaderCollection::new();
        for line in lines {
            headers.fold_line(line.as_bytes());
        }
        headers
    }

    #[test]
    fn redirect_lines_are_held_and_dropped() {
        let mut sink = LineSink::default();
        let mut hop = HopHandler::new(&mut sink);
        hop.status(302);
        hop.header_line(b"HTTP/1.1 302 Found\r\n");
        hop.header_line(b"Location: /next\r\n");
        let action = hop.end_headers(302, &headers_of(&["Location: /next\r\n"]));
        assert_eq!(action, BodyAction::Skip);
        assert_eq!(hop.redirect.as_deref(), Some("/next"));
        drop(hop);
        assert!(sink.lines.is_empty());
    }

    #[test]
    fn redirect_without_location_is_final() {
        let mut sink = LineSink::default();
        let mut hop = HopHandler::new(&mut sink);
        hop.status(301);
        hop.header_line(b"HTTP/1.1 301 Moved\r\n");
        hop.header_line(b"\r\n");
        assert_eq!(hop.end_headers(301, &HeaderCollection::new()), BodyAction::Read);
        assert!(hop.redirect.is_none());
        drop(hop);
        assert_eq!(sink.lines, vec!["HTTP/1.1 301 Moved\r\n", "\r\n"]);
    }

    #[test]
    fn interim_lines_are_dropped() {
        let mut sink = LineSink::default();
        let mut hop = HopHandler::new(&mut sink);
        hop.status(100);
        hop.header_line(b"HTTP/1.1 100 Continue\r\n");
        hop.end_headers(100, &HeaderCollection::new());
        hop.status(200);
        hop.header_line(b"HTTP/1.1 200 OK\r\n");
        hop.end_headers(200, &HeaderCollection::new());
        drop(hop);
        assert_eq!(sink.lines, vec!["HTTP/1.1 200 OK\r\n"]);
    }

    #[test]
    fn redirect_codes() {
        for code in [300, 301, 302, 303, 305, 307, 308] {
            assert!(is_redirect(code), "{}", code);
        }
        for code in [200, 204, 304, 400] {
            assert!(!is_redirect(code), "{}", code);
        }
    }

    #[test]
    fn not_modified_passes_through() {
        let mut sink = LineSink::default();
        let mut hop = HopHandler::new(&mut sink);
        hop.status(304);
        hop.header_line(b"Location: /x\r\n");
        assert_eq!(
            hop.end_headers(304, &headers_of(&["Location: /x\r\n"])),
            BodyAction::Read
        );
        assert!(hop.redirect.is_none());
        drop(hop);
        assert_eq!(sink.lines, vec!["Location: /x\r\n"]);
    }

    #[test]
    fn default_headers_yield_to_caller() {
        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let transport = HttpTransport::with_runtime_handle(runtime.handle().clone());
        let url = UrlParts::parse("http://u:p@h.test:8080/a").unwrap();
        let req = transport.build_request(&url, "GET", &[], None);
        assert_eq!(
            req.header_lines,
            vec!["Host: h.test:8080", "Authorization: Basic dTpw", "Accept: */*"]
        );

        let caller = vec!["accept: text/plain".to_string(), "HOST: other".to_string()];
        let req = transport.build_request(&url, "GET", &caller, Some(b"x"));
        assert_eq!(req.header_value("accept"), Some("text/plain"));
        assert_eq!(req.header_value("host"), Some("other"));
        assert_eq!(req.body.as_deref(), Some(&b"x"[..]));
    }

    #[test]
    fn credential_lines() {
        assert!(is_credential_line("Authorization: Bearer t"));
        assert!(is_credential_line("cookie: a=b"));
        assert!(!is_credential_line("Accept: */*"));
        assert!(!is_credential_line("garbage"));
    }
}
