/*
 * request.rs
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

//! HTTP request: method, target, header lines, optional body.
//!
//! Built via RequestBuilder; sending is done by the connection.

/// Request builder: method, request target, header lines, body.
///
/// Header lines are kept as `Name: value` text in send order. Names are compared
/// case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestBuilder {
    pub method: String,
    pub target: String,
    pub header_lines: Vec<String>,
    pub body: Option<Vec<u8>>,
}

impl RequestBuilder {
    pub fn new(method: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            target: target.into(),
            header_lines: Vec::new(),
            body: None,
        }
    }

    /// Append a header line as given.
    pub fn header_line(&mut self, line: impl Into<String>) -> &mut Self {
        self.header_lines.push(line.into());
        self
    }

    pub fn header(&mut self, name: &str, value: &str) -> &mut Self {
        self.header_lines.push(format!("{}: {}", name, value));
        self
    }

    /// Add the header only if no line with this name is present.
    pub fn default_header(&mut self, name: &str, value: &str) -> &mut Self {
        if !self.has_header(name) {
            self.header(name, value);
        }
        self
    }

    pub fn has_header(&self, name: &str) -> bool {
        self.header_value(name).is_some()
    }

    /// Value of the first line with this name, leading whitespace trimmed.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.header_lines.iter().find_map(|line| {
            let (n, v) = line.split_once(':')?;
            if n.trim().eq_ignore_ascii_case(name) {
                Some(v.trim_start())
            } else {
                None
            }
        })
    }

    pub fn body(&mut self, data: Vec<u8>) -> &mut Self {
        self.body = Some(data);
        self
    }

    /// Send the body with chunked framing: the caller asked for it and gave no length.
    pub fn use_chunked(&self) -> bool {
        self.body.is_some()
            && !self.has_header("content-length")
            && self
                .header_value("transfer-encoding")
                .map(|v| v.to_ascii_lowercase().contains("chunked"))
                .unwrap_or(false)
    }

    /// Request line and header block, blank line included. Adds `Content-Length` for a body
    /// unless the caller framed it already.
    pub fn encode_head(&self) -> String {
        let mut head = format!("{} {} HTTP/1.1\r\n", self.method, self.target);
        for line in &self.header_lines {
            head.push_str(line);
            head.push_str("\r\n");
        }
        if let Some(body) = &self.body {
            if !self.has_header("content-length") && !self.has_header("transfer-encoding") {
                head.push_str(&format!("Content-Length: {}\r\n", body.len()));
            }
        } else if ["POST", "PUT", "PATCH"]
            .iter()
            .any(|m| self.method.eq_ignore_ascii_case(m))
            && !self.has_header("content-length")
        {
            head.push_str("Content-Length: 0\r\n");
        }
        head.push_str("\r\n");
        head
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn head_with_body_gets_length() {
        let mut req = RequestBuilder::new("POST", "/items");
        req.header("Host", "h.test").header_line("X-A: 1").body(b"abc".to_vec());
        assert_eq!(
            req.encode_head(),
            "POST /items HTTP/1.1\r\nHost: h.test\r\nX-A: 1\r\nContent-Length: 3\r\n\r\n"
        );
        assert!(!req.use_chunked());
    }

    #[test]
    fn empty_post_sends_zero_length() {
        let req = RequestBuilder::new("POST", "/");
        assert_eq!(req.encode_head(), "POST / HTTP/1.1\r\nContent-Length: 0\r\n\r\n");
        let req = RequestBuilder::new("DELETE", "/x");
        assert_eq!(req.encode_head(), "DELETE /x HTTP/1.1\r\n\r\n");
    }

    #[test]
    fn lowercase_method_still_gets_zero_length() {
        let req = RequestBuilder::new("post", "/");
        assert_eq!(req.encode_head(), "post / HTTP/1.1\r\nContent-Length: 0\r\n\r\n");
        let req = RequestBuilder::new("Patch", "/");
        assert!(req.encode_head().contains("Content-Length: 0\r\n"));
    }

    #[test]
    fn caller_framing_wins() {
        let mut req = RequestBuilder::new("PUT", "/");
        req.header_line("transfer-encoding: chunked").body(b"x".to_vec());
        assert!(req.use_chunked());
        assert!(!req.encode_head().contains("Content-Length"));

        let mut req = RequestBuilder::new("PUT", "/");
        req.header_line("Content-Length: 1").body(b"x".to_vec());
        assert_eq!(req.encode_head().matches("Content-Length").count(), 1);
    }

    #[test]
    fn default_header_respects_caller() {
        let mut req = RequestBuilder::new("GET", "/");
        req.header_line("accept: text/html");
        req.default_header("Accept", "*/*").default_header("Host", "h");
        assert_eq!(req.header_lines, vec!["accept: text/html", "Host: h"]);
        assert_eq!(req.header_value("ACCEPT"), Some("text/html"));
    }
}
