/*
 * url.rs
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

//! Request URL handling: split `http(s)://` URLs into connection parts and resolve redirect
//! locations against the current URL.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use percent_encoding::percent_decode_str;

use crate::transport::TransportError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlParts {
    pub use_tls: bool,
    /// Host without brackets (IPv6 literals are bracketed again by `authority`).
    pub host: String,
    pub port: u16,
    /// Path plus query, always starting with `/`. Fragment dropped.
    pub target: String,
    /// `user:password` from the URL, percent-decoded.
    pub userinfo: Option<(String, String)>,
}

impl UrlParts {
    pub fn parse(url: &str) -> Result<UrlParts, TransportError> {
        let url = url.trim();
        let (use_tls, rest) = match url.find("://").filter(|_| has_scheme(url)) {
            Some(i) => {
                let scheme = &url[..i];
                if scheme.eq_ignore_ascii_case("https") {
                    (true, &url[i + 3..])
                } else if scheme.eq_ignore_ascii_case("http") {
                    (false, &url[i + 3..])
                } else {
                    return Err(TransportError::UnsupportedScheme(scheme.to_string()));
                }
            }
            // Bare "host/path" is taken as http, as command-line clients do.
            None => (false, url),
        };
        let rest = match rest.find('#') {
            Some(i) => &rest[..i],
            None => rest,
        };
        let authority_end = rest.find(|c: char| c == '/' || c == '?').unwrap_or(rest.len());
        let (authority, target) = rest.split_at(authority_end);
        let target = if target.is_empty() {
            "/".to_string()
        } else if target.starts_with('?') {
            format!("/{}", target)
        } else {
            target.to_string()
        };

        let (userinfo, host_port) = match authority.rfind('@') {
            Some(at) => (Some(split_userinfo(&authority[..at])), &authority[at + 1..]),
            None => (None, authority),
        };
        let default_port = if use_tls { 443 } else { 80 };
        let (host, port) = split_host_port(host_port, default_port)
            .ok_or_else(|| TransportError::InvalidUrl(url.to_string()))?;
        if host.is_empty() {
            return Err(TransportError::InvalidUrl(url.to_string()));
        }
        Ok(UrlParts {
            use_tls,
            host,
            port,
            target,
            userinfo,
        })
    }

    /// `Host` header value: port omitted when it is the scheme default.
    pub fn authority(&self) -> String {
        let host = if self.host.contains(':') {
            format!("[{}]", self.host)
        } else {
            self.host.clone()
        };
        let default_port = if self.use_tls { 443 } else { 80 };
        if self.port == default_port {
            host
        } else {
            format!("{}:{}", host, self.port)
        }
    }

    /// `host:port` for the TCP connect.
    pub fn socket_addr(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    pub fn to_url(&self) -> String {
        format!(
            "{}://{}{}",
            if self.use_tls { "https" } else { "http" },
            self.authority(),
            self.target
        )
    }

    /// `Authorization: Basic ...` value for URL credentials.
    pub fn basic_auth(&self) -> Option<String> {
        self.userinfo
            .as_ref()
            .map(|(user, pass)| format!("Basic {}", STANDARD.encode(format!("{}:{}", user, pass))))
    }

    /// Resolve a `Location` value against this URL.
    pub fn resolve(&self, location: &str) -> Result<UrlParts, TransportError> {
        let location = location.trim();
        if has_scheme(location) {
            return UrlParts::parse(location);
        }
        let scheme = if self.use_tls { "https" } else { "http" };
        if let Some(rest) = location.strip_prefix("//") {
            return UrlParts::parse(&format!("{}://{}", scheme, rest));
        }
        let target = if location.starts_with('/') {
            location.to_string()
        } else if location.starts_with('?') {
            let path = self.target.split('?').next().unwrap_or("/");
            format!("{}{}", path, location)
        } else {
            let path = self.target.split('?').next().unwrap_or("/");
            let dir = match path.rfind('/') {
                Some(i) => &path[..=i],
                None => "/",
            };
            format!("{}{}", dir, location)
        };
        let mut next = UrlParts::parse(&format!("{}://{}{}", scheme, self.authority(), target))?;
        next.userinfo = self.userinfo.clone();
        Ok(next)
    }
}

fn has_scheme(location: &str) -> bool {
    match location.find("://") {
        Some(i) if i > 0 => location[..i]
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')),
        _ => false,
    }
}

fn split_userinfo(userinfo: &str) -> (String, String) {
    let decode = |s: &str| percent_decode_str(s).decode_utf8_lossy().into_owned();
    match userinfo.find(':') {
        Some(i) => (decode(&userinfo[..i]), decode(&userinfo[i + 1..])),
        None => (decode(userinfo), String::new()),
    }
}

fn split_host_port(host_port: &str, default_port: u16) -> Option<(String, u16)> {
    if let Some(rest) = host_port.strip_prefix('[') {
        let close = rest.find(']')?;
        let host = &rest[..close];
        let after = &rest[close + 1..];
        let port = match after.strip_prefix(':') {
            Some(p) if !p.is_empty() => p.parse::<u16>().ok()?,
            Some(_) => default_port,
            None if after.is_empty() => default_port,
            None => return None,
        };
        return Some((host.to_string(), port));
    }
    match host_port.rfind(':') {
        Some(colon) => {
            let port_str = &host_port[colon + 1..];
            let port = if port_str.is_empty() {
                default_port
            } else {
                port_str.parse::<u16>().ok()?
            };
            Some((host_port[..colon].to_string(), port))
        }
        None => Some((host_port.to_string(), default_port)),
    }
}
