/*
 * client.rs
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

//! HTTP client: connect to the host named by a URL, then use the connection to send one request.

use std::io;

use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_rustls::rustls::pki_types::ServerName;

use crate::config::TransportConfig;
use crate::net::http_connector;
use crate::protocol::http::connection::{HttpConnection, HttpStream};
use crate::protocol::http::url::UrlParts;

/// HTTP client. `HttpClient::connect(url, config)` returns a connection ready for `send`.
pub struct HttpClient;

impl HttpClient {
    /// TCP connect (bounded by the configured timeout), then the TLS handshake for `https`.
    pub async fn connect(url: &UrlParts, config: &TransportConfig) -> io::Result<HttpConnection> {
        let addr = url.socket_addr();
        let tcp = timeout(config.connect_timeout, TcpStream::connect(&addr))
            .await
            .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "TCP connect timed out"))??;
        let _ = tcp.set_nodelay(true);

        let stream = if url.use_tls {
            let server_name = ServerName::try_from(url.host.clone())
                .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "invalid host name"))?;
            let tls = http_connector()
                .connect(server_name, tcp)
                .await
                .map_err(|e| io::Error::new(io::ErrorKind::ConnectionRefused, e))?;
            HttpStream::Tls(tls)
        } else {
            HttpStream::Plain(tcp)
        };
        Ok(HttpConnection::new(stream, config.progress_interval))
    }
}
