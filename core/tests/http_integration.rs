/*
 * http_integration.rs
 * Copyright (C) 2026 Chris Burdess
 *
 * Integration tests for the blocking HTTP request path. Each test starts an in-process
 * HTTP/1.1 server on a tokio runtime, then drives the full orchestrator → controller →
 * transport pipeline against it from the test thread.
 *
 * Run with:
 *   cargo test -p httpcall_core --test http_integration -- --nocapture
 * The real-network test is ignored by default:
 *   cargo test -p httpcall_core --test http_integration -- --ignored
 */

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::runtime::Runtime;

use httpcall_core::{
    http_request, CancelToken, HostValue, HttpTransport, Interrupt, NeverInterrupt,
    RequestOrchestrator, TransferResult, TransportConfig,
};

/// One scripted reply: raw bytes written after the request is read, then how long to keep the
/// connection open before closing it.
struct Reply {
    bytes: String,
    hold: Duration,
}

fn reply(bytes: &str) -> Reply {
    Reply {
        bytes: bytes.to_string(),
        hold: Duration::ZERO,
    }
}

fn runtime() -> Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .unwrap()
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Read one request (head plus Content-Length body) and return it as text.
async fn read_request(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut tmp = [0u8; 1024];
    loop {
        if let Some(end) = find(&buf, b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&buf[..end]).into_owned();
            let body_len = head
                .lines()
                .find_map(|l| {
                    let (n, v) = l.split_once(':')?;
                    if n.eq_ignore_ascii_case("content-length") {
                        v.trim().parse::<usize>().ok()
                    } else {
                        None
                    }
                })
                .unwrap_or(0);
            while buf.len() < end + 4 + body_len {
                let n = stream.read(&mut tmp).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&tmp[..n]);
            }
            return String::from_utf8_lossy(&buf).into_owned();
        }
        let n = stream.read(&mut tmp).await.unwrap();
        if n == 0 {
            return String::from_utf8_lossy(&buf).into_owned();
        }
        buf.extend_from_slice(&tmp[..n]);
    }
}

/// Serve one reply per accepted connection, in order. Returns the base URL and the requests
/// received so far.
fn serve(rt: &Runtime, replies: Vec<Reply>) -> (String, Arc<Mutex<Vec<String>>>) {
    let listener = rt.block_on(TcpListener::bind("127.0.0.1:0")).unwrap();
    let port = listener.local_addr().unwrap().port();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let recorded = seen.clone();
    rt.spawn(async move {
        for reply in replies {
            let (mut stream, _) = match listener.accept().await {
                Ok(s) => s,
                Err(_) => return,
            };
            let request = read_request(&mut stream).await;
            recorded.lock().unwrap().push(request);
            let _ = stream.write_all(reply.bytes.as_bytes()).await;
            let _ = stream.flush().await;
            if !reply.hold.is_zero() {
                tokio::time::sleep(reply.hold).await;
            }
            let _ = stream.shutdown().await;
        }
    });
    (format!("http://127.0.0.1:{}", port), seen)
}

fn call(
    rt: &Runtime,
    interrupt: &dyn Interrupt,
    method: &str,
    url: &str,
    headers: Option<&HostValue>,
    body: Option<&str>,
) -> TransferResult {
    let transport = HttpTransport::with_runtime_handle(rt.handle().clone());
    call_with(transport, interrupt, method, url, headers, body)
}

fn call_with(
    transport: HttpTransport,
    interrupt: &dyn Interrupt,
    method: &str,
    url: &str,
    headers: Option<&HostValue>,
    body: Option<&str>,
) -> TransferResult {
    let body = body.map(HostValue::from);
    RequestOrchestrator::new(transport, interrupt)
        .execute(
            Some(&HostValue::from(method)),
            Some(&HostValue::from(url)),
            headers,
            body.as_ref(),
        )
        .unwrap()
}

fn values(result: &TransferResult, name: &str) -> Vec<String> {
    result
        .headers
        .get(name)
        .map(|v| v.values().to_vec())
        .unwrap_or_default()
}

#[test]
fn get_collects_status_headers_and_body() {
    let rt = runtime();
    let (base, seen) = serve(
        &rt,
        vec![reply(
            "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nSet-Cookie: a=1\r\n\
             Set-Cookie: b=2\r\nContent-Length: 5\r\n\r\nhello",
        )],
    );
    let result = call(&rt, &NeverInterrupt, "GET", &format!("{}/path?q=1", base), None, None);
    assert!(result.success);
    assert_eq!(result.status, 200);
    assert_eq!(result.body, "hello");
    assert_eq!(values(&result, "content-type"), vec!["text/plain"]);
    assert_eq!(values(&result, "set-cookie"), vec!["a=1", "b=2"]);

    let requests = seen.lock().unwrap();
    assert!(requests[0].starts_with("GET /path?q=1 HTTP/1.1\r\n"));
    assert!(requests[0].contains(&format!("Host: {}\r\n", base.trim_start_matches("http://"))));
    assert!(requests[0].contains("Accept: */*\r\n"));
    assert!(!requests[0].contains("Content-Length"));
}

#[test]
fn post_sends_encoded_headers_and_body() {
    let rt = runtime();
    let (base, seen) = serve(
        &rt,
        vec![reply("HTTP/1.1 201 Created\r\nContent-Length: 0\r\n\r\n")],
    );
    let headers = HostValue::from(serde_json::json!({
        "Content-Type": "application/json",
        "X-Multi": ["1", 2],
    }));
    let result = call(
        &rt,
        &NeverInterrupt,
        "POST",
        &format!("{}/items", base),
        Some(&headers),
        Some("{\"a\":1}"),
    );
    assert!(result.success);
    assert_eq!(result.status, 201);
    assert_eq!(result.body, "");

    let requests = seen.lock().unwrap();
    let request = &requests[0];
    assert!(request.starts_with("POST /items HTTP/1.1\r\n"));
    assert!(request.contains("Content-Type: application/json\r\n"));
    assert!(request.contains("X-Multi: 1\r\nX-Multi: 2\r\n"));
    assert!(request.contains("Content-Length: 7\r\n"));
    assert!(request.ends_with("\r\n\r\n{\"a\":1}"));
}

#[test]
fn chunked_body_is_decoded() {
    let rt = runtime();
    let (base, _) = serve(
        &rt,
        vec![reply(
            "HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n\
             5\r\nhello\r\n7\r\n, world\r\n0\r\n\r\n",
        )],
    );
    let result = call(&rt, &NeverInterrupt, "GET", &base, None, None);
    assert!(result.success);
    assert_eq!(result.body, "hello, world");
}

#[test]
fn error_status_is_a_successful_transfer() {
    let rt = runtime();
    let (base, _) = serve(
        &rt,
        vec![reply("HTTP/1.1 404 Not Found\r\nContent-Length: 9\r\n\r\nnot found")],
    );
    let result = call(&rt, &NeverInterrupt, "GET", &format!("{}/missing", base), None, None);
    assert!(result.success);
    assert_eq!(result.status, 404);
    assert_eq!(result.body, "not found");
}

#[test]
fn body_read_until_close() {
    let rt = runtime();
    let (base, _) = serve(&rt, vec![reply("HTTP/1.0 200 OK\r\nX-Old: yes\r\n\r\nuntil eof")]);
    let result = call(&rt, &NeverInterrupt, "GET", &base, None, None);
    assert!(result.success);
    assert_eq!(result.body, "until eof");
    assert_eq!(values(&result, "x-old"), vec!["yes"]);
}

#[test]
fn interim_response_is_skipped() {
    let rt = runtime();
    let (base, _) = serve(
        &rt,
        vec![reply(
            "HTTP/1.1 100 Continue\r\nX-Interim: 1\r\n\r\n\
             HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\nok",
        )],
    );
    let result = call(&rt, &NeverInterrupt, "PUT", &base, None, Some("data"));
    assert_eq!(result.status, 200);
    assert_eq!(result.body, "ok");
    assert!(result.headers.get("x-interim").is_none());
}

#[test]
fn head_does_not_wait_for_a_body() {
    let rt = runtime();
    let (base, _) = serve(
        &rt,
        vec![Reply {
            bytes: "HTTP/1.1 200 OK\r\nContent-Length: 1234\r\n\r\n".to_string(),
            hold: Duration::from_secs(10),
        }],
    );
    let started = Instant::now();
    let result = call(&rt, &NeverInterrupt, "HEAD", &base, None, None);
    assert!(started.elapsed() < Duration::from_secs(5));
    assert!(result.success);
    assert_eq!(result.body, "");
    assert_eq!(values(&result, "content-length"), vec!["1234"]);
}

#[test]
fn redirects_are_followed_and_hidden() {
    let rt = runtime();
    let (base, seen) = serve(
        &rt,
        vec![
            reply("HTTP/1.1 307 Temporary Redirect\r\nLocation: /b\r\nContent-Length: 3\r\n\r\nold"),
            reply("HTTP/1.1 303 See Other\r\nLocation: c?x=1\r\nContent-Length: 0\r\n\r\n"),
            reply("HTTP/1.1 200 OK\r\nContent-Length: 4\r\n\r\ndone"),
        ],
    );
    let result = call(&rt, &NeverInterrupt, "POST", &format!("{}/a", base), None, Some("x=1"));
    assert!(result.success);
    assert_eq!(result.status, 200);
    assert_eq!(result.body, "done");
    assert!(result.headers.get("location").is_none());

    let requests = seen.lock().unwrap();
    assert_eq!(requests.len(), 3);
    assert!(requests[0].starts_with("POST /a HTTP/1.1\r\n"));
    assert!(requests[1].starts_with("POST /b HTTP/1.1\r\n"));
    assert!(requests[1].ends_with("\r\n\r\nx=1"));
    assert!(requests[2].starts_with("GET /c?x=1 HTTP/1.1\r\n"));
    assert!(requests[2].ends_with("\r\n\r\n"));
}

#[test]
fn multiple_choices_with_location_is_followed() {
    let rt = runtime();
    let (base, seen) = serve(
        &rt,
        vec![
            reply("HTTP/1.1 300 Multiple Choices\r\nLocation: /final\r\nContent-Length: 4\r\n\r\npick"),
            reply("HTTP/1.1 200 OK\r\nContent-Length: 4\r\n\r\ndone"),
        ],
    );
    let result = call(&rt, &NeverInterrupt, "GET", &base, None, None);
    assert!(result.success);
    assert_eq!(result.status, 200);
    assert_eq!(result.body, "done");
    let requests = seen.lock().unwrap();
    assert_eq!(requests.len(), 2);
    assert!(requests[1].starts_with("GET /final HTTP/1.1\r\n"));
}

#[test]
fn body_shorter_than_huge_length_fails() {
    let rt = runtime();
    let (base, _) = serve(
        &rt,
        vec![reply("HTTP/1.1 200 OK\r\nContent-Length: 18446744073709551615\r\n\r\nshort")],
    );
    let result = call(&rt, &NeverInterrupt, "GET", &base, None, None);
    assert_eq!(result, TransferResult::failure());
}

#[test]
fn too_many_redirects_fails() {
    let rt = runtime();
    let loop_reply = || reply("HTTP/1.1 302 Found\r\nLocation: /again\r\nContent-Length: 0\r\n\r\n");
    let (base, seen) = serve(&rt, vec![loop_reply(), loop_reply(), loop_reply()]);
    let transport = HttpTransport::with_runtime_handle(rt.handle().clone())
        .with_config(TransportConfig::default().with_max_redirects(2));
    let result = call_with(transport, &NeverInterrupt, "GET", &base, None, None);
    assert_eq!(result, TransferResult::failure());
    assert_eq!(seen.lock().unwrap().len(), 3);
}

#[test]
fn refused_connection_yields_failure_shape() {
    let rt = runtime();
    let port = {
        let listener = rt.block_on(TcpListener::bind("127.0.0.1:0")).unwrap();
        listener.local_addr().unwrap().port()
    };
    let result = http_request(
        HttpTransport::with_runtime_handle(rt.handle().clone()),
        &NeverInterrupt,
        &HostValue::from("GET"),
        &HostValue::from(format!("http://127.0.0.1:{}/", port)),
        None,
        None,
    )
    .unwrap();
    assert_eq!(
        result,
        HostValue::from(serde_json::json!({
            "success": false, "status": 0, "headers": {}, "body": ""
        }))
    );
}

#[test]
fn unsupported_scheme_yields_failure_shape() {
    let rt = runtime();
    let result = call(&rt, &NeverInterrupt, "GET", "gopher://h.test/", None, None);
    assert_eq!(result, TransferResult::failure());
}

#[test]
fn interrupt_aborts_a_stalled_transfer() {
    let rt = runtime();
    let (base, _) = serve(
        &rt,
        vec![Reply {
            bytes: "HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\npartial".to_string(),
            hold: Duration::from_secs(30),
        }],
    );
    let token = CancelToken::new();
    let remote = token.clone();
    let canceller = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(300));
        remote.cancel();
    });
    let started = Instant::now();
    let result = call(&rt, &token, "GET", &base, None, None);
    canceller.join().unwrap();
    assert!(started.elapsed() < Duration::from_secs(10));
    assert_eq!(result, TransferResult::failure());
}

#[test]
fn custom_progress_interval_polls_interrupt() {
    let rt = runtime();
    let (base, _) = serve(
        &rt,
        vec![Reply {
            bytes: "HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\npartial".to_string(),
            hold: Duration::from_secs(30),
        }],
    );
    let polls = std::sync::atomic::AtomicUsize::new(0);
    let interrupt = || polls.fetch_add(1, std::sync::atomic::Ordering::SeqCst) >= 5;
    let transport = HttpTransport::with_runtime_handle(rt.handle().clone())
        .with_config(TransportConfig::default().with_progress_interval(Duration::from_millis(10)));
    let started = Instant::now();
    let result = call_with(transport, &interrupt, "GET", &base, None, None);
    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(result, TransferResult::failure());
}

#[test]
#[ignore]
fn real_https_get() {
    let rt = runtime();
    let result = call(&rt, &NeverInterrupt, "GET", "https://example.com/", None, None);
    eprintln!("status={} headers={} body_len={}", result.status, result.headers.len(), result.body.len());
    assert!(result.success);
    assert_eq!(result.status, 200);
    assert!(result.body.contains("Example Domain"));
}
