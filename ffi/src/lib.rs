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

//! C FFI for httpcall core. One blocking HTTP request per call; arguments and result cross the
//! boundary as UTF-8 NUL-terminated strings, structured values as JSON.
//! Returned strings are newly allocated (free with httpcall_free_string).

use libc::{c_char, c_int, c_void};
use std::ffi::{CStr, CString};
use std::fmt::Display;
use std::ptr;
use std::sync::RwLock;

use httpcall_core::{
    CancelToken, HostValue, HttpTransport, Interrupt, RequestError, RequestOrchestrator,
    TransportConfig,
};

/// Host interrupt poll: return non-zero to abort the request in flight. Called on the thread
/// that made the request, at every progress tick.
type InterruptCheck = extern "C" fn(*mut c_void) -> c_int;

/// Shared state for all calls. Hosts the tokio runtime that drives the HTTP I/O.
struct Registry {
    runtime: tokio::runtime::Runtime,
    interrupt: CancelToken,
    config: RwLock<TransportConfig>,
}

fn registry() -> Result<&'static Registry, String> {
    static REGISTRY: once_cell::sync::OnceCell<Registry> = once_cell::sync::OnceCell::new();
    REGISTRY.get_or_try_init(|| {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .map_err(|e| format!("failed to create tokio runtime: {}", e))?;
        Ok(Registry {
            runtime,
            interrupt: CancelToken::new(),
            config: RwLock::new(TransportConfig::default()),
        })
    })
}

fn ptr_to_str(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string()) }
}

thread_local! {
    static LAST_ERROR: std::cell::RefCell<Option<CString>> = std::cell::RefCell::new(None);
}

fn set_last_error(err: &dyn Display) {
    let msg = CString::new(err.to_string().replace('\0', " ")).unwrap_or_default();
    LAST_ERROR.with(|e| *e.borrow_mut() = Some(msg));
}

fn clear_last_error() {
    LAST_ERROR.with(|e| *e.borrow_mut() = None);
}

fn to_c_string(s: String) -> *mut c_char {
    match CString::new(s) {
        Ok(c) => c.into_raw(),
        Err(e) => {
            set_last_error(&e);
            ptr::null_mut()
        }
    }
}

/// Interrupt source for one call: the process-wide flag, plus the host's poll if given.
struct HostInterrupt<'a> {
    token: &'a CancelToken,
    check: Option<(InterruptCheck, *mut c_void)>,
}

impl Interrupt for HostInterrupt<'_> {
    fn is_interrupted(&self) -> bool {
        if self.token.is_cancelled() {
            return true;
        }
        match self.check {
            Some((check, user_data)) => check(user_data) != 0,
            None => false,
        }
    }
}

/// Decode C arguments into host values. NULL means absent; strings that are not UTF-8 read as
/// absent (method, url) or as the wrong type (headers, body).
fn host_args(
    method: *const c_char,
    url: *const c_char,
    headers_json: *const c_char,
    body: *const c_char,
) -> Result<[Option<HostValue>; 4], RequestError> {
    let method = ptr_to_str(method).map(HostValue::from);
    let url = ptr_to_str(url).map(HostValue::from);
    let headers = if headers_json.is_null() {
        None
    } else {
        let text = ptr_to_str(headers_json)
            .ok_or(RequestError::InvalidArgumentType { argument: "headers" })?;
        let value: serde_json::Value = serde_json::from_str(&text)
            .map_err(|_| RequestError::InvalidArgumentType { argument: "headers" })?;
        Some(HostValue::from(value))
    };
    let body = if body.is_null() {
        None
    } else {
        Some(
            ptr_to_str(body)
                .map(HostValue::from)
                .ok_or(RequestError::InvalidArgumentType { argument: "body" })?,
        )
    };
    Ok([method, url, headers, body])
}

fn request(
    method: *const c_char,
    url: *const c_char,
    headers_json: *const c_char,
    body: *const c_char,
    check: Option<(InterruptCheck, *mut c_void)>,
) -> *mut c_char {
    clear_last_error();
    let reg = match registry() {
        Ok(r) => r,
        Err(e) => {
            set_last_error(&e);
            return ptr::null_mut();
        }
    };
    let [method, url, headers, body] = match host_args(method, url, headers_json, body) {
        Ok(args) => args,
        Err(e) => {
            set_last_error(&e);
            return ptr::null_mut();
        }
    };
    let config = match reg.config.read() {
        Ok(c) => c.clone(),
        Err(_) => TransportConfig::default(),
    };
    let transport = HttpTransport::with_runtime_handle(reg.runtime.handle().clone()).with_config(config);
    let interrupt = HostInterrupt {
        token: &reg.interrupt,
        check,
    };
    let result = RequestOrchestrator::new(transport, &interrupt).execute(
        method.as_ref(),
        url.as_ref(),
        headers.as_ref(),
        body.as_ref(),
    );
    match result {
        Ok(result) => match serde_json::to_string(&result.into_host_value()) {
            Ok(json) => to_c_string(json),
            Err(e) => {
                set_last_error(&e);
                ptr::null_mut()
            }
        },
        Err(e) => {
            set_last_error(&e);
            ptr::null_mut()
        }
    }
}

/// Version string (static, do not free).
#[no_mangle]
pub extern "C" fn httpcall_version() -> *const c_char {
    b"0.1.0\0".as_ptr() as *const c_char
}

/// Last error message from a failed call. Valid until next FFI call. Do not free.
#[no_mangle]
pub extern "C" fn httpcall_last_error() -> *const c_char {
    LAST_ERROR.with(|e| {
        e.borrow()
            .as_ref()
            .map(|s| s.as_ptr())
            .unwrap_or(ptr::null())
    })
}

/// Free a string returned by httpcall_request or httpcall_request_with_interrupt. No-op if ptr
/// is NULL.
#[no_mangle]
pub unsafe extern "C" fn httpcall_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        let _ = CString::from_raw(ptr);
    }
}

/// Perform one HTTP request and block until it completes or fails.
///
/// method, url: required. headers_json: NULL or a JSON object whose values are strings or
/// arrays of strings/integers. body: NULL or the request body text.
///
/// Returns a JSON object `{"success", "status", "headers", "body"}`; a failed transfer is
/// `{"success":false,"status":0,"headers":{},"body":""}`. Returns NULL only for invalid
/// arguments (see httpcall_last_error).
#[no_mangle]
pub extern "C" fn httpcall_request(
    method: *const c_char,
    url: *const c_char,
    headers_json: *const c_char,
    body: *const c_char,
) -> *mut c_char {
    request(method, url, headers_json, body, None)
}

/// As httpcall_request, with a host interrupt poll. `check` may be NULL.
#[no_mangle]
pub extern "C" fn httpcall_request_with_interrupt(
    method: *const c_char,
    url: *const c_char,
    headers_json: *const c_char,
    body: *const c_char,
    check: Option<InterruptCheck>,
    user_data: *mut c_void,
) -> *mut c_char {
    request(method, url, headers_json, body, check.map(|c| (c, user_data)))
}

/// Raise the process-wide interrupt flag. Safe from any thread (e.g. a signal-forwarding
/// thread). The flag stays raised until httpcall_clear_interrupt.
#[no_mangle]
pub extern "C" fn httpcall_interrupt() {
    if let Ok(reg) = registry() {
        reg.interrupt.cancel();
    }
}

#[no_mangle]
pub extern "C" fn httpcall_clear_interrupt() {
    if let Ok(reg) = registry() {
        reg.interrupt.reset();
    }
}

/// Set the redirect limit for subsequent requests. Returns 0 on success, -1 if `max` is
/// negative or the library failed to initialize.
#[no_mangle]
pub extern "C" fn httpcall_set_max_redirects(max: c_int) -> c_int {
    clear_last_error();
    let reg = match registry() {
        Ok(r) => r,
        Err(e) => {
            set_last_error(&e);
            return -1;
        }
    };
    let max = match usize::try_from(max) {
        Ok(m) => m,
        Err(e) => {
            set_last_error(&e);
            return -1;
        }
    };
    match reg.config.write() {
        Ok(mut config) => {
            config.max_redirects = max;
            0
        }
        Err(_) => {
            set_last_error(&"configuration lock poisoned");
            -1
        }
    }
}
