/*
 * headers.rs
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

//! Header codec: outgoing `Name: Value` lines from a host dictionary, and folding of incoming
//! raw header lines into a case-insensitive, order-preserving collection.

use std::borrow::Cow;

use indexmap::IndexMap;

use crate::error::RequestError;
use crate::host::HostValue;

/// One logical header's value(s). A second occurrence promotes `Single` to `Multi`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderValue {
    Single(String),
    Multi(Vec<String>),
}

impl HeaderValue {
    /// Return the value with `next` appended, promoting a scalar to a list.
    pub fn appended(self, next: String) -> HeaderValue {
        match self {
            HeaderValue::Single(first) => HeaderValue::Multi(vec![first, next]),
            HeaderValue::Multi(mut values) => {
                values.push(next);
                HeaderValue::Multi(values)
            }
        }
    }

    /// All values in arrival order.
    pub fn values(&self) -> &[String] {
        match self {
            HeaderValue::Single(v) => std::slice::from_ref(v),
            HeaderValue::Multi(vs) => vs,
        }
    }

    /// First value, if any (an empty `Multi` has none).
    pub fn first(&self) -> Option<&str> {
        self.values().first().map(String::as_str)
    }

    pub fn to_host_value(&self) -> HostValue {
        match self {
            HeaderValue::Single(v) => HostValue::String(v.clone()),
            HeaderValue::Multi(vs) => {
                HostValue::List(vs.iter().cloned().map(HostValue::String).collect())
            }
        }
    }
}

/// Header name → value(s). Lookup ignores ASCII case; iteration follows first occurrence.
///
/// Keyed by the lowercased name so each line folds in constant time; the first spelling seen
/// is kept for encoding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderCollection {
    entries: IndexMap<String, (String, HeaderValue)>,
}

fn normalize(name: &str) -> Cow<'_, str> {
    if name.bytes().any(|b| b.is_ascii_uppercase()) {
        Cow::Owned(name.to_ascii_lowercase())
    } else {
        Cow::Borrowed(name)
    }
}

impl HeaderCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&HeaderValue> {
        self.entries.get(&*normalize(name)).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &HeaderValue)> {
        self.entries.values().map(|(k, v)| (k.as_str(), v))
    }

    /// Add a value under `name`. An existing entry (any case) keeps its spelling and position
    /// and is promoted to a list.
    pub fn append(&mut self, name: &str, value: String) {
        match self.entries.get_mut(&*normalize(name)) {
            Some((_, slot)) => {
                let current = std::mem::replace(slot, HeaderValue::Multi(Vec::new()));
                *slot = current.appended(value);
            }
            None => {
                self.entries.insert(
                    name.to_ascii_lowercase(),
                    (name.to_string(), HeaderValue::Single(value)),
                );
            }
        }
    }

    /// Insert a whole value under `name` (outgoing construction). Merges into an existing entry.
    pub fn insert(&mut self, name: &str, value: HeaderValue) {
        match value {
            HeaderValue::Single(v) => self.append(name, v),
            HeaderValue::Multi(vs) => {
                let key = name.to_ascii_lowercase();
                if self.entries.contains_key(&key) {
                    for v in vs {
                        self.append(name, v);
                    }
                } else {
                    self.entries.insert(key, (name.to_string(), HeaderValue::Multi(vs)));
                }
            }
        }
    }

    /// Fold one raw response header line. Lines without a colon (status line, blank
    /// terminator) are ignored and `false` is returned.
    ///
    /// The name is everything before the first colon, lowercased. The value drops leading
    /// spaces/tabs and trailing CR/LF; inner whitespace is kept.
    pub fn fold_line(&mut self, raw: &[u8]) -> bool {
        let colon = match raw.iter().position(|&b| b == b':') {
            Some(i) => i,
            None => return false,
        };
        let name = String::from_utf8_lossy(&raw[..colon]).to_ascii_lowercase();
        let mut value = &raw[colon + 1..];
        while let [b' ' | b'\t', rest @ ..] = value {
            value = rest;
        }
        while let [rest @ .., b'\r' | b'\n'] = value {
            value = rest;
        }
        let value = String::from_utf8_lossy(value).into_owned();
        self.append(&name, value);
        true
    }

    /// Encode as wire lines: one `Name: Value` per scalar, one per list element.
    pub fn encode_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for (name, value) in self.entries.values() {
            for v in value.values() {
                lines.push(format!("{}: {}", name, v));
            }
        }
        lines
    }

    /// Build an outgoing collection from the host's header argument. `Null` means no headers.
    pub fn from_host(arg: &HostValue) -> Result<HeaderCollection, RequestError> {
        let entries = match arg {
            HostValue::Null => return Ok(HeaderCollection::new()),
            HostValue::Dict(entries) => entries,
            _ => {
                return Err(RequestError::InvalidArgumentType {
                    argument: "headers",
                })
            }
        };
        let mut headers = HeaderCollection::new();
        for (key, value) in entries {
            let invalid = || RequestError::InvalidHeaderValue { key: key.clone() };
            match value {
                HostValue::String(s) => headers.append(key, s.clone()),
                HostValue::List(items) => {
                    let values = items
                        .iter()
                        .map(|item| item.as_host_string().map(|s| s.into_owned()))
                        .collect::<Option<Vec<String>>>()
                        .ok_or_else(invalid)?;
                    headers.insert(key, HeaderValue::Multi(values));
                }
                _ => return Err(invalid()),
            }
        }
        Ok(headers)
    }

    pub fn to_host_value(&self) -> HostValue {
        HostValue::Dict(
            self.entries
                .values()
                .map(|(k, v)| (k.clone(), v.to_host_value()))
                .collect(),
        )
    }
}
