/*
 * host.rs
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

//! Host value model: the container types a scripting host passes in and receives back.
//!
//! Dictionaries keep insertion order. JSON is the interchange form at the FFI boundary.

use std::borrow::Cow;

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use serde_json::{Map, Number, Value};

/// A value owned by the embedding host.
#[derive(Debug, Clone, PartialEq)]
pub enum HostValue {
    Null,
    Bool(bool),
    Number(i64),
    Float(f64),
    String(String),
    List(Vec<HostValue>),
    Dict(Vec<(String, HostValue)>),
}

impl HostValue {
    /// Read the value as a string the way the host's string coercion does: strings as-is,
    /// integers as decimal text. Anything else is unreadable.
    pub fn as_host_string(&self) -> Option<Cow<'_, str>> {
        match self {
            HostValue::String(s) => Some(Cow::Borrowed(s)),
            HostValue::Number(n) => Some(Cow::Owned(n.to_string())),
            _ => None,
        }
    }

    /// Look up a dictionary entry by exact key.
    pub fn get(&self, key: &str) -> Option<&HostValue> {
        match self {
            HostValue::Dict(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            HostValue::Null => Value::Null,
            HostValue::Bool(b) => Value::Bool(*b),
            HostValue::Number(n) => Value::Number((*n).into()),
            HostValue::Float(f) => Number::from_f64(*f).map(Value::Number).unwrap_or(Value::Null),
            HostValue::String(s) => Value::String(s.clone()),
            HostValue::List(items) => Value::Array(items.iter().map(HostValue::to_json).collect()),
            HostValue::Dict(entries) => {
                let mut map = Map::new();
                for (k, v) in entries {
                    map.insert(k.clone(), v.to_json());
                }
                Value::Object(map)
            }
        }
    }
}

impl From<Value> for HostValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => HostValue::Null,
            Value::Bool(b) => HostValue::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => HostValue::Number(i),
                None => HostValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => HostValue::String(s),
            Value::Array(items) => HostValue::List(items.into_iter().map(HostValue::from).collect()),
            Value::Object(map) => {
                HostValue::Dict(map.into_iter().map(|(k, v)| (k, HostValue::from(v))).collect())
            }
        }
    }
}

impl From<&str> for HostValue {
    fn from(s: &str) -> Self {
        HostValue::String(s.to_string())
    }
}

impl From<String> for HostValue {
    fn from(s: String) -> Self {
        HostValue::String(s)
    }
}

impl Serialize for HostValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            HostValue::Null => serializer.serialize_unit(),
            HostValue::Bool(b) => serializer.serialize_bool(*b),
            HostValue::Number(n) => serializer.serialize_i64(*n),
            HostValue::Float(f) => serializer.serialize_f64(*f),
            HostValue::String(s) => serializer.serialize_str(s),
            HostValue::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            HostValue::Dict(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (k, v) in entries {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}
