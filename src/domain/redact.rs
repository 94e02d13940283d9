//! Allowlist-based redaction of event payloads.
//!
//! Redaction decisions are made at the parent mapping, per key:
//! - allowed key: the value is kept and redacted recursively
//! - any other key: the value becomes `"[REDACTED]"`, whatever its type
//!
//! Sequences are redacted element-wise for mapping elements only; scalars and
//! nested sequences inside a sequence pass through. Scalars are never
//! inspected. The walk is total over `serde_json::Value` and never mutates its
//! input.

use crate::domain::allowlist::AllowList;
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Marker replacing the value of every field that is not allowed.
pub const REDACTED: &str = "[REDACTED]";

/// Redact `value` against `allowlist`.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use workflow_logger::{redact, AllowList};
///
/// let allowlist = AllowList::new(["id", "email"]);
/// let redacted = redact(
///     &json!({"id": "123", "email": "user@example.com", "password": "secret123"}),
///     &allowlist,
/// );
/// assert_eq!(
///     redacted,
///     json!({"id": "123", "email": "user@example.com", "password": "[REDACTED]"})
/// );
/// ```
pub fn redact(value: &Value, allowlist: &AllowList) -> Value {
    walk(value, "", &|key, path| allowlist.allows(key, path), &NoUnwrap)
}

/// List the dotted paths `redact` would replace, in document order.
pub fn collect_redacted_paths(value: &Value, allowlist: &AllowList) -> Vec<String> {
    let mut paths = Vec::new();
    collect(value, "", allowlist, &NoUnwrap, &mut paths);
    paths
}

/// Reusable redactor bound to one allowlist.
///
/// Adds an opt-in mode for payloads that carry a serialized JSON document
/// inside a string (an HTTP `body`, typically): keys in the embedded-JSON set
/// have their string value parsed and redacted as structure instead of being
/// replaced wholesale. The embedded document is its own root: path entries
/// and patterns match relative to it (`data.id`, not `body.data.id`). Only a
/// JSON object is unwrapped; arrays, scalars and other strings are replaced
/// with the marker.
#[derive(Debug, Clone)]
pub struct Redactor {
    allowlist: Arc<AllowList>,
    embedded_json_keys: BTreeSet<String>,
}

impl Redactor {
    /// Create a redactor for an allowlist.
    pub fn new(allowlist: Arc<AllowList>) -> Self {
        Self {
            allowlist,
            embedded_json_keys: BTreeSet::new(),
        }
    }

    /// Parse and redact JSON documents embedded in string values of these keys.
    pub fn with_embedded_json_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.embedded_json_keys = keys
            .into_iter()
            .map(|key| key.as_ref().to_ascii_lowercase())
            .filter(|key| !key.is_empty())
            .collect();
        self
    }

    /// The allowlist in use.
    pub fn allowlist(&self) -> &AllowList {
        &self.allowlist
    }

    /// Redact any JSON value.
    pub fn redact(&self, value: &Value) -> Value {
        walk(
            value,
            "",
            &|key, path| self.allowlist.allows(key, path),
            &self.unwrapper(),
        )
    }

    /// Redact a mapping, returning a mapping.
    pub fn redact_fields(&self, fields: &Map<String, Value>) -> Map<String, Value> {
        redact_map(
            fields,
            "",
            &|key, path| self.allowlist.allows(key, path),
            &self.unwrapper(),
        )
    }

    /// Dotted paths that `redact` replaces with the marker.
    pub fn redacted_paths(&self, value: &Value) -> Vec<String> {
        let mut paths = Vec::new();
        collect(value, "", &self.allowlist, &self.unwrapper(), &mut paths);
        paths
    }

    fn unwrapper(&self) -> EmbeddedJson<'_> {
        EmbeddedJson {
            keys: &self.embedded_json_keys,
        }
    }
}

/// Decides whether a disallowed value may be descended into instead of
/// replaced.
trait Unwrap {
    fn unwrap_value(&self, key: &str, value: &Value) -> Option<Value>;
}

struct NoUnwrap;

impl Unwrap for NoUnwrap {
    fn unwrap_value(&self, _key: &str, _value: &Value) -> Option<Value> {
        None
    }
}

struct EmbeddedJson<'a> {
    keys: &'a BTreeSet<String>,
}

impl Unwrap for EmbeddedJson<'_> {
    fn unwrap_value(&self, key: &str, value: &Value) -> Option<Value> {
        if self.keys.is_empty() || !self.keys.contains(&key.to_ascii_lowercase()) {
            return None;
        }

        let structured = match value {
            Value::Object(_) => value.clone(),
            Value::String(raw) => serde_json::from_str::<Value>(raw).ok()?,
            _ => return None,
        };

        structured.is_object().then_some(structured)
    }
}

fn join_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}

fn walk<A, U>(value: &Value, path: &str, allowed: &A, unwrap: &U) -> Value
where
    A: Fn(&str, &str) -> bool,
    U: Unwrap,
{
    match value {
        Value::Object(map) => Value::Object(redact_map(map, path, allowed, unwrap)),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| match item {
                    Value::Object(_) => walk(item, path, allowed, unwrap),
                    other => other.clone(),
                })
                .collect(),
        ),
        other => other.clone(),
    }
}

fn redact_map<A, U>(map: &Map<String, Value>, path: &str, allowed: &A, unwrap: &U) -> Map<String, Value>
where
    A: Fn(&str, &str) -> bool,
    U: Unwrap,
{
    let mut result = Map::with_capacity(map.len());
    for (key, child) in map {
        let child_path = join_path(path, key);
        let redacted = if allowed(key, &child_path) {
            walk(child, &child_path, allowed, unwrap)
        } else if let Some(embedded) = unwrap.unwrap_value(key, child) {
            walk(&embedded, "", allowed, unwrap)
        } else {
            Value::String(REDACTED.to_string())
        };
        result.insert(key.clone(), redacted);
    }
    result
}

fn collect<U: Unwrap>(
    value: &Value,
    path: &str,
    allowlist: &AllowList,
    unwrap: &U,
    out: &mut Vec<String>,
) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let child_path = join_path(path, key);
                if allowlist.allows(key, &child_path) {
                    collect(child, &child_path, allowlist, unwrap, out);
                } else if let Some(embedded) = unwrap.unwrap_value(key, child) {
                    let mut nested = Vec::new();
                    collect(&embedded, "", allowlist, unwrap, &mut nested);
                    out.extend(nested.iter().map(|inner| join_path(&child_path, inner)));
                } else {
                    out.push(child_path);
                }
            }
        }
        Value::Array(items) => {
            for item in items.iter().filter(|item| item.is_object()) {
                collect(item, path, allowlist, unwrap, out);
            }
        }
        _ => {}
    }
}
