//! Outgoing payload key formatting.
//!
//! Graph resource bodies are written snake_case on the Rust side and
//! camelCase on the wire (`number_format` -> `numberFormat`). The formatter
//! renames only the top-level keys of the payload, which matches the shape
//! of Graph resource update bodies; values are passed through untouched.

use crate::types::Method;
use serde_json::Value;

/// Formats outgoing JSON payload keys for mutation requests.
///
/// Constructed once and held by the dispatcher and the batch engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct BodyFormatter;

impl BodyFormatter {
    /// Returns the wire-ready body, or `None` when no payload is sent.
    ///
    /// GET and DELETE never carry a body, even if one was supplied.
    /// Non-object bodies pass through unchanged.
    pub fn format(&self, body: Option<&Value>, method: Method) -> Option<Value> {
        if !method.has_body() {
            return None;
        }
        let body = body?;
        match body {
            Value::Object(map) => Some(Value::Object(
                map.iter().map(|(k, v)| (camelize(k), v.clone())).collect(),
            )),
            other => Some(other.clone()),
        }
    }
}

/// Keys without underscores pass through untouched, so an already
/// camel-cased key is stable. Slash-qualified keys (path-addressed
/// properties) have each path component renamed independently, keeping the
/// literal `/` separator.
fn camelize(key: &str) -> String {
    if !key.contains('_') {
        return key.to_string();
    }
    key.split('/')
        .map(camelize_component)
        .collect::<Vec<_>>()
        .join("/")
}

fn camelize_component(component: &str) -> String {
    let mut out = String::with_capacity(component.len());
    let mut segments = component.split('_');
    if let Some(first) = segments.next() {
        let mut chars = first.chars();
        if let Some(c) = chars.next() {
            out.extend(c.to_lowercase());
            out.push_str(chars.as_str());
        }
    }
    for segment in segments {
        let mut chars = segment.chars();
        if let Some(c) = chars.next() {
            out.extend(c.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}
