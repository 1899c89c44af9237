//! Request-level types: HTTP verbs and per-call options.

use crate::error::GraphError;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// HTTP verbs accepted by the Graph API.
///
/// The set is closed: anything else is rejected before a request is built.
/// String input (e.g. verbs read from configuration) goes through
/// [`FromStr`], which is the fail-fast validation path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    /// Wire name of the verb.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }

    /// Whether requests with this verb carry a JSON body (POST/PUT/PATCH).
    pub const fn has_body(self) -> bool {
        matches!(self, Self::Post | Self::Put | Self::Patch)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "PATCH" => Ok(Self::Patch),
            "DELETE" => Ok(Self::Delete),
            _ => Err(GraphError::InvalidMethod(s.to_string())),
        }
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Per-call options for [`crate::GraphClient::call`] and the verb
/// convenience methods.
///
/// All fields are optional; `RequestOptions::new()` is a plain request with
/// the client's stored token and no extra headers, params or body.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub(crate) token: Option<String>,
    pub(crate) headers: HashMap<String, String>,
    pub(crate) params: Vec<(String, String)>,
    pub(crate) body: Option<Value>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the client's stored bearer token for this call only.
    pub fn token<S: Into<String>>(mut self, token: S) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Add an extra header. Auth and content headers set by the dispatcher
    /// win over a caller header of the same name.
    pub fn header<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Append a query parameter. Order is preserved on the wire.
    pub fn param<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Attach a JSON body. Only sent on mutation verbs; see
    /// [`crate::body::BodyFormatter`].
    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}
