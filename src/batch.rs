//! Batched Graph requests.
//!
//! Graph's `$batch` endpoint answers up to 20 sub-requests in one network
//! round trip. The engine accumulates requests in call order, partitions
//! them into fixed-size chunks, submits each chunk as a single
//! `POST /$batch`, and correlates every returned sub-response with its
//! originating request by correlation id. Chunks are submitted strictly
//! sequentially so a later chunk never races ahead of an earlier one it
//! might depend on.

use crate::client::GraphClient;
use crate::error::GraphError;
use crate::http::url::{escape_path, query_string};
use crate::response::ParsedResponse;
use crate::types::{Method, RequestOptions};
use serde_json::{Map, Value, json};
use std::collections::HashMap;

/// Upper bound on sub-requests per batch submission, per the Graph docs.
pub const DEFAULT_CHUNK_SIZE: usize = 20;

/// One request destined for a batch envelope.
///
/// Construction escapes the endpoint; query parameters are appended to the
/// member URL (the batch wire format has no separate query field). A body
/// force-sets `Accept` and `Content-Type` to JSON on this member — unlike
/// the single-call path, the batch format requires them per member.
#[derive(Debug, Clone)]
pub struct BatchRequest {
    id: String,
    url: String,
    method: Method,
    headers: HashMap<String, String>,
    body: Option<Value>,
    depends_on: Option<String>,
}

impl BatchRequest {
    /// A GET request for `endpoint` with a freshly generated correlation id.
    pub fn new(endpoint: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            url: escape_path(endpoint),
            method: Method::Get,
            headers: HashMap::new(),
            body: None,
            depends_on: None,
        }
    }

    /// Replace the generated correlation id with a caller-supplied one.
    /// Ids must be unique within one batch execution.
    pub fn with_id<S: Into<String>>(mut self, id: S) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn with_header<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Append query parameters to the member URL. Call once per request.
    pub fn with_params(mut self, params: &[(&str, &str)]) -> Self {
        if params.is_empty() {
            return self;
        }
        let pairs: Vec<(String, String)> = params
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self.url = format!("{}?{}", self.url, query_string(&pairs));
        self
    }

    /// Attach a JSON body and force this member's `Accept`/`Content-Type`
    /// headers to `application/json`.
    pub fn with_body(mut self, body: Value) -> Self {
        self.headers
            .insert("Accept".to_string(), "application/json".to_string());
        self.headers
            .insert("Content-Type".to_string(), "application/json".to_string());
        self.body = Some(body);
        self
    }

    /// Require another member of the same batch (named by correlation id)
    /// to execute first. Server-side semantics; the library only threads
    /// the field through — except at chunk boundaries, where it is cleared
    /// (see [`Batch::execute`]).
    pub fn with_depends_on<S: Into<String>>(mut self, id: S) -> Self {
        self.depends_on = Some(id.into());
        self
    }

    /// Correlation id of this member.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Escaped member URL, including any query string.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    pub fn depends_on(&self) -> Option<&str> {
        self.depends_on.as_deref()
    }

    pub(crate) fn clear_depends_on(&mut self) {
        self.depends_on = None;
    }

    /// The member's entry in the `{"requests": [...]}` envelope: `id`,
    /// `url` and `method` always; `headers` only when non-empty; `body`
    /// only when present (keys formatted); `dependsOn` only when set, as a
    /// single-element array.
    pub(crate) fn envelope_entry(&self, formatter: &crate::body::BodyFormatter) -> Value {
        let mut entry = Map::new();
        entry.insert("id".to_string(), Value::String(self.id.clone()));
        entry.insert("url".to_string(), Value::String(self.url.clone()));
        entry.insert(
            "method".to_string(),
            Value::String(self.method.as_str().to_string()),
        );
        if !self.headers.is_empty() {
            entry.insert("headers".to_string(), json!(self.headers));
        }
        if let Some(body) = formatter.format(self.body.as_ref(), self.method) {
            entry.insert("body".to_string(), body);
        }
        if let Some(dep) = &self.depends_on {
            entry.insert("dependsOn".to_string(), json!([dep]));
        }
        Value::Object(entry)
    }
}

/// Pairs a submitted request with its correlated sub-response.
///
/// The sub-response carries the per-member `id`, `status`, `headers` and
/// `body` the server returned.
#[derive(Debug, Clone)]
pub struct BatchResult {
    pub request: BatchRequest,
    pub response: ParsedResponse,
}

impl BatchResult {
    /// Status code of this member's sub-response.
    pub fn status(&self) -> Option<u16> {
        self.response.get_u64("status").map(|s| s as u16)
    }

    /// Body of this member's sub-response.
    pub fn body(&self) -> Option<&Value> {
        self.response.get("body")
    }
}

/// Accumulates batch requests and executes them in chunks.
///
/// Requests are kept in `add` order. Accumulation is single-threaded by
/// design: share a `Batch` across tasks only with external
/// synchronization.
pub struct Batch<'a> {
    client: &'a GraphClient,
    token: Option<String>,
    requests: Vec<BatchRequest>,
    chunk_size: usize,
}

impl<'a> Batch<'a> {
    pub(crate) fn new(client: &'a GraphClient) -> Self {
        Self {
            client,
            token: None,
            requests: Vec::new(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Override the token used for batch submissions; defaults to the
    /// client's stored token.
    pub fn token<S: Into<String>>(&mut self, token: S) -> &mut Self {
        self.token = Some(token.into());
        self
    }

    /// Number of members submitted per round trip, clamped to at least 1.
    /// The service caps batches at [`DEFAULT_CHUNK_SIZE`] members.
    pub fn chunk_size(&mut self, size: usize) -> &mut Self {
        self.chunk_size = size.max(1);
        self
    }

    /// Queue a request. Order of `add` calls is the submission order.
    pub fn add(&mut self, request: BatchRequest) -> &mut Self {
        self.requests.push(request);
        self
    }

    pub fn requests(&self) -> &[BatchRequest] {
        &self.requests
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// Submit all accumulated requests, one `POST /$batch` per chunk,
    /// sequentially and in order.
    ///
    /// The first member of every chunk has its dependency reference
    /// cleared: a chunk boundary breaks the dependency chain, and a
    /// reference into another chunk cannot be honored by the server.
    /// Sub-responses are correlated by id; within a chunk, results follow
    /// the server's return order. A sub-response whose id matches no
    /// submitted member is skipped with a warning. A failed chunk
    /// submission aborts the whole execution; chunks already submitted are
    /// not rolled back.
    pub async fn execute(mut self) -> Result<Vec<BatchResult>, GraphError> {
        let formatter = *self.client.body_formatter();
        let mut results = Vec::with_capacity(self.requests.len());

        for group in self.requests.chunks_mut(self.chunk_size) {
            group[0].clear_depends_on();

            // Last member wins if ids collide; lookups must not crash.
            let by_id: HashMap<&str, &BatchRequest> =
                group.iter().map(|r| (r.id(), r)).collect();
            let entries: Vec<Value> = group
                .iter()
                .map(|r| r.envelope_entry(&formatter))
                .collect();

            let mut options = RequestOptions::new().body(json!({ "requests": entries }));
            if let Some(token) = &self.token {
                options = options.token(token.clone());
            }
            let response = self.client.call(Method::Post, "/$batch", options).await?;

            let Some(responses) = response.get_array("responses") else {
                return Err(GraphError::Parse(
                    "batch response is missing the `responses` array".to_string(),
                ));
            };
            for sub in responses {
                let Some(id) = sub.get("id").and_then(Value::as_str) else {
                    tracing::warn!("batch sub-response has no id; skipping");
                    continue;
                };
                match by_id.get(id) {
                    Some(request) => results.push(BatchResult {
                        request: (*request).clone(),
                        response: ParsedResponse::from_normalized(sub.clone()),
                    }),
                    None => {
                        tracing::warn!(id, "batch sub-response matches no submitted request");
                    }
                }
            }
        }

        Ok(results)
    }
}
