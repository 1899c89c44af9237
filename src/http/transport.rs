//! HTTP transport abstraction.
//!
//! The dispatcher talks to the network through an injectable transport, so
//! tests and callers with special needs can observe the final
//! method/URL/headers/body and return a synthetic response without going
//! through `reqwest`. Response parsing (BOM stripping, key normalization)
//! happens above this seam and applies to every transport uniformly.

use crate::error::GraphError;
use crate::types::Method;
use async_trait::async_trait;
use reqwest::header::HeaderMap;

/// Transport-level request data.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    /// Query parameters, serialized by the transport. Batch members carry
    /// their query string inside `url` instead.
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

/// Transport-level response data: a status code and the raw body bytes.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Pluggable HTTP transport.
///
/// Timeouts and cancellation are the transport's business; the client layer
/// defines neither.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, GraphError>;
}

/// Default transport backed by `reqwest`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Wrap a caller-supplied `reqwest::Client` (connection pool, proxy and
    /// timeout settings carry over).
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, GraphError> {
        let mut builder = self
            .client
            .request(request.method.into(), &request.url)
            .headers(request.headers);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| GraphError::Http(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| GraphError::Http(e.to_string()))?;

        Ok(TransportResponse {
            status,
            body: body.to_vec(),
        })
    }
}
