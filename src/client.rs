//! The Graph client: single-call dispatch and the batch entry point.

use crate::batch::{Batch, BatchResult};
use crate::body::BodyFormatter;
use crate::error::{ApiError, ErrorHandler, GraphError, Propagate};
use crate::http::headers::build_headers;
use crate::http::transport::{HttpTransport, ReqwestTransport, TransportRequest};
use crate::http::url::escape_path;
use crate::response::ParsedResponse;
use crate::types::{Method, RequestOptions};
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;

/// Production Graph endpoint.
pub const GRAPH_HOST: &str = "https://graph.microsoft.com";

/// Default API version segment.
pub const DEFAULT_VERSION: &str = "1.0";

/// Microsoft Graph API client.
///
/// Dispatches single calls and batched request sets against the Graph API,
/// applying bearer-token auth, payload key formatting, and status
/// classification.
///
/// # Example
///
/// ```rust,no_run
/// use msgraph::{GraphClient, RequestOptions};
///
/// # async fn example() -> Result<(), msgraph::GraphError> {
/// let graph = GraphClient::new("<access token>");
/// let me = graph.get("/me", RequestOptions::new()).await?;
/// println!("{:?}", me.get_str("display_name"));
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct GraphClient {
    token: Option<SecretString>,
    version: String,
    base_url: String,
    transport: Arc<dyn HttpTransport>,
    error_handler: Arc<dyn ErrorHandler>,
    body_formatter: BodyFormatter,
}

impl std::fmt::Debug for GraphClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphClient")
            .field("base_url", &self.base_url)
            .field("version", &self.version)
            .field("has_token", &self.token.is_some())
            .finish()
    }
}

impl GraphClient {
    /// Create a client for the production Graph endpoint with default
    /// settings. Use [`GraphClient::builder`] for anything configurable.
    pub fn new<S: Into<String>>(token: S) -> Self {
        Self::builder().token(token).build()
    }

    pub fn builder() -> GraphClientBuilder {
        GraphClientBuilder::new()
    }

    pub async fn get(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<ParsedResponse, GraphError> {
        self.call(Method::Get, endpoint, options).await
    }

    pub async fn post(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<ParsedResponse, GraphError> {
        self.call(Method::Post, endpoint, options).await
    }

    pub async fn put(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<ParsedResponse, GraphError> {
        self.call(Method::Put, endpoint, options).await
    }

    pub async fn patch(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<ParsedResponse, GraphError> {
        self.call(Method::Patch, endpoint, options).await
    }

    pub async fn delete(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<ParsedResponse, GraphError> {
        self.call(Method::Delete, endpoint, options).await
    }

    /// Dispatch a single request.
    ///
    /// Builds the versioned URL, merges auth and content headers over the
    /// caller's, formats the body, invokes the transport, and classifies
    /// the status code: 200-399 is success, 400-599 goes through the
    /// configured error handler, and anything else is
    /// [`GraphError::UnexpectedStatus`].
    pub async fn call(
        &self,
        method: Method,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<ParsedResponse, GraphError> {
        let url = self.build_url(endpoint);
        let token = match options.token.as_deref() {
            Some(token) => token,
            None => self
                .token
                .as_ref()
                .map(|t| t.expose_secret())
                .unwrap_or_default(),
        };
        let headers = build_headers(&options.headers, token, method.has_body())?;
        let body = self.body_formatter.format(options.body.as_ref(), method);

        tracing::debug!(%method, %url, "dispatching Graph request");
        let response = self
            .transport
            .send(TransportRequest {
                method,
                url,
                headers,
                query: options.params,
                body,
            })
            .await?;

        match response.status {
            200..=399 => ParsedResponse::from_bytes(&response.body),
            400..=599 => {
                let parsed = ParsedResponse::from_bytes(&response.body).ok();
                self.error_handler
                    .handle(ApiError::from_status(response.status, parsed))
            }
            status => Err(GraphError::UnexpectedStatus(status)),
        }
    }

    /// Accumulate batch requests and execute them in one go.
    ///
    /// ```rust,no_run
    /// use msgraph::{BatchRequest, GraphClient, Method};
    /// use serde_json::json;
    ///
    /// # async fn example() -> Result<(), msgraph::GraphError> {
    /// let graph = GraphClient::new("<access token>");
    /// let results = graph
    ///     .batch(|batch| {
    ///         batch.add(BatchRequest::new("/me"));
    ///         batch.add(
    ///             BatchRequest::new("/me/drive/root")
    ///                 .with_method(Method::Patch)
    ///                 .with_body(json!({ "display_name": "docs" })),
    ///         );
    ///     })
    ///     .await?;
    /// assert_eq!(results.len(), 2);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn batch<F>(&self, build: F) -> Result<Vec<BatchResult>, GraphError>
    where
        F: FnOnce(&mut Batch<'_>),
    {
        let mut batch = self.batch_builder();
        build(&mut batch);
        batch.execute().await
    }

    /// A batch accumulator for manual control (custom chunk size, staged
    /// adds, explicit execute).
    pub fn batch_builder(&self) -> Batch<'_> {
        Batch::new(self)
    }

    pub(crate) fn body_formatter(&self) -> &BodyFormatter {
        &self.body_formatter
    }

    fn build_url(&self, endpoint: &str) -> String {
        let path = endpoint.trim_start_matches('/');
        format!(
            "{}/{}",
            self.base_url,
            escape_path(&format!("v{}/{}", self.version, path))
        )
    }
}

/// Builder for [`GraphClient`].
#[derive(Default)]
pub struct GraphClientBuilder {
    token: Option<String>,
    version: Option<String>,
    base_url: Option<String>,
    http_client: Option<reqwest::Client>,
    transport: Option<Arc<dyn HttpTransport>>,
    error_handler: Option<Arc<dyn ErrorHandler>>,
}

impl GraphClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bearer token used for every call unless overridden per request.
    pub fn token<S: Into<String>>(mut self, token: S) -> Self {
        self.token = Some(token.into());
        self
    }

    /// API version segment, default `"1.0"` (`"beta"` is the other common
    /// choice).
    pub fn version<S: Into<String>>(mut self, version: S) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Override the Graph host, e.g. for a national cloud or a mock server.
    pub fn base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Use a preconfigured `reqwest::Client` (timeouts, proxy, pooling) for
    /// the default transport. Ignored when a custom transport is set.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Replace the transport entirely.
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Strategy applied to 4xx/5xx responses; defaults to [`Propagate`].
    pub fn error_handler(mut self, handler: Arc<dyn ErrorHandler>) -> Self {
        self.error_handler = Some(handler);
        self
    }

    pub fn build(self) -> GraphClient {
        let transport = self.transport.unwrap_or_else(|| {
            Arc::new(ReqwestTransport::new(self.http_client.unwrap_or_default()))
        });
        GraphClient {
            token: self.token.map(SecretString::from),
            version: self.version.unwrap_or_else(|| DEFAULT_VERSION.to_string()),
            base_url: self
                .base_url
                .unwrap_or_else(|| GRAPH_HOST.to_string())
                .trim_end_matches('/')
                .to_string(),
            transport,
            error_handler: self.error_handler.unwrap_or_else(|| Arc::new(Propagate)),
            body_formatter: BodyFormatter,
        }
    }
}
