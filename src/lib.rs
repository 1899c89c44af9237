//! # msgraph
//!
//! A Microsoft Graph API client with batched request support.
//!
//! The client translates high-level calls (verb + endpoint + options) into
//! authenticated HTTP requests, normalizes outgoing payload key casing
//! (`number_format` -> `numberFormat`), parses responses into
//! attribute-addressable JSON trees with snake_case keys, and classifies
//! failures through a pluggable error handler. Its centerpiece is the batch
//! engine: any number of requests submitted as `POST /$batch` round trips
//! of at most 20 members each, with per-request correlation and dependency
//! ordering preserved.
//!
//! ```rust,no_run
//! use msgraph::{BatchRequest, GraphClient, RequestOptions};
//!
//! # async fn example() -> Result<(), msgraph::GraphError> {
//! let graph = GraphClient::new("<access token>");
//!
//! // Single call.
//! let me = graph.get("/me", RequestOptions::new()).await?;
//! println!("hello, {:?}", me.get_str("display_name"));
//!
//! // Batched calls, one round trip.
//! let results = graph
//!     .batch(|batch| {
//!         batch.add(BatchRequest::new("/me"));
//!         batch.add(BatchRequest::new("/me/messages").with_params(&[("$top", "5")]));
//!     })
//!     .await?;
//! for result in &results {
//!     println!("{} -> {:?}", result.request.url(), result.status());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Retry, rate-limit handling and pagination are deliberately out of scope;
//! callers layer those above the client.

pub mod batch;
pub mod body;
pub mod client;
pub mod error;
pub mod http;
pub mod response;
pub mod types;

pub use batch::{Batch, BatchRequest, BatchResult, DEFAULT_CHUNK_SIZE};
pub use body::BodyFormatter;
pub use client::{DEFAULT_VERSION, GRAPH_HOST, GraphClient, GraphClientBuilder};
pub use error::{ApiError, ErrorHandler, GraphError, Propagate};
pub use http::transport::{HttpTransport, ReqwestTransport, TransportRequest, TransportResponse};
pub use response::ParsedResponse;
pub use types::{Method, RequestOptions};

/// Crate version, as published.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Commonly used types, importable in one line.
pub mod prelude {
    pub use crate::batch::{Batch, BatchRequest, BatchResult};
    pub use crate::client::GraphClient;
    pub use crate::error::{ApiError, ErrorHandler, GraphError, Propagate};
    pub use crate::response::ParsedResponse;
    pub use crate::types::{Method, RequestOptions};
}
