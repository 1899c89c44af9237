//! Header construction for dispatched requests.

use crate::error::GraphError;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use std::collections::HashMap;

/// Build the header set for a single dispatched request: caller headers
/// first, then the auth/content headers the API requires. The required
/// headers win on collision.
pub(crate) fn build_headers(
    caller: &HashMap<String, String>,
    token: &str,
    has_body: bool,
) -> Result<HeaderMap, GraphError> {
    let mut headers = HeaderMap::new();
    for (key, value) in caller {
        let name = HeaderName::from_bytes(key.as_bytes()).map_err(|e| {
            GraphError::Configuration(format!("Invalid header name '{key}': {e}"))
        })?;
        let value = HeaderValue::from_str(value).map_err(|e| {
            GraphError::Configuration(format!("Invalid header value for '{key}': {e}"))
        })?;
        headers.insert(name, value);
    }

    let auth = format!("Bearer {token}");
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&auth)
            .map_err(|e| GraphError::Configuration(format!("Invalid token format: {e}")))?,
    );
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    if has_body {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    }

    Ok(headers)
}
