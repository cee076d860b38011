//! Turns (method, path, payload) into a fully-qualified `HttpRequest`.

use std::time::Duration;

use serde::Serialize;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest};

/// Builds requests rooted at the configured base URL.
///
/// Paths are appended to the base URL verbatim: no slash is added or removed,
/// so callers pass paths that start with `/`.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    config: ClientConfig,
    timeout: Option<Duration>,
}

impl RequestBuilder {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            timeout: None,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Timeout stamped on every request this builder produces.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url(), path)
    }

    /// Build a request, JSON-encoding `payload` when present.
    pub fn build<P>(
        &self,
        method: HttpMethod,
        path: &str,
        payload: Option<&P>,
    ) -> Result<HttpRequest, ApiError>
    where
        P: Serialize + ?Sized,
    {
        let Some(payload) = payload else {
            return Ok(self.build_empty(method, path));
        };
        let body = serde_json::to_string(payload)
            .map_err(|e| ApiError::SerializationError(e.to_string()))?;
        Ok(HttpRequest {
            method,
            url: self.url(path),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(body),
            timeout: self.timeout,
        })
    }

    /// Build a request without a body.
    pub fn build_empty(&self, method: HttpMethod, path: &str) -> HttpRequest {
        HttpRequest {
            method,
            url: self.url(path),
            headers: Vec::new(),
            body: None,
            timeout: self.timeout,
        }
    }
}

/// Method for edit endpoints: `PATCH` edits an existing entity, `PUT`
/// creates it when missing and replaces it otherwise.
pub fn edit_method(create_if_not_exists: bool) -> HttpMethod {
    if create_if_not_exists {
        HttpMethod::Put
    } else {
        HttpMethod::Patch
    }
}

/// Append `pairs` to `path` as a form-url-encoded query string. The path is
/// returned untouched when there is nothing to append.
pub fn path_with_query(path: &str, pairs: &[(&str, String)]) -> String {
    if pairs.is_empty() {
        return path.to_string();
    }
    let query = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs.iter().map(|(k, v)| (*k, v.as_str())))
        .finish();
    format!("{path}?{query}")
}
