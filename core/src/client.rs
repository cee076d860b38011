//! Authenticated request execution for the Mautic API.
//!
//! # Design
//! `Client` holds a `RequestBuilder` (which owns the configuration) and a
//! shared `Transport`, and carries no mutable state between calls. Each
//! resource operation is split into a `build_*` method that produces an
//! `HttpRequest`, a `parse_*` method that consumes an `HttpResponse`, and a
//! convenience method that sends the built request through `send`, which
//! decodes with the same strategy as the `parse_*` half. The build/parse
//! halves never touch the network, so a caller can drive the I/O itself.

use std::sync::Arc;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::config::ClientConfig;
use crate::decode::{decode, Decodes};
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::request::RequestBuilder;
use crate::transport::{Transport, UreqTransport};

/// `Accept` value sent with every request.
pub const ACCEPT_JSON: &str = "application/json; charset=utf-8";

/// Client for the Mautic REST API.
///
/// Cloning is cheap and clones share the transport, so one client can serve
/// a whole program.
#[derive(Clone)]
pub struct Client {
    builder: RequestBuilder,
    transport: Arc<dyn Transport>,
}

impl Client {
    /// Create a client that talks HTTP through [`UreqTransport`].
    pub fn new(config: ClientConfig) -> Self {
        Self::with_transport(config, UreqTransport::new())
    }

    pub fn with_transport(config: ClientConfig, transport: impl Transport + 'static) -> Self {
        Self {
            builder: RequestBuilder::new(config),
            transport: Arc::new(transport),
        }
    }

    /// Create a client from `MAUTIC_BASE_URL`, `MAUTIC_USER` and
    /// `MAUTIC_PASSWORD`; fails with `ConfigMissing` when one is unset.
    pub fn from_env() -> Result<Self, ApiError> {
        ClientConfig::from_env().map(Self::new)
    }

    /// A handle sharing this client's transport whose requests are bounded by
    /// `timeout`. There is no timeout unless one is scoped this way.
    #[must_use]
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        Self {
            builder: self.builder.clone().with_timeout(timeout),
            transport: Arc::clone(&self.transport),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        self.builder.config()
    }

    pub fn request_builder(&self) -> &RequestBuilder {
        &self.builder
    }

    /// Attach `Accept` and Basic credentials, then perform one round trip.
    pub fn execute(&self, mut request: HttpRequest) -> Result<HttpResponse, ApiError> {
        request.set_header("accept", ACCEPT_JSON);
        request.set_header("authorization", self.basic_auth());

        tracing::debug!(method = %request.method, url = %request.url, "sending request");
        let response = self.transport.execute(&request)?;
        tracing::debug!(status = response.status, bytes = response.body.len(), "received response");
        Ok(response)
    }

    /// Execute `request` and decode the body with strategy `D`
    /// ([`Json`](crate::decode::Json), [`Text`](crate::decode::Text) or
    /// [`NoContent`](crate::decode::NoContent)). Every resource operation
    /// runs through here, and so can requests for endpoints without a
    /// wrapper in this crate.
    pub fn send<D, T>(&self, request: HttpRequest) -> Result<T, ApiError>
    where
        D: Decodes<T>,
    {
        let response = self.execute(request)?;
        decode::<D, T>(&response)
    }

    fn basic_auth(&self) -> String {
        let config = self.builder.config();
        let credentials = format!("{}:{}", config.user(), config.password());
        format!("Basic {}", STANDARD.encode(credentials))
    }
}
