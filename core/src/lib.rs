//! Blocking client for the Mautic REST API.
//!
//! # Overview
//! Builds authenticated JSON requests against a configured base URL and
//! decodes the responses into typed records for contacts, custom fields and
//! webhooks. Every call is a single round trip: no retries, caching or
//! pagination beyond the query parameters the caller passes.
//!
//! # Design
//! - `Client` is stateless: a validated `ClientConfig` plus a shared
//!   `Transport` handle.
//! - Each operation is split into `build_*` (produces an `HttpRequest`) and
//!   `parse_*` (consumes an `HttpResponse`), with a convenience method that
//!   runs both through the transport. The halves can be used without I/O.
//! - Response bodies are decoded with an explicitly chosen strategy
//!   (`Json`, `Text`, `NoContent`).
//! - List endpoints return entities keyed by id; they come back as a `Vec`
//!   in unspecified order.
//!
//! ```no_run
//! use mautic_client::{Client, ClientConfig, ListParams};
//!
//! # fn main() -> Result<(), mautic_client::ApiError> {
//! let config = ClientConfig::builder()
//!     .base_url("https://mautic.example.com")
//!     .user("admin")
//!     .password("secret")
//!     .build()?;
//! let client = Client::new(config);
//! let contact = client.get_contact(42)?;
//! let recent = client.list_contacts(&ListParams { limit: Some(10), ..Default::default() })?;
//! println!("{} has {} points; {} recent", contact.id, contact.points, recent.len());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod contacts;
pub mod decode;
pub mod error;
pub mod fields;
pub mod http;
pub mod request;
pub mod transport;
pub mod types;
pub mod webhooks;

pub use client::Client;
pub use config::{ClientConfig, ClientConfigBuilder};
pub use contacts::ContactParams;
pub use decode::{Json, NoContent, Text};
pub use error::ApiError;
pub use fields::FieldParams;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use request::RequestBuilder;
pub use transport::{Transport, UreqTransport};
pub use types::{Contact, Field, FieldObject, ListParams, Webhook, WebhookTrigger};
pub use webhooks::WebhookParams;
