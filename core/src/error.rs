//! Error types for the Mautic API client.
//!
//! # Design
//! Every failure is returned to the caller as-is: nothing is retried or
//! swallowed. `NotFound` gets a dedicated variant because callers frequently
//! distinguish "the entity does not exist" from "the server refused the
//! call". All other non-2xx responses land in `Api` with the status and the
//! server's message.

/// Errors returned by `Client` and by the `parse_*` methods.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// No usable configuration was supplied (missing or empty value).
    #[error("missing configuration: {0}")]
    ConfigMissing(String),

    /// A configuration value is present but malformed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// The request never produced a response (DNS, refused connection,
    /// timeout, truncated body).
    #[error("transport failed: {0}")]
    TransportError(String),

    /// The response body does not match the expected shape.
    #[error("decoding failed: {0}")]
    DecodeError(String),

    /// An edit was requested without identifying the target entity.
    #[error("invalid {0} id")]
    InvalidId(&'static str),

    /// The server returned 404.
    #[error("resource not found")]
    NotFound,

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}: {message}")]
    Api { status: u16, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_status_and_message() {
        let err = ApiError::Api {
            status: 401,
            message: "API authorization denied.".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 401: API authorization denied.");
    }

    #[test]
    fn display_names_the_resource_for_invalid_id() {
        assert_eq!(ApiError::InvalidId("webhook").to_string(), "invalid webhook id");
    }
}
