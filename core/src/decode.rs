//! Response decoding strategies.
//!
//! # Design
//! The caller picks how a body is interpreted by naming a strategy type
//! (`Json`, `Text` or `NoContent`) instead of the decoder inspecting the
//! target at runtime. Every strategy runs the same status check first, and
//! every strategy returns a fresh value: a failed decode never leaves a
//! half-filled result behind.

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::ApiError;
use crate::http::HttpResponse;

/// A way of turning a successful response body into a `T`.
pub trait Decodes<T> {
    fn decode_body(body: &str) -> Result<T, ApiError>;
}

/// Structured JSON body.
pub struct Json;

/// Opaque body, returned verbatim.
pub struct Text;

/// Body carries nothing the caller needs. Empty bodies and `null` are
/// accepted; anything else must still be well-formed JSON.
pub struct NoContent;

impl<T> Decodes<T> for Json
where
    T: DeserializeOwned,
{
    fn decode_body(body: &str) -> Result<T, ApiError> {
        serde_json::from_str(body).map_err(|e| ApiError::DecodeError(e.to_string()))
    }
}

impl Decodes<String> for Text {
    fn decode_body(body: &str) -> Result<String, ApiError> {
        Ok(body.to_string())
    }
}

impl Decodes<()> for NoContent {
    fn decode_body(body: &str) -> Result<(), ApiError> {
        if body.trim().is_empty() {
            return Ok(());
        }
        serde_json::from_str::<serde::de::IgnoredAny>(body)
            .map(|_| ())
            .map_err(|e| ApiError::DecodeError(e.to_string()))
    }
}

/// Check the status, then decode the body with strategy `D`.
pub fn decode<D, T>(response: &HttpResponse) -> Result<T, ApiError>
where
    D: Decodes<T>,
{
    check_status(response)?;
    D::decode_body(&response.body)
}

#[derive(Deserialize)]
struct ErrorBody {
    errors: Vec<ErrorEntry>,
}

#[derive(Deserialize)]
struct ErrorEntry {
    message: String,
}

/// 2xx passes; 404 becomes `NotFound`; anything else becomes `Api`, carrying
/// the first message of Mautic's `errors` array or else the raw body.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    if response.status == 404 {
        return Err(ApiError::NotFound);
    }
    tracing::warn!(status = response.status, "request rejected by server");
    // Prefer the server's own wording when the body has the usual shape.
    let message = serde_json::from_str::<ErrorBody>(&response.body)
        .ok()
        .and_then(|b| b.errors.into_iter().next())
        .map(|e| e.message)
        .unwrap_or_else(|| response.body.clone());
    Err(ApiError::Api {
        status: response.status,
        message,
    })
}
