//! The port through which the executor reaches the network.
//!
//! The gateway builds a [`TransportRequest`] and hands it to an
//! [`HttpTransport`]; the `transport` crate supplies the reqwest-backed
//! implementation. Tests substitute an in-memory one.

use async_trait::async_trait;

use crate::GatewayError;

/// `Accept` header name.
pub const ACCEPT: &str = "Accept";
/// `Content-Type` header name.
pub const CONTENT_TYPE: &str = "Content-Type";
/// `Authorization` header name.
pub const AUTHORIZATION: &str = "Authorization";
/// Media type used for both the request body and the accepted response.
pub const APPLICATION_JSON: &str = "application/json";

/// One outbound POST, fully prepared by the executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportRequest {
    /// Absolute endpoint URL.
    pub url: String,
    /// Header name/value pairs, in insertion order.
    pub headers: Vec<(&'static str, String)>,
    /// Serialised JSON body.
    pub body: Vec<u8>,
}

impl TransportRequest {
    /// Returns the value of the first header named `name` (ASCII
    /// case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// The parts of an HTTP response the executor inspects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Reason phrase for `status` (e.g. `"Not Found"`); may be empty.
    pub status_text: String,
    /// Raw response body.
    pub body: Vec<u8>,
}

impl TransportResponse {
    /// Returns `true` for 2xx statuses.
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends a prepared request and returns the response, whatever its status.
///
/// Implementations map failures that produce no response to
/// [`GatewayError::Connection`]. Non-2xx responses are returned as `Ok`; the
/// executor judges them.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Performs one POST.
    async fn post(&self, request: TransportRequest) -> Result<TransportResponse, GatewayError>;
}
