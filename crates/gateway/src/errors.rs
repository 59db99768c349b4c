//! Error and retry-policy types for the gateway.
//!
//! [`GatewayError`] is the single failure type returned by every operation.
//! Nothing in this crate retries; [`GatewayError::retry_policy`] lets the
//! caller decide.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upper bound, in bytes, on each server-reported GraphQL error message.
pub const MAX_ERROR_MESSAGE_BYTES: usize = 4096;

// ---------------------------------------------------------------------------
// Retry semantics
// ---------------------------------------------------------------------------

/// Whether an error condition is safe to retry and, if so, after what delay.
///
/// - `Retryable`: connection failures, HTTP 429, HTTP 5xx.
/// - `NonRetryable`: everything else (GraphQL errors, missing repositories,
///   malformed responses, invalid instances).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RetryPolicy {
    /// The operation may be retried.
    Retryable {
        /// Minimum back-off before the next attempt. `None` means retry
        /// immediately or apply the caller's own back-off schedule.
        after: Option<Duration>,
    },
    /// The operation must not be retried.
    NonRetryable,
}

// ---------------------------------------------------------------------------
// Gateway errors
// ---------------------------------------------------------------------------

/// Errors produced by the executor and the domain operations.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The server answered with a non-2xx status.
    #[error("{status} {status_text}")]
    Transport {
        /// HTTP status code.
        status: u16,
        /// Canonical reason phrase (e.g. `"Bad Gateway"`).
        status_text: String,
    },

    /// The response envelope carried a non-empty `errors` list.
    ///
    /// Messages are kept in server order.
    #[error("GraphQL Error:{}", .messages.join("\n"))]
    GraphQl {
        /// The `message` field of each error.
        messages: Vec<String>,
    },

    /// No repository resolves for the clone URL on this instance.
    #[error("No repository found for clone URL {clone_url} on instance {instance_url}")]
    NotFound {
        /// The clone URL that was looked up.
        clone_url: String,
        /// Base URL of the instance that was queried.
        instance_url: String,
    },

    /// `data` did not contain the fields the operation extracts.
    #[error("Unexpected response shape for {operation}: {detail}")]
    UnexpectedShape {
        /// Name of the operation that failed to extract its result.
        operation: &'static str,
        /// What was missing or mistyped.
        detail: String,
    },

    /// The request produced no response (connect failure, timeout, TLS).
    #[error("Connection error: {0}")]
    Connection(String),

    /// The response body was not valid JSON.
    #[error("Invalid response body: {0}")]
    Decode(String),

    /// The instance descriptor is unusable.
    #[error("Invalid instance: {0}")]
    InvalidInstance(String),
}

impl GatewayError {
    /// Builds a [`GatewayError::GraphQl`], bounding each message to
    /// [`MAX_ERROR_MESSAGE_BYTES`].
    pub fn graphql<I, S>(messages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::GraphQl {
            messages: messages
                .into_iter()
                .map(|m| truncate_message(m.into()))
                .collect(),
        }
    }

    /// Classifies this error for callers that implement their own retries.
    pub fn retry_policy(&self) -> RetryPolicy {
        match self {
            Self::Connection(_) => RetryPolicy::Retryable { after: None },
            Self::Transport { status, .. } if *status == 429 || (500..600).contains(status) => {
                RetryPolicy::Retryable { after: None }
            }
            _ => RetryPolicy::NonRetryable,
        }
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        GatewayError::Decode(err.to_string())
    }
}

fn truncate_message(mut message: String) -> String {
    if message.len() > MAX_ERROR_MESSAGE_BYTES {
        let mut end = MAX_ERROR_MESSAGE_BYTES;
        while !message.is_char_boundary(end) {
            end -= 1;
        }
        message.truncate(end);
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_error_display() {
        let error = GatewayError::Transport {
            status: 502,
            status_text: "Bad Gateway".to_string(),
        };
        assert_eq!(error.to_string(), "502 Bad Gateway");
    }

    #[test]
    fn graphql_error_joins_messages_in_order() {
        let error = GatewayError::graphql(["first", "second"]);
        assert_eq!(error.to_string(), "GraphQL Error:first\nsecond");
    }

    #[test]
    fn not_found_names_clone_url_and_instance() {
        let error = GatewayError::NotFound {
            clone_url: "https://x/y.git".to_string(),
            instance_url: "https://sg.example.com".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("https://x/y.git"));
        assert!(message.contains("https://sg.example.com"));
    }

    #[test]
    fn long_messages_are_truncated_on_char_boundary() {
        let long = "é".repeat(MAX_ERROR_MESSAGE_BYTES);
        let GatewayError::GraphQl { messages } = GatewayError::graphql([long]) else {
            panic!("expected GraphQl variant");
        };
        assert!(messages[0].len() <= MAX_ERROR_MESSAGE_BYTES);
        assert!(messages[0].chars().all(|c| c == 'é'));
    }

    #[test]
    fn retry_policy_classification() {
        let retryable = [
            GatewayError::Connection("refused".to_string()),
            GatewayError::Transport {
                status: 503,
                status_text: "Service Unavailable".to_string(),
            },
            GatewayError::Transport {
                status: 429,
                status_text: "Too Many Requests".to_string(),
            },
        ];
        for error in retryable {
            assert_eq!(error.retry_policy(), RetryPolicy::Retryable { after: None });
        }

        let non_retryable = [
            GatewayError::Transport {
                status: 401,
                status_text: "Unauthorized".to_string(),
            },
            GatewayError::graphql(["boom"]),
            GatewayError::Decode("eof".to_string()),
        ];
        for error in non_retryable {
            assert_eq!(error.retry_policy(), RetryPolicy::NonRetryable);
        }
    }
}
