//! srcgql HTTP transport adapter.
//!
//! Implements the [`gateway::HttpTransport`] trait over reqwest. Each POST runs
//! in an `http.request` span that records the status code and elapsed time,
//! and carries the current OpenTelemetry trace context in its headers when a
//! text map propagator is installed.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Connection handling, timeouts, TLS, and header
//! encoding live here. The [`gateway`] crate sees only
//! [`gateway::HttpTransport`].

use std::time::{Duration, Instant};

use async_trait::async_trait;
use gateway::{GatewayError, HttpTransport, TransportRequest, TransportResponse};
use opentelemetry::propagation::Injector;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use thiserror::Error;
use tracing::{debug, field, info_span, Instrument, Span};
use tracing_opentelemetry::OpenTelemetrySpanExt;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors raised while constructing a [`ReqwestTransport`].
#[derive(Debug, Error)]
pub enum TransportError {
    /// The underlying reqwest client could not be built.
    #[error("Client build error: {0}")]
    Build(#[from] reqwest::Error),
}

/// Settings for [`ReqwestTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    /// Upper bound on one request, connect through body.
    pub timeout: Duration,
    /// `User-Agent` header value.
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            user_agent: concat!("srcgql/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// reqwest-backed [`HttpTransport`].
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Builds a transport with its own connection pool.
    pub fn new(config: TransportConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent)
            .build()?;
        Ok(Self { client })
    }

    async fn send(
        &self,
        request: TransportRequest,
        span: &Span,
    ) -> Result<TransportResponse, GatewayError> {
        let mut propagated = HeaderMap::new();
        let cx = span.context();
        opentelemetry::global::get_text_map_propagator(|propagator| {
            propagator.inject_context(&cx, &mut HeaderInjector(&mut propagated));
        });

        let mut builder = self.client.post(&request.url).headers(propagated);
        for (name, value) in &request.headers {
            builder = builder.header(*name, value.as_str());
        }

        let started = Instant::now();
        let response = builder
            .body(request.body)
            .send()
            .await
            .map_err(request_error)?;
        let status = response.status();
        span.record("http.response.status_code", status.as_u16());

        let body = response.bytes().await.map_err(request_error)?;
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        span.record("elapsed_ms", elapsed_ms);
        debug!(status = status.as_u16(), elapsed_ms, bytes = body.len(), "response received");

        Ok(TransportResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            body: body.to_vec(),
        })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn post(&self, request: TransportRequest) -> Result<TransportResponse, GatewayError> {
        let span = info_span!(
            "http.request",
            otel.kind = "client",
            http.request.method = "POST",
            url.full = %request.url,
            http.response.status_code = field::Empty,
            elapsed_ms = field::Empty,
        );
        self.send(request, &span).instrument(span.clone()).await
    }
}

/// Maps a reqwest failure. Builder errors mean the request itself is
/// malformed and can never succeed, so they are not reported as connection
/// failures.
fn request_error(err: reqwest::Error) -> GatewayError {
    if err.is_builder() {
        GatewayError::InvalidInstance(format!("request could not be built: {err}"))
    } else if err.is_timeout() {
        GatewayError::Connection(format!("request timed out: {err}"))
    } else {
        GatewayError::Connection(err.to_string())
    }
}

/// Writes propagator output into outgoing request headers.
struct HeaderInjector<'a>(&'a mut HeaderMap);

impl Injector for HeaderInjector<'_> {
    fn set(&mut self, key: &str, value: String) {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(key.as_bytes()),
            HeaderValue::from_str(&value),
        ) {
            self.0.insert(name, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use gateway::RetryPolicy;

    use super::*;

    #[test]
    fn default_config() {
        let config = TransportConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.user_agent.starts_with("srcgql/"));
    }

    #[test]
    fn injector_skips_invalid_headers() {
        let mut headers = HeaderMap::new();
        let mut injector = HeaderInjector(&mut headers);
        injector.set("traceparent", "00-abc-def-01".to_string());
        injector.set("bad header", "x".to_string());
        injector.set("tracestate", "bad\nvalue".to_string());
        assert_eq!(headers.len(), 1);
        assert_eq!(headers["traceparent"], "00-abc-def-01");
    }

    #[test]
    fn builder_errors_are_not_retryable() {
        let err = reqwest::Client::new()
            .post("http://127.0.0.1:1/.api/graphql")
            .header("authorization", "token a\nb")
            .build()
            .unwrap_err();
        let mapped = request_error(err);
        assert!(matches!(mapped, GatewayError::InvalidInstance(_)));
        assert_eq!(mapped.retry_policy(), RetryPolicy::NonRetryable);
    }

    #[test]
    fn builds_with_default_config() {
        assert!(ReqwestTransport::new(TransportConfig::default()).is_ok());
    }
}
