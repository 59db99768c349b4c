//! Explicit tracing context passed to every gateway call.

use std::future::Future;

use tracing::{field, Instrument, Span};

use crate::GatewayError;

/// The caller's span. Each operation opens a child of it.
///
/// The gateway never reads the current span implicitly.
#[derive(Debug, Clone)]
pub struct TraceContext {
    parent: Span,
}

impl TraceContext {
    /// Creates a context whose operations nest under `parent`.
    pub fn new(parent: Span) -> Self {
        Self { parent }
    }

    /// Returns the parent span.
    pub fn span(&self) -> &Span {
        &self.parent
    }
}

/// Runs `work` inside `span` and closes the span once it settles.
///
/// `span` must declare empty `error` and `otel.status_code` fields; they are
/// filled in when `work` fails.
pub(crate) async fn in_span<T, F>(span: Span, work: F) -> Result<T, GatewayError>
where
    F: Future<Output = Result<T, GatewayError>>,
{
    let result = work.instrument(span.clone()).await;
    if let Err(err) = &result {
        span.record("error", field::display(err));
        span.record("otel.status_code", "ERROR");
    }
    result
}
