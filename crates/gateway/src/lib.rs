//! Typed client for a code-host instance's GraphQL API.
//!
//! [`Gateway`] exposes one generic executor ([`Gateway::request_graphql`]) and
//! four domain operations built on it: [`Gateway::search`],
//! [`Gateway::resolve_rev`], [`Gateway::resolve_repository`], and
//! [`Gateway::query_extensions`]. Each call is a single POST to
//! `<instance>/.api/graphql` wrapped in a child span of the caller's
//! [`TraceContext`]. Nothing is retried, cached, or batched.
//!
//! ## Architectural Layer
//!
//! **Domain + port definitions.** This crate has no I/O dependencies. It
//! reaches the network only through [`HttpTransport`]; the `transport` crate
//! supplies the reqwest implementation.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`RepoName`, `Revision`, `CommitOid`, etc.) |
//! | [`types`] | `Instance`, `AccessToken`, and the typed operation results |
//! | [`errors`] | `GatewayError` and `RetryPolicy` |
//! | [`envelope`] | The `{query, variables}` body and `{data, errors}` envelope |
//! | [`queries`] | The GraphQL documents sent by each operation |
//! | [`transport`] | The `HttpTransport` port |
//! | [`context`] | `TraceContext` |

mod client;
pub mod context;
pub mod envelope;
pub mod errors;
pub mod identifiers;
pub mod queries;
pub mod transport;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use client::Gateway;
pub use context::TraceContext;
pub use envelope::{GraphQlErrorEntry, GraphQlRequest, GraphQlResponse};
pub use errors::{GatewayError, RetryPolicy, MAX_ERROR_MESSAGE_BYTES};
pub use identifiers::{
    CloneUrl, CommitOid, EmptyIdentifier, ExtensionId, InvocationId, RepoName, Revision,
};
pub use transport::{HttpTransport, TransportRequest, TransportResponse};
pub use types::{
    AccessToken, Extension, ExtensionManifest, Instance, RepositoryRef, SearchResult,
    GRAPHQL_PATH,
};
