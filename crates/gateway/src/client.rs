//! The generic executor and the four domain operations.
//!
//! Every operation is one round trip: build the body, POST it through the
//! [`HttpTransport`], reject non-2xx statuses, decode the envelope, reject
//! server errors, then decode the operation's own slice of `data`.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{field, info_span, Instrument};

use crate::context::in_span;
use crate::envelope::{GraphQlRequest, GraphQlResponse};
use crate::queries::{EXTENSIONS_QUERY, RESOLVE_REPOSITORY_QUERY, RESOLVE_REV_QUERY, SEARCH_QUERY};
use crate::transport::{
    HttpTransport, TransportRequest, ACCEPT, APPLICATION_JSON, AUTHORIZATION, CONTENT_TYPE,
};
use crate::{
    CloneUrl, CommitOid, Extension, GatewayError, Instance, RepoName, RepositoryRef, Revision,
    SearchResult, TraceContext,
};

// ---------------------------------------------------------------------------
// Response shapes
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct SearchData {
    search: SearchField,
}

#[derive(Deserialize)]
struct SearchField {
    results: SearchResults,
}

#[derive(Deserialize)]
struct SearchResults {
    results: Vec<SearchResult>,
}

#[derive(Deserialize)]
struct ResolveRevData {
    repository: RevRepository,
}

#[derive(Deserialize)]
struct RevRepository {
    commit: RevCommit,
}

#[derive(Deserialize)]
struct RevCommit {
    oid: CommitOid,
}

#[derive(Deserialize)]
struct ResolveRepositoryData {
    #[serde(default)]
    repository: Option<RepositoryRef>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExtensionsData {
    extension_registry: ExtensionRegistry,
}

#[derive(Deserialize)]
struct ExtensionRegistry {
    extensions: ExtensionConnection,
}

#[derive(Deserialize)]
struct ExtensionConnection {
    nodes: Vec<Extension>,
}

// ---------------------------------------------------------------------------
// Gateway
// ---------------------------------------------------------------------------

/// Client for the instance GraphQL API.
///
/// Holds only the transport; the instance and tracing context are supplied
/// per call. Cheap to clone and safe to share across tasks.
#[derive(Clone)]
pub struct Gateway {
    transport: Arc<dyn HttpTransport>,
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway").finish_non_exhaustive()
    }
}

impl Gateway {
    /// Creates a gateway that sends requests through `transport`.
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    /// Sends `query` with `variables` and returns the envelope verbatim.
    ///
    /// Neither `data` nor `errors` is inspected.
    ///
    /// # Errors
    ///
    /// - [`GatewayError::Transport`] for a non-2xx status.
    /// - [`GatewayError::Decode`] if the body is not JSON.
    /// - [`GatewayError::Connection`] if no response arrived.
    pub async fn request_graphql(
        &self,
        query: &str,
        variables: &Value,
        instance: &Instance,
        ctx: &TraceContext,
    ) -> Result<GraphQlResponse, GatewayError> {
        self.execute(query, variables, instance)
            .instrument(ctx.span().clone())
            .await
    }

    /// Runs a search and returns the file matches' repositories.
    pub async fn search(
        &self,
        query: &str,
        instance: &Instance,
        ctx: &TraceContext,
    ) -> Result<Vec<SearchResult>, GatewayError> {
        let span = info_span!(
            parent: ctx.span(),
            "search",
            instance = %instance,
            query = query,
            error = field::Empty,
            otel.status_code = field::Empty,
        );
        in_span(span, async {
            let data: SearchData = self
                .execute(SEARCH_QUERY, &json!({ "query": query }), instance)
                .await?
                .extract("search")?;
            Ok(data.search.results.results)
        })
        .await
    }

    /// Resolves `rev` in `repo_name` to a commit OID.
    pub async fn resolve_rev(
        &self,
        repo_name: &RepoName,
        rev: &Revision,
        instance: &Instance,
        ctx: &TraceContext,
    ) -> Result<CommitOid, GatewayError> {
        let span = info_span!(
            parent: ctx.span(),
            "resolve_rev",
            instance = %instance,
            repo = %repo_name,
            rev = %rev,
            error = field::Empty,
            otel.status_code = field::Empty,
        );
        in_span(span, async {
            let variables = json!({ "repoName": repo_name, "rev": rev });
            let data: ResolveRevData = self
                .execute(RESOLVE_REV_QUERY, &variables, instance)
                .await?
                .extract("resolve_rev")?;
            Ok(data.repository.commit.oid)
        })
        .await
    }

    /// Returns the name of the repository `clone_url` belongs to.
    ///
    /// # Errors
    ///
    /// [`GatewayError::NotFound`] when the instance knows no such repository,
    /// in addition to the errors of [`Gateway::request_graphql`].
    pub async fn resolve_repository(
        &self,
        clone_url: &CloneUrl,
        instance: &Instance,
        ctx: &TraceContext,
    ) -> Result<RepoName, GatewayError> {
        let span = info_span!(
            parent: ctx.span(),
            "resolve_repository",
            instance = %instance,
            clone_url = %clone_url,
            error = field::Empty,
            otel.status_code = field::Empty,
        );
        in_span(span, async {
            let data: ResolveRepositoryData = self
                .execute(
                    RESOLVE_REPOSITORY_QUERY,
                    &json!({ "cloneURL": clone_url }),
                    instance,
                )
                .await?
                .extract("resolve_repository")?;
            data.repository
                .map(|r| r.name)
                .ok_or_else(|| GatewayError::NotFound {
                    clone_url: clone_url.to_string(),
                    instance_url: instance.url().to_string(),
                })
        })
        .await
    }

    /// Lists the extensions in the instance's registry.
    pub async fn query_extensions(
        &self,
        instance: &Instance,
        ctx: &TraceContext,
    ) -> Result<Vec<Extension>, GatewayError> {
        let span = info_span!(
            parent: ctx.span(),
            "query_extensions",
            instance = %instance,
            error = field::Empty,
            otel.status_code = field::Empty,
        );
        in_span(span, async {
            let data: ExtensionsData = self
                .execute(EXTENSIONS_QUERY, &json!({}), instance)
                .await?
                .extract("query_extensions")?;
            Ok(data.extension_registry.extensions.nodes)
        })
        .await
    }

    async fn execute(
        &self,
        query: &str,
        variables: &Value,
        instance: &Instance,
    ) -> Result<GraphQlResponse, GatewayError> {
        let body = serde_json::to_vec(&GraphQlRequest { query, variables })?;
        let mut headers = vec![
            (ACCEPT, APPLICATION_JSON.to_string()),
            (CONTENT_TYPE, APPLICATION_JSON.to_string()),
        ];
        if let Some(token) = instance.access_token() {
            headers.push((AUTHORIZATION, token.authorization_header()));
        }

        let response = self
            .transport
            .post(TransportRequest {
                url: instance.graphql_endpoint(),
                headers,
                body,
            })
            .await?;

        if !response.is_ok() {
            return Err(GatewayError::Transport {
                status: response.status,
                status_text: response.status_text,
            });
        }
        Ok(serde_json::from_slice(&response.body)?)
    }
}
