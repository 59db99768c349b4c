//! Subcommand dispatch: one gateway operation per subcommand.

use anyhow::{Context, Result};
use gateway::{CloneUrl, Gateway, Instance, RepoName, Revision, TraceContext};

use crate::config::Command;

/// Runs `command` and returns the text to print on stdout.
pub async fn run(
    gateway: &Gateway,
    command: &Command,
    instance: &Instance,
    ctx: &TraceContext,
) -> Result<String> {
    match command {
        Command::Search { query } => {
            let results = gateway.search(query, instance, ctx).await?;
            Ok(serde_json::to_string_pretty(&results)?)
        }
        Command::ResolveRev { repo, rev } => {
            let repo = RepoName::new(repo.as_str()).context("repository name is empty")?;
            let rev = Revision::new(rev.as_str()).context("revision is empty")?;
            let oid = gateway.resolve_rev(&repo, &rev, instance, ctx).await?;
            Ok(oid.to_string())
        }
        Command::ResolveRepo { clone_url } => {
            let clone_url = CloneUrl::new(clone_url.as_str()).context("clone URL is empty")?;
            let name = gateway.resolve_repository(&clone_url, instance, ctx).await?;
            Ok(name.to_string())
        }
        Command::Extensions => {
            let extensions = gateway.query_extensions(instance, ctx).await?;
            Ok(serde_json::to_string_pretty(&extensions)?)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use gateway::GatewayError;
    use transport::{ReqwestTransport, TransportConfig};

    use super::*;

    fn gateway() -> Gateway {
        Gateway::new(Arc::new(
            ReqwestTransport::new(TransportConfig::default()).unwrap(),
        ))
    }

    fn ctx() -> TraceContext {
        TraceContext::new(tracing::Span::none())
    }

    #[tokio::test]
    async fn resolve_rev_prints_oid() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/.api/graphql")
            .with_status(200)
            .with_body(r#"{"data":{"repository":{"commit":{"oid":"abc123"}}}}"#)
            .create_async()
            .await;

        let instance = Instance::new(&server.url(), None).unwrap();
        let command = Command::ResolveRev {
            repo: "github.com/a/b".to_string(),
            rev: "HEAD".to_string(),
        };
        let output = run(&gateway(), &command, &instance, &ctx()).await.unwrap();

        assert_eq!(output, "abc123");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn search_prints_json() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/.api/graphql")
            .with_status(200)
            .with_body(
                r#"{"data":{"search":{"results":{"results":[{"repository":{"name":"github.com/a/b"}}]}}}}"#,
            )
            .create_async()
            .await;

        let instance = Instance::new(&server.url(), None).unwrap();
        let command = Command::Search {
            query: "foo".to_string(),
        };
        let output = run(&gateway(), &command, &instance, &ctx()).await.unwrap();

        let printed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(
            printed,
            serde_json::json!([{"repository": {"name": "github.com/a/b"}}])
        );
    }

    #[tokio::test]
    async fn gateway_errors_surface_unchanged() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/.api/graphql")
            .with_status(200)
            .with_body(r#"{"data":{"repository":null}}"#)
            .create_async()
            .await;

        let instance = Instance::new(&server.url(), None).unwrap();
        let command = Command::ResolveRepo {
            clone_url: "https://x/y.git".to_string(),
        };
        let err = run(&gateway(), &command, &instance, &ctx())
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<GatewayError>(),
            Some(GatewayError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn empty_arguments_are_rejected_before_any_request() {
        let instance = Instance::new("http://127.0.0.1:1", None).unwrap();
        let command = Command::ResolveRepo {
            clone_url: String::new(),
        };
        let err = run(&gateway(), &command, &instance, &ctx())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "clone URL is empty");
    }
}
