//! Command-line and environment configuration.

use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use gateway::{AccessToken, GatewayError, Instance};
use transport::TransportConfig;

/// Environment variable whose presence turns on OTLP export.
pub const OTLP_ENDPOINT_ENV: &str = "OTEL_EXPORTER_OTLP_ENDPOINT";

/// Query a code-host instance's GraphQL API.
#[derive(Debug, Parser)]
#[command(name = "srcgql", version, about, long_about = None)]
pub struct Cli {
    /// Base URL of the instance
    #[arg(long, env = "SRC_ENDPOINT", default_value = "https://sourcegraph.com")]
    pub endpoint: String,

    /// Access token sent as `Authorization: token <TOKEN>`
    #[arg(long, env = "SRC_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    /// Per-request timeout in seconds
    #[arg(
        long,
        env = "SRC_TIMEOUT_SECS",
        default_value_t = 30,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout_secs: u64,

    /// Log output format (written to stderr)
    #[arg(long, env = "SRC_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    /// Export spans over OTLP (also enabled by OTEL_EXPORTER_OTLP_ENDPOINT)
    #[arg(long)]
    pub otlp: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Log formatter selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Compact human-readable lines
    Pretty,
    /// One JSON object per event
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Search and print the matched files' repositories
    Search {
        /// Search query
        query: String,
    },
    /// Resolve a revision to a commit OID
    ResolveRev {
        /// Repository name (e.g. github.com/a/b)
        repo: String,
        /// Revision to resolve
        #[arg(default_value = "HEAD")]
        rev: String,
    },
    /// Find the repository a clone URL belongs to
    ResolveRepo {
        /// Clone URL (e.g. https://github.com/a/b.git)
        clone_url: String,
    },
    /// List registry extensions
    Extensions,
}

impl Command {
    /// Name recorded on the root span.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Search { .. } => "search",
            Command::ResolveRev { .. } => "resolve-rev",
            Command::ResolveRepo { .. } => "resolve-repo",
            Command::Extensions => "extensions",
        }
    }
}

impl Cli {
    /// Builds the instance descriptor from `--endpoint` and `--access-token`.
    ///
    /// An empty token is treated as absent.
    pub fn instance(&self) -> Result<Instance, GatewayError> {
        let token = self
            .access_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .map(AccessToken::new)
            .transpose()?;
        Instance::new(&self.endpoint, token)
    }

    pub fn transport_config(&self) -> TransportConfig {
        TransportConfig {
            timeout: Duration::from_secs(self.timeout_secs),
            ..TransportConfig::default()
        }
    }

    pub fn otlp_enabled(&self) -> bool {
        self.otlp || std::env::var_os(OTLP_ENDPOINT_ENV).is_some()
    }
}
