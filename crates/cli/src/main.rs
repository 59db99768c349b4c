//! srcgql CLI entry point.
//!
//! This binary is the composition root. Responsibilities:
//!
//! 1. **Parse configuration** — flags with environment fallbacks (see
//!    [`config::Cli`]).
//! 2. **Wire observability** — configure `tracing-subscriber` with a compact
//!    or JSON formatter and, when requested, an OpenTelemetry OTLP exporter.
//! 3. **Construct infrastructure** — build a `ReqwestTransport` and inject it
//!    into a `Gateway`.
//! 4. **Run one subcommand** under a root span tagged with a fresh
//!    [`gateway::InvocationId`], then print its result to stdout.

mod commands;
mod config;
mod telemetry;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use gateway::{Gateway, InvocationId, TraceContext};
use tracing::info_span;
use transport::ReqwestTransport;

use crate::config::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _telemetry =
        telemetry::init(cli.log_format, cli.otlp_enabled()).context("failed to set up logging")?;

    let invocation = InvocationId::new_random();
    let root = info_span!(
        "srcgql",
        invocation_id = %invocation,
        command = cli.command.name(),
    );

    let instance = cli.instance()?;
    let transport =
        ReqwestTransport::new(cli.transport_config()).context("failed to build HTTP client")?;
    let gateway = Gateway::new(Arc::new(transport));

    let output = commands::run(&gateway, &cli.command, &instance, &TraceContext::new(root)).await?;
    println!("{output}");
    Ok(())
}
