//! Toolbuilder CLI
//!
//! Fetch, analyze and reason about repository files through an LLM.

use anyhow::{Context, Result};
use clap::Parser;
use std::io;
use toolbuilder::{
    cli::{self, Cli},
    config::Config,
    llm::{LlmClient, PromptComposer},
    orchestrator::Orchestrator,
    solver::ThoughtTreeSolver,
};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let action = cli.action();
    let mut stdout = io::stdout().lock();

    if !action.requires_model() {
        return cli::run_local(&action, &mut stdout);
    }

    let config = Config::load().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    let client = LlmClient::new(config.llm.clone()).context("Failed to create LLM client")?;
    let solver = ThoughtTreeSolver::new(client.clone());
    let orchestrator = Orchestrator::new(
        PromptComposer::new(&config.template_path),
        client,
        solver,
        config.solver,
    );

    cli::run(&action, &orchestrator, cli.repo.as_deref(), &mut stdout).await
}
