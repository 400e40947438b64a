//! Toolbuilder - an LLM-backed assistant for working with repository files.
//!
//! Requests are composed from named function contexts, sent to an
//! OpenAI-compatible chat endpoint, and optionally refined through a
//! tree-of-thoughts search before the answer is returned.
//!
//! # Quick Start
//!
//! ```no_run
//! use toolbuilder::{
//!     config::Config,
//!     llm::{LlmClient, PromptComposer},
//!     orchestrator::Orchestrator,
//!     solver::ThoughtTreeSolver,
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     config.validate()?;
//!
//!     let client = LlmClient::new(config.llm.clone())?;
//!     let solver = ThoughtTreeSolver::new(client.clone());
//!     let orchestrator = Orchestrator::new(
//!         PromptComposer::new(&config.template_path),
//!         client,
//!         solver,
//!         config.solver,
//!     );
//!
//!     let algorithm = orchestrator.select_algorithm("shortest path in a grid").await?;
//!     println!("Recommended Algorithm: {}", algorithm);
//!
//!     let answer = orchestrator
//!         .solve("a flaky integration test", "why does it fail on CI only?")
//!         .await?;
//!     println!("Response: {}", answer);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - **PromptComposer**: builds system/user pairs from function contexts and templates
//! - **LlmClient**: OpenAI-compatible client behind the `ChatBackend` trait
//! - **Orchestrator**: select algorithm → craft prompt → solve
//! - **ThoughtTreeSolver**: tree-of-thoughts search behind the `ThoughtSolver` trait

pub mod algorithm;
pub mod cli;
pub mod config;
pub mod error;
pub mod llm;
pub mod orchestrator;
pub mod repo_tree;
pub mod scaffold;
pub mod solver;

// Re-export commonly used types
pub use algorithm::{AlgorithmSelection, SearchAlgorithm, match_algorithm};
pub use config::{Config, SolverConfig};
pub use error::{Result, ToolbuilderError};
pub use llm::{ChatBackend, LlmClient, PromptComposer};
pub use orchestrator::Orchestrator;
pub use solver::{ThoughtSolver, ThoughtTreeSolver};
