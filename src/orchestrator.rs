//! Iteration orchestrator.
//!
//! Chains prompt composition, chat calls and the tree-of-thoughts solver.
//! Every step's output feeds the next; the first failure aborts the
//! operation and nothing is retried.

use crate::algorithm::{AlgorithmSelection, SearchAlgorithm, match_algorithm};
use crate::config::SolverConfig;
use crate::error::Result;
use crate::llm::{ChatBackend, ChatPrompt, FunctionContext, PromptComposer};
use crate::solver::ThoughtSolver;
use tracing::{debug, info};

pub const ANALYZE_PREFIX: &str = "Analyze the following content:";
pub const DEBUG_PREFIX: &str = "Debug the following code:";
pub const RECOMMEND_PREFIX: &str = "Provide optimization recommendations for the following content:";

/// Drives every user-facing operation.
pub struct Orchestrator<B, S> {
    composer: PromptComposer,
    backend: B,
    solver: S,
    solver_config: SolverConfig,
}

impl<B: ChatBackend, S: ThoughtSolver> Orchestrator<B, S> {
    /// `solver_config` is handed to the solver on every [`Orchestrator::solve`].
    pub fn new(
        composer: PromptComposer,
        backend: B,
        solver: S,
        solver_config: SolverConfig,
    ) -> Self {
        Self {
            composer,
            backend,
            solver,
            solver_config,
        }
    }

    async fn send(&self, prompt: ChatPrompt) -> Result<String> {
        self.backend.send(&prompt.system, &prompt.user).await
    }

    /// Answer a free-form query under the generic context.
    pub async fn ask(&self, query: &str) -> Result<String> {
        self.send(self.composer.compose_general(query)).await
    }

    /// Ask the model which search algorithm suits `context`.
    pub async fn select_algorithm(&self, context: &str) -> Result<AlgorithmSelection> {
        let request = format!(
            "Considering our past engagements, which search algorithm from the list {} would best address the problem context: '{}'?",
            SearchAlgorithm::label_list(),
            context
        );
        let prompt = self
            .composer
            .compose_for_context(&request, FunctionContext::SelectSearchAlgorithm)?;
        let answer = self.send(prompt).await?;

        let selection = match_algorithm(&answer);
        debug!(%selection, answer_len = answer.len(), "algorithm selected");
        Ok(selection)
    }

    /// Ask the model for a solver-ready prompt using `algorithm`.
    pub async fn craft_prompt(&self, context: &str, query: &str, algorithm: &str) -> Result<String> {
        let request = format!(
            "Drawing from our previous conversations and your understanding of {} within the Tree of Thoughts framework, craft a prompt that would navigate the context: '{}' to address the question: {}",
            algorithm, context, query
        );
        let prompt = self
            .composer
            .compose_for_context(&request, FunctionContext::CraftPrompt)?;
        self.send(prompt).await
    }

    /// Select an algorithm, craft a prompt with it, then run the solver.
    ///
    /// An unresolved selection is forwarded as `None`.
    pub async fn solve(&self, context: &str, query: &str) -> Result<String> {
        let selection = self.select_algorithm(context).await?;
        let prompt = self
            .craft_prompt(context, query, &selection.to_string())
            .await?;

        info!(%selection, prompt_len = prompt.len(), "handing crafted prompt to solver");
        self.solver.solve(&prompt, &self.solver_config).await
    }

    /// Single round trip asking the model for a file's content.
    pub async fn fetch_content(
        &self,
        tool_name: &str,
        dir_tree: &str,
        target_file_path: &str,
    ) -> Result<String> {
        let prompt = self
            .composer
            .compose_fetch(tool_name, dir_tree, target_file_path)?;
        debug!(tool_name, target_file_path, "fetching repository content");
        self.send(prompt).await
    }

    pub async fn analyze(&self, content: &str) -> Result<String> {
        self.solve(ANALYZE_PREFIX, content).await
    }

    pub async fn debug(&self, content: &str) -> Result<String> {
        self.solve(DEBUG_PREFIX, content).await
    }

    pub async fn recommend(&self, content: &str) -> Result<String> {
        self.solve(RECOMMEND_PREFIX, content).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ToolbuilderError;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    /// Replies from a queue and records every (system, user) pair.
    #[derive(Clone, Default)]
    struct MockBackend {
        replies: Arc<Mutex<VecDeque<Result<String>>>>,
        calls: Arc<Mutex<Vec<ChatPrompt>>>,
    }

    impl MockBackend {
        fn replying(replies: &[&str]) -> Self {
            let backend = Self::default();
            for r in replies {
                backend.replies.lock().unwrap().push_back(Ok(r.to_string()));
            }
            backend
        }

        fn push_error(&self, err: ToolbuilderError) {
            self.replies.lock().unwrap().push_back(Err(err));
        }

        fn calls(&self) -> Vec<ChatPrompt> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ChatBackend for MockBackend {
        async fn send(&self, system: &str, user: &str) -> Result<String> {
            self.calls.lock().unwrap().push(ChatPrompt::new(system, user));
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok("Sample Response, BFS".to_string()))
        }

        fn model_name(&self) -> &str {
            "mock"
        }
    }

    /// Echoes the prompt it was given.
    #[derive(Clone, Default)]
    struct EchoSolver {
        seen: Arc<Mutex<Vec<(String, SolverConfig)>>>,
    }

    #[async_trait]
    impl ThoughtSolver for EchoSolver {
        async fn solve(&self, initial_prompt: &str, config: &SolverConfig) -> Result<String> {
            self.seen
                .lock()
                .unwrap()
                .push((initial_prompt.to_string(), *config));
            Ok(format!("solved: {}", initial_prompt))
        }
    }

    fn orchestrator(
        backend: MockBackend,
        solver: EchoSolver,
    ) -> Orchestrator<MockBackend, EchoSolver> {
        Orchestrator::new(
            PromptComposer::new("/nonexistent/template.ppt"),
            backend,
            solver,
            SolverConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_ask_uses_general_context() {
        let backend = MockBackend::default();
        let orch = orchestrator(backend.clone(), EchoSolver::default());

        let answer = orch.ask("World Series 2020 location?").await.unwrap();

        assert_eq!(answer, "Sample Response, BFS");
        let calls = backend.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].system.starts_with("You are a generalist AI"));
        assert_eq!(calls[0].user, "World Series 2020 location?");
    }

    #[tokio::test]
    async fn test_select_algorithm() {
        let backend = MockBackend::default();
        let orch = orchestrator(backend.clone(), EchoSolver::default());

        let selection = orch.select_algorithm("mock_context").await.unwrap();

        assert_eq!(selection, AlgorithmSelection::Resolved(SearchAlgorithm::Bfs));
        let calls = backend.calls();
        assert!(calls[0].system.starts_with("You are the algorithm strategist"));
        assert!(calls[0].user.contains("['BFS', 'DFS', 'Best-First', 'A*', 'MCTS']"));
        assert!(calls[0].user.contains("'mock_context'"));
    }

    #[tokio::test]
    async fn test_select_algorithm_unresolved() {
        let orch = orchestrator(
            MockBackend::replying(&["a greedy approach"]),
            EchoSolver::default(),
        );
        let selection = orch.select_algorithm("ctx").await.unwrap();
        assert_eq!(selection, AlgorithmSelection::Unresolved);
    }

    #[tokio::test]
    async fn test_craft_prompt_returns_verbatim() {
        let backend = MockBackend::default();
        let orch = orchestrator(backend.clone(), EchoSolver::default());

        let prompt = orch
            .craft_prompt("mock_context", "mock_query", "mock_algo")
            .await
            .unwrap();

        assert_eq!(prompt, "Sample Response, BFS");
        let calls = backend.calls();
        assert!(calls[0].system.starts_with("You are the prompt artisan"));
        assert!(calls[0].user.contains("understanding of mock_algo within"));
        assert!(calls[0].user.ends_with("address the question: mock_query"));
    }

    #[tokio::test]
    async fn test_solve_chains_steps() {
        let backend = MockBackend::replying(&["Go with MCTS", "crafted prompt"]);
        let solver = EchoSolver::default();
        let orch = orchestrator(backend.clone(), solver.clone());

        let answer = orch.solve("ctx", "query").await.unwrap();

        assert_eq!(answer, "solved: crafted prompt");
        let calls = backend.calls();
        assert_eq!(calls.len(), 2);
        assert!(calls[1].user.contains("understanding of MCTS within"));
        let seen = solver.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].1, SolverConfig::default());
    }

    #[tokio::test]
    async fn test_solve_passes_configured_solver_settings() {
        let solver = EchoSolver::default();
        let custom = SolverConfig {
            num_thoughts: 3,
            max_steps: 5,
            max_states: 2,
            pruning_threshold: 0.25,
        };
        let orch = Orchestrator::new(
            PromptComposer::new("/nonexistent/template.ppt"),
            MockBackend::default(),
            solver.clone(),
            custom,
        );

        orch.solve("ctx", "query").await.unwrap();

        let seen = solver.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].1, custom);
    }

    #[tokio::test]
    async fn test_solve_forwards_unresolved_as_none() {
        let backend = MockBackend::replying(&["no idea", "crafted"]);
        let orch = orchestrator(backend.clone(), EchoSolver::default());

        orch.solve("ctx", "query").await.unwrap();

        assert!(backend.calls()[1].user.contains("understanding of None within"));
    }

    #[tokio::test]
    async fn test_solve_aborts_on_first_failure() {
        let backend = MockBackend::default();
        backend.push_error(ToolbuilderError::RemoteService("401 Unauthorized".to_string()));
        let solver = EchoSolver::default();
        let orch = orchestrator(backend.clone(), solver.clone());

        let result = orch.solve("ctx", "query").await;

        assert!(matches!(result, Err(ToolbuilderError::RemoteService(_))));
        assert_eq!(backend.calls().len(), 1);
        assert!(solver.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("file_retrieval.ppt");
        std::fs::write(&path, "<REPO_DIR_TREE> <REQUESTED_FILENAME>").unwrap();
        let backend = MockBackend::default();
        let orch = Orchestrator::new(
            PromptComposer::new(path),
            backend.clone(),
            EchoSolver::default(),
            SolverConfig::default(),
        );

        let content = orch
            .fetch_content("toolbuilder", "mock_dir_tree", "mock_target_file_name")
            .await
            .unwrap();

        assert_eq!(content, "Sample Response, BFS");
        let calls = backend.calls();
        assert_eq!(calls[0].system, "mock_dir_tree mock_target_file_name");
        assert_eq!(calls[0].user, "toolbuilder | mock_target_file_name");
    }

    #[tokio::test]
    async fn test_fetch_content_missing_template() {
        let backend = MockBackend::default();
        let orch = orchestrator(backend.clone(), EchoSolver::default());

        let result = orch.fetch_content("tool", "tree", "file").await;

        assert!(matches!(result, Err(ToolbuilderError::TemplateLoad { .. })));
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_specialized_operations_use_prefixes() {
        for (prefix, op) in [(ANALYZE_PREFIX, 0), (DEBUG_PREFIX, 1), (RECOMMEND_PREFIX, 2)] {
            let backend = MockBackend::default();
            let orch = orchestrator(backend.clone(), EchoSolver::default());

            let result = match op {
                0 => orch.analyze("fn main() {}").await,
                1 => orch.debug("fn main() {}").await,
                _ => orch.recommend("fn main() {}").await,
            };

            assert_eq!(result.unwrap(), "solved: Sample Response, BFS");
            let calls = backend.calls();
            assert!(calls[0].user.contains(&format!("'{}'", prefix)));
            assert!(calls[1].user.ends_with("address the question: fn main() {}"));
        }
    }
}
