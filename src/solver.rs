//! Tree-of-thoughts solver.
//!
//! [`ThoughtSolver`] is the seam the orchestrator hands crafted prompts to.
//! [`ThoughtTreeSolver`] is the default implementation: it grows chains of
//! reasoning with the chat backend, has the model score each partial chain,
//! prunes weak branches and answers from the best surviving chain.

use crate::config::SolverConfig;
use crate::error::Result;
use crate::llm::ChatBackend;
use async_trait::async_trait;
use std::cmp::Ordering;
use tracing::{debug, info};

const THOUGHT_SYSTEM: &str = "You are exploring a tree of thoughts. Propose the single next step of reasoning toward solving the task. Reply with that step only.";

const EVALUATE_SYSTEM: &str = "You evaluate partial reasoning. Reply with only a number between 0 and 1 rating how likely the reasoning is to lead to a correct solution.";

const SOLUTION_SYSTEM: &str = "You write the final answer to a task, using the chain of reasoning provided.";

/// Runs a tree search from an initial prompt to a final answer.
#[async_trait]
pub trait ThoughtSolver: Send + Sync {
    async fn solve(&self, initial_prompt: &str, config: &SolverConfig) -> Result<String>;
}

/// A partial chain of reasoning and its last evaluated score.
#[derive(Debug, Clone, Default)]
pub struct ThoughtState {
    pub thoughts: Vec<String>,
    pub value: f32,
}

impl ThoughtState {
    fn extend(&self, thought: String) -> Self {
        let mut thoughts = self.thoughts.clone();
        thoughts.push(thought);
        Self {
            thoughts,
            value: 0.0,
        }
    }

    /// Numbered steps, one per line.
    pub fn render(&self) -> String {
        if self.thoughts.is_empty() {
            return "(no reasoning yet)".to_string();
        }
        self.thoughts
            .iter()
            .enumerate()
            .map(|(i, t)| format!("{}. {}", i + 1, t.trim()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Numbers in `text` with their byte spans. A `-` directly before a digit
/// makes the number negative unless it follows a letter or digit.
fn numbers(text: &str) -> Vec<(f32, usize, usize)> {
    let bytes = text.as_bytes();
    let mut found = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let start = i;
        let signed = bytes[i] == b'-' && (i == 0 || !bytes[i - 1].is_ascii_alphanumeric());
        let mut end = if signed { i + 1 } else { i };
        if !bytes.get(end).is_some_and(u8::is_ascii_digit) {
            i += 1;
            continue;
        }
        while bytes.get(end).is_some_and(u8::is_ascii_digit) {
            end += 1;
        }
        if bytes.get(end) == Some(&b'.') && bytes.get(end + 1).is_some_and(u8::is_ascii_digit) {
            end += 1;
            while bytes.get(end).is_some_and(u8::is_ascii_digit) {
                end += 1;
            }
        }
        if let Ok(value) = text[start..end].parse::<f32>() {
            found.push((value, start, end));
        }
        i = end;
    }

    found
}

/// Score from a model reply, clamped to `[0, 1]`.
///
/// The first `a/b` or `a out of b` rating is read as the fraction `a / b`.
/// Without one, the last number in the reply is the score, so step numbers
/// that precede it are ignored. Replies without a number score 0.
pub fn parse_score(reply: &str) -> f32 {
    let found = numbers(reply);

    let fraction = found.windows(2).find_map(|pair| {
        let (numerator, _, num_end) = pair[0];
        let (denominator, den_start, _) = pair[1];
        let between = reply[num_end..den_start].trim();
        let is_rating = between == "/" || between.eq_ignore_ascii_case("out of");
        (is_rating && denominator > 0.0).then(|| numerator / denominator)
    });

    fraction
        .or_else(|| found.last().map(|(value, _, _)| *value))
        .unwrap_or(0.0)
        .clamp(0.0, 1.0)
}

/// Tree-of-thoughts search driven by a [`ChatBackend`].
pub struct ThoughtTreeSolver<B> {
    backend: B,
}

impl<B: ChatBackend> ThoughtTreeSolver<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    async fn generate_thought(&self, task: &str, state: &ThoughtState) -> Result<String> {
        let user = format!(
            "Task:\n{}\n\nReasoning so far:\n{}\n\nNext step:",
            task,
            state.render()
        );
        self.backend.send(THOUGHT_SYSTEM, &user).await
    }

    async fn evaluate(&self, task: &str, state: &ThoughtState) -> Result<f32> {
        let user = format!("Task:\n{}\n\nReasoning:\n{}\n\nScore:", task, state.render());
        let reply = self.backend.send(EVALUATE_SYSTEM, &user).await?;
        Ok(parse_score(&reply))
    }
}

#[async_trait]
impl<B: ChatBackend> ThoughtSolver for ThoughtTreeSolver<B> {
    async fn solve(&self, initial_prompt: &str, config: &SolverConfig) -> Result<String> {
        info!(
            model = %self.backend.model_name(),
            num_thoughts = config.num_thoughts,
            max_steps = config.max_steps,
            max_states = config.max_states,
            pruning_threshold = config.pruning_threshold,
            "starting tree-of-thoughts search"
        );

        let mut frontier = vec![ThoughtState::default()];

        for step in 0..config.max_steps {
            let mut candidates = Vec::with_capacity(frontier.len() * config.num_thoughts);
            for state in &frontier {
                for _ in 0..config.num_thoughts {
                    let thought = self.generate_thought(initial_prompt, state).await?;
                    candidates.push(state.extend(thought));
                }
            }

            for candidate in &mut candidates {
                candidate.value = self.evaluate(initial_prompt, candidate).await?;
            }

            let generated = candidates.len();
            candidates.retain(|c| c.value >= config.pruning_threshold);
            if candidates.is_empty() {
                debug!(step, generated, "all candidates pruned, stopping early");
                break;
            }

            candidates.sort_by(|a, b| b.value.partial_cmp(&a.value).unwrap_or(Ordering::Equal));
            candidates.truncate(config.max_states);
            debug!(
                step,
                generated,
                kept = candidates.len(),
                best = candidates[0].value,
                "expanded frontier"
            );
            frontier = candidates;
        }

        let best = frontier
            .into_iter()
            .max_by(|a, b| a.value.partial_cmp(&b.value).unwrap_or(Ordering::Equal))
            .unwrap_or_default();

        let user = format!(
            "Task:\n{}\n\nReasoning:\n{}\n\nFinal answer:",
            initial_prompt,
            best.render()
        );
        self.backend.send(SOLUTION_SYSTEM, &user).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ToolbuilderError;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Thoughts are numbered, scores come from a queue (default 0.9).
    #[derive(Default)]
    struct ScriptedBackend {
        scores: Mutex<VecDeque<&'static str>>,
        thoughts: Mutex<usize>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedBackend {
        fn with_scores(scores: &[&'static str]) -> Self {
            Self {
                scores: Mutex::new(scores.iter().copied().collect()),
                ..Default::default()
            }
        }

        fn count(&self, system: &str) -> usize {
            self.calls.lock().unwrap().iter().filter(|s| *s == system).count()
        }
    }

    #[async_trait]
    impl ChatBackend for ScriptedBackend {
        async fn send(&self, system: &str, user: &str) -> Result<String> {
            self.calls.lock().unwrap().push(system.to_string());
            match system {
                THOUGHT_SYSTEM => {
                    let mut n = self.thoughts.lock().unwrap();
                    *n += 1;
                    Ok(format!("thought {}", *n))
                }
                EVALUATE_SYSTEM => Ok(self
                    .scores
                    .lock()
                    .unwrap()
                    .pop_front()
                    .unwrap_or("0.9")
                    .to_string()),
                _ => Ok(format!("ANSWER\n{}", user)),
            }
        }

        fn model_name(&self) -> &str {
            "scripted"
        }
    }

    struct FailingBackend;

    #[async_trait]
    impl ChatBackend for FailingBackend {
        async fn send(&self, _system: &str, _user: &str) -> Result<String> {
            Err(ToolbuilderError::RemoteService("rate limited".to_string()))
        }

        fn model_name(&self) -> &str {
            "failing"
        }
    }

    #[test]
    fn test_parse_score() {
        assert_eq!(parse_score("0.8"), 0.8);
        assert_eq!(parse_score("Score: 0.75 overall"), 0.75);
        assert_eq!(parse_score("1"), 1.0);
        assert_eq!(parse_score("0."), 0.0);
        assert_eq!(parse_score("no idea"), 0.0);
        assert_eq!(parse_score(""), 0.0);
    }

    #[test]
    fn test_parse_score_ignores_step_numbers() {
        assert_eq!(parse_score("Step 2 looks weak: 0.2"), 0.2);
        assert_eq!(parse_score("After 3 steps the score is 0.65"), 0.65);
    }

    #[test]
    fn test_parse_score_reads_ratings_as_fractions() {
        assert_eq!(parse_score("3/10"), 0.3);
        assert_eq!(parse_score("7 out of 10"), 0.7);
        assert_eq!(parse_score("Rating: 8 / 10, see step 3"), 0.8);
        assert_eq!(parse_score("12/10"), 1.0);
        assert_eq!(parse_score("5/0"), 0.0);
    }

    #[test]
    fn test_parse_score_negative_clamps_to_zero() {
        assert_eq!(parse_score("-0.9"), 0.0);
        assert_eq!(parse_score("score: -3"), 0.0);
        assert_eq!(parse_score("between 0.7-0.8"), 0.8);
    }

    #[test]
    fn test_render_state() {
        let state = ThoughtState::default()
            .extend("split the problem".to_string())
            .extend(" check edges ".to_string());
        assert_eq!(state.render(), "1. split the problem\n2. check edges");
        assert_eq!(ThoughtState::default().render(), "(no reasoning yet)");
    }

    #[test]
    fn test_default_config_runs_all_steps() {
        let solver = ThoughtTreeSolver::new(ScriptedBackend::default());
        let answer =
            tokio_test::block_on(solver.solve("find the bug", &SolverConfig::default())).unwrap();

        assert_eq!(solver.backend.count(THOUGHT_SYSTEM), 3);
        assert_eq!(solver.backend.count(EVALUATE_SYSTEM), 3);
        assert_eq!(solver.backend.count(SOLUTION_SYSTEM), 1);
        assert!(answer.starts_with("ANSWER"));
        assert!(answer.contains("1. thought 1\n2. thought 2\n3. thought 3"));
    }

    #[test]
    fn test_everything_pruned_stops_early() {
        let solver = ThoughtTreeSolver::new(ScriptedBackend::with_scores(&["0.2"]));
        let answer =
            tokio_test::block_on(solver.solve("task", &SolverConfig::default())).unwrap();

        assert_eq!(solver.backend.count(THOUGHT_SYSTEM), 1);
        assert_eq!(solver.backend.count(EVALUATE_SYSTEM), 1);
        assert!(answer.contains("(no reasoning yet)"));
    }

    #[test]
    fn test_low_rating_is_pruned() {
        let solver = ThoughtTreeSolver::new(ScriptedBackend::with_scores(&["3/10"]));
        let answer =
            tokio_test::block_on(solver.solve("task", &SolverConfig::default())).unwrap();

        assert_eq!(solver.backend.count(THOUGHT_SYSTEM), 1);
        assert!(answer.contains("(no reasoning yet)"));
    }

    #[test]
    fn test_frontier_bounded_by_max_states() {
        let config = SolverConfig {
            num_thoughts: 3,
            max_steps: 2,
            max_states: 2,
            pruning_threshold: 0.5,
        };
        let solver = ThoughtTreeSolver::new(ScriptedBackend::with_scores(&["0.9", "0.6", "0.8"]));
        let answer = tokio_test::block_on(solver.solve("task", &config)).unwrap();

        // 3 from the root, then 3 from each of the 2 kept states.
        assert_eq!(solver.backend.count(THOUGHT_SYSTEM), 9);
        assert_eq!(solver.backend.count(EVALUATE_SYSTEM), 9);
        // Best first-step thought was scored 0.9.
        assert!(answer.contains("1. thought 1\n"));
    }

    #[tokio::test]
    async fn test_backend_error_propagates() {
        let solver = ThoughtTreeSolver::new(FailingBackend);
        let result = solver.solve("task", &SolverConfig::default()).await;
        assert!(matches!(result, Err(ToolbuilderError::RemoteService(_))));
    }
}
