//! Search algorithm labels offered to the model.
//!
//! The model answers in free text; [`match_algorithm`] maps that text onto
//! the declared label set with a first-substring-in-declaration-order scan.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the tree-search strategies the model may pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchAlgorithm {
    #[serde(rename = "BFS")]
    Bfs,
    #[serde(rename = "DFS")]
    Dfs,
    #[serde(rename = "Best-First")]
    BestFirst,
    #[serde(rename = "A*")]
    AStar,
    #[serde(rename = "MCTS")]
    Mcts,
}

impl SearchAlgorithm {
    /// All labels in declaration order. Matching precedence follows this order.
    pub const ALL: [SearchAlgorithm; 5] = [
        SearchAlgorithm::Bfs,
        SearchAlgorithm::Dfs,
        SearchAlgorithm::BestFirst,
        SearchAlgorithm::AStar,
        SearchAlgorithm::Mcts,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SearchAlgorithm::Bfs => "BFS",
            SearchAlgorithm::Dfs => "DFS",
            SearchAlgorithm::BestFirst => "Best-First",
            SearchAlgorithm::AStar => "A*",
            SearchAlgorithm::Mcts => "MCTS",
        }
    }

    /// Labels formatted as a list literal for prompts, e.g. `['BFS', 'DFS', ...]`.
    pub fn label_list() -> String {
        let quoted: Vec<String> = Self::ALL
            .iter()
            .map(|algo| format!("'{}'", algo.label()))
            .collect();
        format!("[{}]", quoted.join(", "))
    }
}

impl fmt::Display for SearchAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of asking the model to pick an algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlgorithmSelection {
    Resolved(SearchAlgorithm),
    /// The reply named none of the known labels. Displayed as `None` and
    /// forwarded as such into prompt crafting.
    Unresolved,
}

impl fmt::Display for AlgorithmSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlgorithmSelection::Resolved(algo) => algo.fmt(f),
            AlgorithmSelection::Unresolved => f.write_str("None"),
        }
    }
}

/// First label (in declaration order) that occurs as a substring of `answer`.
///
/// Case-sensitive. "BFS" wins over "DFS" whenever both appear, regardless of
/// where they occur in the text.
pub fn match_algorithm(answer: &str) -> AlgorithmSelection {
    SearchAlgorithm::ALL
        .into_iter()
        .find(|algo| answer.contains(algo.label()))
        .map(AlgorithmSelection::Resolved)
        .unwrap_or(AlgorithmSelection::Unresolved)
}
