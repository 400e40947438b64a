//! Command-line surface.
//!
//! [`Cli`] is parsed by clap, reduced to an [`Action`], and executed by
//! [`run`] against an [`Orchestrator`]. Output goes to any `Write` so the
//! dispatch can be exercised without a terminal.

use crate::error::Result as CrateResult;
use crate::llm::ChatBackend;
use crate::orchestrator::Orchestrator;
use crate::repo_tree::{PLACEHOLDER_TREE, render_tree};
use crate::scaffold::scaffold;
use crate::solver::ThoughtSolver;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Printed when neither a command nor a usable flag combination is given.
pub const INVALID_USAGE: &str = "Please provide valid command or options!";

/// Tool name sent with `-f/--file` requests.
pub const DEFAULT_TOOL_NAME: &str = "toolbuilder";

/// CLI tool for the Toolbuilder application
#[derive(Parser, Debug)]
#[command(name = "toolbuilder")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Query for the neural model
    #[arg(short, long)]
    pub query: Option<String>,

    /// Context for the neural model
    #[arg(short, long)]
    pub context: Option<String>,

    /// Path of the file to retrieve content from
    #[arg(short, long)]
    pub file: Option<String>,

    /// Analyze the provided file's content
    #[arg(long, requires = "file", conflicts_with_all = ["debug", "recommend"])]
    pub analyze: bool,

    /// Get debugging information for the provided file's content
    #[arg(long, requires = "file", conflicts_with = "recommend")]
    pub debug: bool,

    /// Get recommendations for the provided file's content
    #[arg(long, requires = "file")]
    pub recommend: bool,

    /// Repository directory whose tree is sent with fetch requests
    #[arg(long, global = true)]
    pub repo: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch the content of a specific file from the repository
    Fetch {
        /// Name of the tool in the repository
        tool_name: String,

        /// Path to the file within the repository
        file_path: String,
    },

    /// Select the most appropriate algorithm based on context
    #[command(name = "select_algo")]
    SelectAlgo {
        /// Context based on which algorithm needs to be selected
        context: String,
    },

    /// Craft a prompt based on context and algorithm
    Craft {
        /// Context for crafting the prompt
        context: String,

        /// Query for which the prompt is to be crafted
        query: String,

        /// Algorithm based on which the prompt is to be crafted
        algorithm: String,
    },

    /// Run the iterative solution for a given context and query
    Iterate {
        /// Context for running the iterative solution
        context: String,

        /// Query for which the iterative solution is to be run
        query: String,
    },

    /// Send a single general request to the model
    Ask {
        /// The question to ask
        query: String,
    },

    /// Recreate files listed in a README under an output directory
    Scaffold {
        /// README to parse
        #[arg(short, long, default_value = "README.md")]
        input: PathBuf,

        /// Root directory where files will be created
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },
}

/// What to do with a `-f/--file` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileMode {
    Content,
    Analyze,
    Debug,
    Recommend,
}

/// A parsed invocation, independent of clap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Fetch { tool_name: String, file_path: String },
    SelectAlgo { context: String },
    Craft { context: String, query: String, algorithm: String },
    Iterate { context: String, query: String },
    Ask { query: String },
    Scaffold { input: PathBuf, output: PathBuf },
    File { path: String, mode: FileMode },
    Query { query: String, context: String },
    Invalid,
}

impl Cli {
    /// Reduce the parsed arguments to one action.
    ///
    /// Subcommands win over `-f`, which wins over `-q`/`-c`. `-q` without
    /// `-c` (or the reverse) is invalid.
    pub fn action(&self) -> Action {
        if let Some(command) = &self.command {
            return match command {
                Commands::Fetch {
                    tool_name,
                    file_path,
                } => Action::Fetch {
                    tool_name: tool_name.clone(),
                    file_path: file_path.clone(),
                },
                Commands::SelectAlgo { context } => Action::SelectAlgo {
                    context: context.clone(),
                },
                Commands::Craft {
                    context,
                    query,
                    algorithm,
                } => Action::Craft {
                    context: context.clone(),
                    query: query.clone(),
                    algorithm: algorithm.clone(),
                },
                Commands::Iterate { context, query } => Action::Iterate {
                    context: context.clone(),
                    query: query.clone(),
                },
                Commands::Ask { query } => Action::Ask {
                    query: query.clone(),
                },
                Commands::Scaffold { input, output } => Action::Scaffold {
                    input: input.clone(),
                    output: output.clone(),
                },
            };
        }

        if let Some(path) = &self.file {
            let mode = if self.analyze {
                FileMode::Analyze
            } else if self.debug {
                FileMode::Debug
            } else if self.recommend {
                FileMode::Recommend
            } else {
                FileMode::Content
            };
            return Action::File {
                path: path.clone(),
                mode,
            };
        }

        match (&self.query, &self.context) {
            (Some(query), Some(context)) => Action::Query {
                query: query.clone(),
                context: context.clone(),
            },
            _ => Action::Invalid,
        }
    }
}

impl Action {
    /// Whether the action talks to the model (and so needs a valid config).
    pub fn requires_model(&self) -> bool {
        !matches!(self, Action::Scaffold { .. } | Action::Invalid)
    }
}

/// Directory tree for fetch prompts: rendered from `repo`, or a placeholder.
pub fn dir_tree(repo: Option<&Path>) -> CrateResult<String> {
    match repo {
        Some(root) => render_tree(root),
        None => Ok(PLACEHOLDER_TREE.to_string()),
    }
}

/// Execute actions that need no model.
pub fn run_local<W: Write>(action: &Action, out: &mut W) -> Result<()> {
    match action {
        Action::Scaffold { input, output } => {
            let written = scaffold(input, output)
                .with_context(|| format!("Failed to scaffold from '{}'", input.display()))?;
            for path in written {
                writeln!(out, "Created {}", path.display())?;
            }
        }
        _ => writeln!(out, "{}", INVALID_USAGE)?,
    }
    Ok(())
}

/// Execute any action, printing its labeled result to `out`.
pub async fn run<B, S, W>(
    action: &Action,
    orchestrator: &Orchestrator<B, S>,
    repo: Option<&Path>,
    out: &mut W,
) -> Result<()>
where
    B: ChatBackend,
    S: ThoughtSolver,
    W: Write,
{
    match action {
        Action::Fetch {
            tool_name,
            file_path,
        } => {
            let tree = dir_tree(repo).context("Failed to render repository tree")?;
            let content = orchestrator
                .fetch_content(tool_name, &tree, file_path)
                .await
                .context("Failed to fetch content")?;
            writeln!(out, "Content of {}:\n {}", file_path, content)?;
        }
        Action::SelectAlgo { context } => {
            let selection = orchestrator
                .select_algorithm(context)
                .await
                .context("Failed to select algorithm")?;
            writeln!(out, "Recommended Algorithm: {}", selection)?;
        }
        Action::Craft {
            context,
            query,
            algorithm,
        } => {
            let prompt = orchestrator
                .craft_prompt(context, query, algorithm)
                .await
                .context("Failed to craft prompt")?;
            writeln!(out, "Crafted Prompt: {}", prompt)?;
        }
        Action::Iterate { context, query } | Action::Query { query, context } => {
            let response = orchestrator
                .solve(context, query)
                .await
                .context("Iterative solution failed")?;
            writeln!(out, "Response: {}", response)?;
        }
        Action::Ask { query } => {
            let response = orchestrator.ask(query).await.context("Request failed")?;
            writeln!(out, "Response: {}", response)?;
        }
        Action::File { path, mode } => {
            let tree = dir_tree(repo).context("Failed to render repository tree")?;
            let content = orchestrator
                .fetch_content(DEFAULT_TOOL_NAME, &tree, path)
                .await
                .context("Failed to fetch content")?;

            match mode {
                FileMode::Analyze => {
                    let analysis = orchestrator.analyze(&content).await.context("Analysis failed")?;
                    writeln!(out, "Analysis:\n {}", analysis)?;
                }
                FileMode::Debug => {
                    let info = orchestrator.debug(&content).await.context("Debugging failed")?;
                    writeln!(out, "Debugging Information:\n {}", info)?;
                }
                FileMode::Recommend => {
                    let recommendations = orchestrator
                        .recommend(&content)
                        .await
                        .context("Recommendations failed")?;
                    writeln!(out, "Recommendations:\n {}", recommendations)?;
                }
                FileMode::Content => {
                    writeln!(out, "Content of {}:\n {}", path, content)?;
                }
            }
        }
        Action::Scaffold { .. } | Action::Invalid => run_local(action, out)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["toolbuilder"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_no_arguments_is_invalid() {
        let action = parse(&[]).action();
        assert_eq!(action, Action::Invalid);
        assert!(!action.requires_model());
    }

    #[test]
    fn test_subcommand_actions() {
        assert_eq!(
            parse(&["fetch", "tool1", "path/to/file"]).action(),
            Action::Fetch {
                tool_name: "tool1".to_string(),
                file_path: "path/to/file".to_string()
            }
        );
        assert_eq!(
            parse(&["select_algo", "context1"]).action(),
            Action::SelectAlgo {
                context: "context1".to_string()
            }
        );
        assert!(matches!(
            parse(&["craft", "c", "q", "a"]).action(),
            Action::Craft { .. }
        ));
        assert!(matches!(
            parse(&["scaffold"]).action(),
            Action::Scaffold { .. }
        ));
    }

    #[test]
    fn test_file_modes() {
        let mode = |args: &[&str]| match parse(args).action() {
            Action::File { mode, .. } => mode,
            other => panic!("unexpected action {:?}", other),
        };
        assert_eq!(mode(&["-f", "a.rs"]), FileMode::Content);
        assert_eq!(mode(&["-f", "a.rs", "--analyze"]), FileMode::Analyze);
        assert_eq!(mode(&["--file", "a.rs", "--debug"]), FileMode::Debug);
        assert_eq!(mode(&["-f", "a.rs", "--recommend"]), FileMode::Recommend);
    }

    #[test]
    fn test_conflicting_file_flags_rejected() {
        let result = Cli::try_parse_from(["toolbuilder", "-f", "a.rs", "--analyze", "--debug"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_query_requires_context() {
        assert_eq!(parse(&["-q", "query1"]).action(), Action::Invalid);
        assert_eq!(
            parse(&["-q", "query1", "-c", "context1"]).action(),
            Action::Query {
                query: "query1".to_string(),
                context: "context1".to_string()
            }
        );
    }

    #[test]
    fn test_placeholder_tree_without_repo() {
        assert_eq!(dir_tree(None).unwrap(), "...");
    }

    #[test]
    fn test_run_local_invalid() {
        let mut out: Vec<u8> = Vec::new();
        run_local(&Action::Invalid, &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Please provide valid command or options!\n"
        );
    }
}
