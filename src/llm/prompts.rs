//! Function contexts and prompt composition.
//!
//! A function context selects the system prompt ("persona") sent with a
//! request. Most contexts are literal text; the repository-content context
//! is backed by the file-retrieval template on disk.

use crate::error::{Result, ToolbuilderError};
use std::path::{Path, PathBuf};

/// Placeholder replaced with the repository directory tree.
pub const DIR_TREE_PLACEHOLDER: &str = "<REPO_DIR_TREE>";

/// Placeholder replaced with the requested file path.
pub const FILENAME_PLACEHOLDER: &str = "<REQUESTED_FILENAME>";

const GENERAL_REQUEST: &str = "You are a generalist AI, well-versed in multiple domains. Address the query with accurate and detailed information.";

/// Named system-prompt contexts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionContext {
    FetchRepositoryContent,
    SelectSearchAlgorithm,
    CraftPrompt,
    GeneralRequest,
    Analysis,
    DebuggingInfo,
    Recommendations,
}

/// Where a context's system prompt comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextSource {
    Literal(&'static str),
    /// The file-retrieval template configured on the composer.
    Template,
}

impl FunctionContext {
    pub const ALL: [FunctionContext; 7] = [
        FunctionContext::FetchRepositoryContent,
        FunctionContext::SelectSearchAlgorithm,
        FunctionContext::CraftPrompt,
        FunctionContext::GeneralRequest,
        FunctionContext::Analysis,
        FunctionContext::DebuggingInfo,
        FunctionContext::Recommendations,
    ];

    /// Wire label of the context.
    pub fn label(&self) -> &'static str {
        match self {
            FunctionContext::FetchRepositoryContent => "fetch_repository_content",
            FunctionContext::SelectSearchAlgorithm => "select_search_algorithm",
            FunctionContext::CraftPrompt => "craft_prompt",
            FunctionContext::GeneralRequest => "general_request",
            FunctionContext::Analysis => "get_analysis",
            FunctionContext::DebuggingInfo => "get_debugging_info",
            FunctionContext::Recommendations => "get_recommendations",
        }
    }

    /// Resolve a label, falling back to [`FunctionContext::GeneralRequest`].
    pub fn from_label(label: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|ctx| ctx.label() == label)
            .unwrap_or(FunctionContext::GeneralRequest)
    }

    pub fn source(&self) -> ContextSource {
        match self {
            FunctionContext::FetchRepositoryContent => ContextSource::Template,
            FunctionContext::SelectSearchAlgorithm => ContextSource::Literal(
                "You are the algorithm strategist entity. Reflecting on our earlier interactions, deduce the best search algorithm suited for the presented context.",
            ),
            FunctionContext::CraftPrompt => ContextSource::Literal(
                "You are the prompt artisan entity. Leveraging your understanding of the context and the chosen algorithm, design a compelling and effective prompt for the Tree of Thoughts algorithm.",
            ),
            FunctionContext::GeneralRequest => ContextSource::Literal(GENERAL_REQUEST),
            FunctionContext::Analysis => ContextSource::Literal(
                "You are an expert in analyzing code. Examine the following content and provide insights.",
            ),
            FunctionContext::DebuggingInfo => ContextSource::Literal(
                "You are a debugging expert. Analyze the following code and provide debugging information.",
            ),
            FunctionContext::Recommendations => ContextSource::Literal(
                "You are an optimization specialist. Review the following code and provide recommendations for optimization.",
            ),
        }
    }
}

/// An ordered system/user message pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatPrompt {
    pub system: String,
    pub user: String,
}

impl ChatPrompt {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
        }
    }
}

/// Read a prompt template from disk.
pub fn load_template(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| ToolbuilderError::template(path, e))
}

/// Substitute the directory-tree and filename placeholders.
pub fn fill_template(template: &str, dir_tree: &str, requested_file: &str) -> String {
    template
        .replace(DIR_TREE_PLACEHOLDER, dir_tree)
        .replace(FILENAME_PLACEHOLDER, requested_file)
}

/// Builds the message pair for each operation.
#[derive(Debug, Clone)]
pub struct PromptComposer {
    template_path: PathBuf,
}

impl PromptComposer {
    pub fn new(template_path: impl Into<PathBuf>) -> Self {
        Self {
            template_path: template_path.into(),
        }
    }

    /// Generic persona as system message, raw query as user message.
    pub fn compose_general(&self, query: &str) -> ChatPrompt {
        ChatPrompt::new(GENERAL_REQUEST, query)
    }

    /// Message pair for the context named `label`.
    ///
    /// Template-backed contexts use the template text verbatim, without
    /// placeholder substitution. Unknown labels use the generic context.
    pub fn compose_for_function(&self, request: &str, label: &str) -> Result<ChatPrompt> {
        self.compose_for_context(request, FunctionContext::from_label(label))
    }

    pub fn compose_for_context(
        &self,
        request: &str,
        context: FunctionContext,
    ) -> Result<ChatPrompt> {
        let system = match context.source() {
            ContextSource::Literal(text) => text.to_string(),
            ContextSource::Template => load_template(&self.template_path)?,
        };
        Ok(ChatPrompt::new(system, request))
    }

    /// File-retrieval prompt: filled template as system, `"{tool} | {path}"` as user.
    pub fn compose_fetch(
        &self,
        tool_name: &str,
        dir_tree: &str,
        target_file_path: &str,
    ) -> Result<ChatPrompt> {
        let template = load_template(&self.template_path)?;
        let system = fill_template(&template, dir_tree, target_file_path);
        Ok(ChatPrompt::new(
            system,
            format!("{} | {}", tool_name, target_file_path),
        ))
    }
}
