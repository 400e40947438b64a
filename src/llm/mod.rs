//! LLM integration module.
//!
//! Provides an OpenAI-compatible chat client, the [`ChatBackend`] seam it
//! implements, and the prompt composer used by every operation.

mod client;
mod prompts;

pub use client::{ChatBackend, LlmClient, Message, Role, extract_answer};
pub use prompts::{
    ChatPrompt, ContextSource, DIR_TREE_PLACEHOLDER, FILENAME_PLACEHOLDER, FunctionContext,
    PromptComposer, fill_template, load_template,
};
