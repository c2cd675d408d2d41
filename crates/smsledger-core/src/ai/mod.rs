//! Pluggable extraction backend abstraction
//!
//! The pipeline talks to the structured-extraction service through the
//! `ExtractionBackend` trait: one call in, the raw model content out. The
//! pipeline owns parsing and validation of that content, so backends stay
//! pure transport.
//!
//! - `ExtractionBackend` trait: the interface
//! - `OpenAiBackend`: any server speaking the OpenAI chat-completions API
//! - `MockBackend`: scripted responses for tests

mod mock;
mod openai;
pub mod parsing;
pub mod types;

pub use mock::MockBackend;
pub use openai::OpenAiBackend;
pub use parsing::{parse_content, strip_code_fences, ModelVerdict};
pub use types::{
    ChatChoice, ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ChatResponseMessage,
    ModelExtraction,
};

use async_trait::async_trait;

use crate::error::Result;

/// A structured-extraction service
///
/// Implementations own their transport, timeout, and retry behavior and
/// return the model's content string verbatim. Backends should be
/// Send + Sync to allow use across async tasks.
#[async_trait]
pub trait ExtractionBackend: Send + Sync {
    /// Run one extraction request and return the model's message content
    async fn extract(&self, system_prompt: &str, user_message: &str) -> Result<String>;
}
