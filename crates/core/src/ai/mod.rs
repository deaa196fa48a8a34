//! Text-generation backend used to analyse conflicts.

pub mod anthropic;

use async_trait::async_trait;

use crate::errors::BackendError;

pub use anthropic::AnthropicClient;

/// One prompt sent to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub model: String,
    pub prompt: String,
    pub max_tokens: u32,
}

/// A capability that turns a prompt into a text completion.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, BackendError>;
}
