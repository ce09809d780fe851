pub mod openai;

use async_trait::async_trait;

use crate::db::models::ChatTurn;
use crate::error::AppError;

// =============================================================================
// CompletionProvider trait
// =============================================================================

/// Abstraction over the hosted text-completion service.
///
/// The engine hands over an ordered list of role-tagged turns (one leading
/// system turn plus alternating user/assistant turns) and expects a single
/// reply text back. Failures are opaque and non-retriable at this layer.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Human-readable provider name for error messages and logs.
    fn provider_name(&self) -> &'static str;

    /// Send the conversation and return the reply text.
    async fn complete(&self, turns: &[ChatTurn]) -> Result<String, AppError>;
}

// =============================================================================
// Factory
// =============================================================================

/// Build the default provider from environment configuration.
///
/// A missing credential is a `Config` error, raised before any memory I/O
/// can happen for the turn.
pub fn from_env() -> Result<Box<dyn CompletionProvider>, AppError> {
    Ok(Box::new(openai::OpenAiProvider::from_env()?))
}
