//! Generator trait — the abstraction over the text-generation backend.
//!
//! A generator takes a fully composed prompt and returns the backend's
//! text output verbatim. Model identity and credentials are fixed at
//! process start, not per request.

use async_trait::async_trait;

use crate::error::GenerationError;

#[async_trait]
pub trait Generator: Send + Sync {
    /// A human-readable name for this backend (e.g. "groq", "ollama").
    fn name(&self) -> &str;

    /// Generate text for one composed prompt. No internal retry; callers
    /// may wrap with their own retry policy.
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;

    /// Health check — can we reach the backend?
    async fn health_check(&self) -> Result<bool, GenerationError> {
        Ok(true)
    }
}
