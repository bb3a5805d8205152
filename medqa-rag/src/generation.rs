//! Generation provider trait for producing grounded answers.

use async_trait::async_trait;

use crate::error::Result;

/// A provider that maps a fully assembled prompt to generated text.
///
/// Implementations must distinguish two failure classes so callers can apply
/// the right policy:
///
/// - [`RagError::RateLimited`](crate::error::RagError::RateLimited) — the
///   backend refused transiently; the caller should back off and retry.
/// - [`RagError::GenerationFailed`](crate::error::RagError::GenerationFailed)
///   — anything else (malformed request, model error, network failure); the
///   caller must not blindly retry.
///
/// The bounded retry loop around this trait lives in
/// [`RetryingGenerator`](crate::retry::RetryingGenerator).
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Generate text for the given prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;
}
