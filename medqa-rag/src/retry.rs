//! Bounded-retry wrapper around a [`GenerationProvider`].
//!
//! This is the only retry/backoff logic in the system. Generation is the one
//! external call that is both expensive and routinely rate limited, so it
//! gets a bounded number of attempts with a fixed backoff; embedding and
//! indexing failures are structural and never retried.
//!
//! Sleeping goes through the [`Sleeper`] trait so attempt counts and backoff
//! durations are testable without real delays.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::error::{RagError, Result};
use crate::generation::GenerationProvider;

/// Instructional preamble prepended to every prompt.
const SYSTEM_PREAMBLE: &str = "You are a helpful clinical assistant. Based on the following \
                               information, answer the user's question accurately and clearly.";

/// Separator between context passages in the prompt.
const CONTEXT_SEPARATOR: &str = "\n---\n";

/// Maximum total generation attempts, including the first.
const MAX_ATTEMPTS: usize = 3;

/// Fixed wait between rate-limited attempts.
const BACKOFF: Duration = Duration::from_secs(60);

/// An injectable sleep, so tests can observe backoff without waiting.
#[async_trait]
pub trait Sleeper: Send + Sync {
    /// Suspend for the given duration.
    async fn sleep(&self, duration: Duration);
}

/// The production [`Sleeper`], backed by `tokio::time::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Build the grounded prompt from the user query and retrieved passages.
///
/// The prompt is assembled deterministically: fixed preamble, the passages in
/// retrieval order joined by a separator line, then the verbatim question.
/// An empty context set still produces a valid prompt.
pub fn build_prompt(query: &str, context_chunks: &[String]) -> String {
    format!(
        "{SYSTEM_PREAMBLE}\n\nContext:\n{}\n\nQuestion: {query}\nAnswer:",
        context_chunks.join(CONTEXT_SEPARATOR)
    )
}

/// Wraps a [`GenerationProvider`] with a bounded-attempt retry policy.
///
/// At most three total attempts are made. A
/// [`RagError::RateLimited`] outcome waits a fixed 60-second backoff and
/// retries; any other failure propagates immediately as
/// [`RagError::GenerationFailed`]. If every attempt is rate limited the
/// result is [`RagError::RetriesExhausted`]. The bound is deliberate: it
/// avoids blocking forever on a persistently saturated backend.
pub struct RetryingGenerator {
    provider: Arc<dyn GenerationProvider>,
    sleeper: Arc<dyn Sleeper>,
    max_attempts: usize,
    backoff: Duration,
}

impl RetryingGenerator {
    /// Create a generator with the default attempt bound and backoff,
    /// sleeping via [`TokioSleeper`].
    pub fn new(provider: Arc<dyn GenerationProvider>) -> Self {
        Self::with_sleeper(provider, Arc::new(TokioSleeper))
    }

    /// Create a generator with an injected [`Sleeper`].
    pub fn with_sleeper(provider: Arc<dyn GenerationProvider>, sleeper: Arc<dyn Sleeper>) -> Self {
        Self { provider, sleeper, max_attempts: MAX_ATTEMPTS, backoff: BACKOFF }
    }

    /// Override the attempt bound. Intended for tests and tuning.
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Override the fixed backoff between rate-limited attempts.
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Build the grounded prompt and generate an answer, retrying only on
    /// rate limiting.
    ///
    /// # Errors
    ///
    /// - [`RagError::GenerationFailed`] on the first non-transient failure,
    ///   with zero retries.
    /// - [`RagError::RetriesExhausted`] if every attempt was rate limited.
    pub async fn generate_with_retry(
        &self,
        query: &str,
        context_chunks: &[String],
    ) -> Result<String> {
        let prompt = build_prompt(query, context_chunks);

        for attempt in 1..=self.max_attempts {
            match self.provider.generate(&prompt).await {
                Ok(answer) => {
                    info!(attempt, "generation succeeded");
                    return Ok(answer);
                }
                Err(RagError::RateLimited(message)) => {
                    warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        backoff_secs = self.backoff.as_secs(),
                        %message,
                        "generation rate limited"
                    );
                    if attempt < self.max_attempts {
                        self.sleeper.sleep(self.backoff).await;
                    }
                }
                Err(RagError::GenerationFailed(message)) => {
                    return Err(RagError::GenerationFailed(message));
                }
                Err(other) => {
                    return Err(RagError::GenerationFailed(other.to_string()));
                }
            }
        }

        Err(RagError::RetriesExhausted { attempts: self.max_attempts })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Mutex;

    /// Fails with the scripted errors, then succeeds.
    struct ScriptedProvider {
        calls: Mutex<usize>,
        failures: Vec<RagError>,
        answer: &'static str,
    }

    impl ScriptedProvider {
        fn new(failures: Vec<RagError>) -> Self {
            Self { calls: Mutex::new(0), failures, answer: "the answer" }
        }

        fn calls(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl GenerationProvider for ScriptedProvider {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            let mut calls = self.calls.lock().unwrap();
            let index = *calls;
            *calls += 1;
            match self.failures.get(index) {
                Some(RagError::RateLimited(m)) => Err(RagError::RateLimited(m.clone())),
                Some(RagError::GenerationFailed(m)) => Err(RagError::GenerationFailed(m.clone())),
                Some(_) => unreachable!("scripted failures are generation errors"),
                None => Ok(self.answer.to_string()),
            }
        }
    }

    /// Records requested sleep durations instead of waiting.
    #[derive(Default)]
    struct RecordingSleeper {
        slept: Mutex<Vec<Duration>>,
    }

    #[async_trait]
    impl Sleeper for RecordingSleeper {
        async fn sleep(&self, duration: Duration) {
            self.slept.lock().unwrap().push(duration);
        }
    }

    fn rate_limited() -> RagError {
        RagError::RateLimited("quota".into())
    }

    #[tokio::test]
    async fn succeeds_on_third_attempt_after_two_rate_limits() {
        let provider = Arc::new(ScriptedProvider::new(vec![rate_limited(), rate_limited()]));
        let sleeper = Arc::new(RecordingSleeper::default());
        let generator = RetryingGenerator::with_sleeper(provider.clone(), sleeper.clone());

        let answer = generator.generate_with_retry("q", &[]).await.unwrap();
        assert_eq!(answer, "the answer");
        assert_eq!(provider.calls(), 3);
        assert_eq!(*sleeper.slept.lock().unwrap(), vec![BACKOFF, BACKOFF]);
    }

    #[tokio::test]
    async fn exhausts_after_three_rate_limits() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            rate_limited(),
            rate_limited(),
            rate_limited(),
        ]));
        let sleeper = Arc::new(RecordingSleeper::default());
        let generator = RetryingGenerator::with_sleeper(provider.clone(), sleeper.clone());

        let err = generator.generate_with_retry("q", &[]).await.unwrap_err();
        assert!(matches!(err, RagError::RetriesExhausted { attempts: 3 }));
        assert_eq!(provider.calls(), 3);
        // No pointless sleep after the final attempt.
        assert_eq!(sleeper.slept.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn permanent_failure_is_not_retried() {
        let provider = Arc::new(ScriptedProvider::new(vec![RagError::GenerationFailed(
            "bad request".into(),
        )]));
        let sleeper = Arc::new(RecordingSleeper::default());
        let generator = RetryingGenerator::with_sleeper(provider.clone(), sleeper.clone());

        let err = generator.generate_with_retry("q", &[]).await.unwrap_err();
        assert!(matches!(err, RagError::GenerationFailed(_)));
        assert_eq!(provider.calls(), 1);
        assert!(sleeper.slept.lock().unwrap().is_empty());
    }

    #[test]
    fn prompt_contains_query_and_context_in_order() {
        let prompt = build_prompt(
            "Why antibiotics?",
            &["first passage".to_string(), "second passage".to_string()],
        );
        assert!(prompt.starts_with(SYSTEM_PREAMBLE));
        assert!(prompt.contains("Context:\nfirst passage\n---\nsecond passage"));
        assert!(prompt.ends_with("Question: Why antibiotics?\nAnswer:"));
    }

    #[test]
    fn prompt_with_empty_context_is_still_well_formed() {
        let prompt = build_prompt("q", &[]);
        assert!(prompt.contains("Context:\n\n\nQuestion: q"));
    }
}
