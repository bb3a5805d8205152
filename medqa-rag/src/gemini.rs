//! Gemini production adapters for embedding and generation.
//!
//! Both adapters call the Generative Language REST API directly with
//! `reqwest`. Authentication is by API key; no SDK is involved.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::generation::GenerationProvider;

/// Base URL for the Generative Language API.
const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default embedding model.
const DEFAULT_EMBEDDING_MODEL: &str = "embedding-001";

/// Dimensionality of `embedding-001` vectors.
const DEFAULT_DIMENSIONS: usize = 768;

/// Default generation model.
const DEFAULT_GENERATION_MODEL: &str = "gemini-1.5-pro";

// ── Embedding ──────────────────────────────────────────────────────

/// An [`EmbeddingProvider`] backed by the Gemini embedding API.
///
/// Embeds with task type `retrieval_document`, which suits both the corpus
/// passages and short queries at this scale.
///
/// # Example
///
/// ```rust,ignore
/// use medqa_rag::gemini::GeminiEmbedder;
///
/// let embedder = GeminiEmbedder::new(std::env::var("GEMINI_API_KEY")?)?;
/// let embedding = embedder.embed("Patient has fever.").await?;
/// ```
#[derive(Debug)]
pub struct GeminiEmbedder {
    client: reqwest::Client,
    api_key: String,
    model: String,
    dimensions: usize,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    content: ContentParts<'a>,
    #[serde(rename = "taskType")]
    task_type: &'a str,
}

#[derive(Serialize)]
struct ContentParts<'a> {
    parts: Vec<TextPart<'a>>,
}

#[derive(Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embedding: EmbeddingValues,
}

#[derive(Deserialize)]
struct EmbeddingValues {
    #[serde(default)]
    values: Vec<f32>,
}

impl GeminiEmbedder {
    /// Create an embedder with the default `embedding-001` model.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Embedding`] if the API key is empty.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(RagError::Embedding {
                provider: "Gemini".into(),
                message: "API key must not be empty".into(),
            });
        }
        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            model: DEFAULT_EMBEDDING_MODEL.into(),
            dimensions: DEFAULT_DIMENSIONS,
        })
    }

    /// Override the embedding model and its dimensionality.
    pub fn with_model(mut self, model: impl Into<String>, dimensions: usize) -> Self {
        self.model = model.into();
        self.dimensions = dimensions;
        self
    }

    fn embedding_err(&self, message: impl Into<String>) -> RagError {
        RagError::Embedding { provider: "Gemini".into(), message: message.into() }
    }
}

#[async_trait]
impl EmbeddingProvider for GeminiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        debug!(provider = "Gemini", text_len = text.len(), "embedding text");

        let url = format!(
            "{GEMINI_BASE_URL}/models/{}:embedContent?key={}",
            self.model, self.api_key
        );
        let body = EmbedRequest {
            content: ContentParts { parts: vec![TextPart { text }] },
            task_type: "RETRIEVAL_DOCUMENT",
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.embedding_err(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            error!(provider = "Gemini", %status, "embedding API error");
            return Err(self.embedding_err(format!("API returned {status}: {detail}")));
        }

        let parsed: EmbedResponse = response
            .json()
            .await
            .map_err(|e| self.embedding_err(format!("failed to parse response: {e}")))?;

        if parsed.embedding.values.is_empty() {
            return Err(self.embedding_err("empty embedding in response"));
        }

        Ok(parsed.embedding.values)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

// ── Generation ─────────────────────────────────────────────────────

/// A [`GenerationProvider`] backed by the Gemini `generateContent` API.
///
/// HTTP 429 responses surface as [`RagError::RateLimited`] so the retry
/// policy can distinguish them; every other failure is
/// [`RagError::GenerationFailed`].
#[derive(Debug)]
pub struct GeminiGenerator {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<ContentParts<'a>>,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

impl GeminiGenerator {
    /// Create a generator with the default `gemini-1.5-pro` model.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::GenerationFailed`] if the API key is empty.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(RagError::GenerationFailed("API key must not be empty".into()));
        }
        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            model: DEFAULT_GENERATION_MODEL.into(),
        })
    }

    /// Override the generation model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

#[async_trait]
impl GenerationProvider for GeminiGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        debug!(provider = "Gemini", model = %self.model, prompt_len = prompt.len(), "generating");

        let url = format!(
            "{GEMINI_BASE_URL}/models/{}:generateContent?key={}",
            self.model, self.api_key
        );
        let body = GenerateRequest {
            contents: vec![ContentParts { parts: vec![TextPart { text: prompt }] }],
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| RagError::GenerationFailed(format!("request failed: {e}")))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let detail = response.text().await.unwrap_or_default();
            return Err(RagError::RateLimited(format!("API returned 429: {detail}")));
        }
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            error!(provider = "Gemini", %status, "generation API error");
            return Err(RagError::GenerationFailed(format!("API returned {status}: {detail}")));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| RagError::GenerationFailed(format!("failed to parse response: {e}")))?;

        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .map(|c| c.content.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(RagError::GenerationFailed("no candidates in response".into()));
        }

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedder_rejects_empty_api_key_with_embedding_error() {
        let err = GeminiEmbedder::new("").unwrap_err();
        assert!(matches!(err, RagError::Embedding { .. }));
    }

    #[test]
    fn generator_rejects_empty_api_key_with_generation_error() {
        let err = GeminiGenerator::new("").unwrap_err();
        assert!(matches!(err, RagError::GenerationFailed(_)));
    }

    #[test]
    fn embedder_reports_default_dimensions() {
        let embedder = GeminiEmbedder::new("key").unwrap();
        assert_eq!(embedder.dimensions(), 768);
    }
}
