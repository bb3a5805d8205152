//! External passage sources for literature-backed question answering.
//!
//! A [`PassageSource`] produces retrieval-sized passages for a query — the
//! corpus-acquisition half of the literature pipeline. The shipped
//! implementation queries PubMed through the NCBI Entrez E-utilities.

use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::{RagError, Result};

/// A source of raw text passages for a query.
///
/// Returning an empty `Vec` is not an error; the pipeline short-circuits to
/// a sentinel answer when a source yields nothing.
#[async_trait]
pub trait PassageSource: Send + Sync {
    /// Fetch up to `max_results` passages relevant to `query`.
    async fn fetch(&self, query: &str, max_results: usize) -> Result<Vec<String>>;
}

/// Base URL for the NCBI Entrez E-utilities.
const EUTILS_BASE_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";

/// A [`PassageSource`] that searches PubMed and fetches abstracts.
///
/// Performs an `esearch` for matching article IDs, then an `efetch` in
/// abstract/text mode, and splits the fetched text on blank lines into
/// trimmed passages (title + abstract blocks).
///
/// NCBI asks callers to identify themselves, so a contact e-mail is required
/// at construction.
pub struct PubMedSource {
    client: reqwest::Client,
    email: String,
}

#[derive(serde::Deserialize)]
struct EsearchResponse {
    esearchresult: EsearchResult,
}

#[derive(serde::Deserialize)]
struct EsearchResult {
    #[serde(default)]
    idlist: Vec<String>,
}

impl PubMedSource {
    /// Create a source identified to NCBI by the given contact e-mail.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Source`] if the e-mail is empty.
    pub fn new(email: impl Into<String>) -> Result<Self> {
        let email = email.into();
        if email.is_empty() {
            return Err(RagError::Source {
                provider: "PubMed".into(),
                message: "a contact e-mail is required for Entrez API access".into(),
            });
        }
        Ok(Self { client: reqwest::Client::new(), email })
    }

    fn source_err(&self, message: impl Into<String>) -> RagError {
        RagError::Source { provider: "PubMed".into(), message: message.into() }
    }

    async fn search_ids(&self, query: &str, max_results: usize) -> Result<Vec<String>> {
        let response = self
            .client
            .get(format!("{EUTILS_BASE_URL}/esearch.fcgi"))
            .query(&[
                ("db", "pubmed"),
                ("term", query),
                ("retmax", &max_results.to_string()),
                ("retmode", "json"),
                ("email", &self.email),
            ])
            .send()
            .await
            .map_err(|e| self.source_err(format!("esearch request failed: {e}")))?
            .error_for_status()
            .map_err(|e| self.source_err(format!("esearch returned an error status: {e}")))?;

        let parsed: EsearchResponse = response
            .json()
            .await
            .map_err(|e| self.source_err(format!("failed to parse esearch response: {e}")))?;

        Ok(parsed.esearchresult.idlist)
    }

    async fn fetch_abstracts(&self, ids: &[String]) -> Result<String> {
        let response = self
            .client
            .get(format!("{EUTILS_BASE_URL}/efetch.fcgi"))
            .query(&[
                ("db", "pubmed"),
                ("id", ids.join(",").as_str()),
                ("rettype", "abstract"),
                ("retmode", "text"),
                ("email", &self.email),
            ])
            .send()
            .await
            .map_err(|e| self.source_err(format!("efetch request failed: {e}")))?
            .error_for_status()
            .map_err(|e| self.source_err(format!("efetch returned an error status: {e}")))?;

        response
            .text()
            .await
            .map_err(|e| self.source_err(format!("failed to read efetch response: {e}")))
    }
}

/// Split fetched abstract text into trimmed, non-empty passages on blank lines.
pub(crate) fn split_abstracts(text: &str) -> Vec<String> {
    text.trim()
        .split("\n\n")
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

#[async_trait]
impl PassageSource for PubMedSource {
    async fn fetch(&self, query: &str, max_results: usize) -> Result<Vec<String>> {
        debug!(query, max_results, "searching PubMed");
        let ids = self.search_ids(query, max_results).await?;
        if ids.is_empty() {
            info!(query, "PubMed search returned no IDs");
            return Ok(Vec::new());
        }

        let text = self.fetch_abstracts(&ids).await?;
        let passages = split_abstracts(&text);
        info!(count = passages.len(), "fetched PubMed abstracts");
        Ok(passages)
    }
}
