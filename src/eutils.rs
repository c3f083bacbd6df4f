//! NCBI E-utilities client.
//!
//! Two sequential calls: `esearch` turns a free-text query into PMIDs, then a
//! single batched `efetch` returns the XML records for those PMIDs.
//!
//! The contract-level functions ([`PubMedClient::search`],
//! [`PubMedClient::fetch_details`]) never fail: transport errors and
//! malformed bodies are logged and reported as an empty list. Callers who
//! need to tell "no results" from "request failed" use the `try_*` variants.

use crate::error::{FetcherError, Result};
use crate::parser::parse_articles;
use crate::record::PaperRecord;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error, info};

/// E-utilities base URL
pub const EUTILS_BASE_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";

/// Default number of PMIDs requested from esearch
pub const DEFAULT_MAX_RESULTS: usize = 10;

/// Per-request timeout
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client settings
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL the `esearch.fcgi` / `efetch.fcgi` paths are appended to
    pub base_url: String,
    /// Timeout applied to every request
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: EUTILS_BASE_URL.to_string(),
            timeout: REQUEST_TIMEOUT,
            user_agent: format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    /// Default settings pointed at a different server (used by tests and mirrors).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}

/// PubMed client for the esearch/efetch pair
pub struct PubMedClient {
    client: reqwest::Client,
    base_url: String,
}

impl PubMedClient {
    /// Create a new PubMedClient
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent)
            .timeout(config.timeout)
            .build()
            .map_err(|e| FetcherError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Search PubMed and return up to `max_results` PMIDs in relevance order.
    ///
    /// Any failure is logged and yields an empty list.
    pub async fn search(&self, query: &str, max_results: usize) -> Vec<String> {
        match self.try_search(query, max_results).await {
            Ok(ids) => ids,
            Err(e) => {
                error!(query = query, kind = failure_kind(&e), error = %e, "Error fetching data");
                Vec::new()
            }
        }
    }

    /// Fallible form of [`search`](Self::search).
    pub async fn try_search(&self, query: &str, max_results: usize) -> Result<Vec<String>> {
        let url = format!("{}/esearch.fcgi", self.base_url);
        let retmax = max_results.to_string();

        info!(query = query, max_results = max_results, "Searching PubMed");

        let body = self
            .get_text(
                &url,
                &[
                    ("db", "pubmed"),
                    ("term", query),
                    ("retmode", "json"),
                    ("retmax", retmax.as_str()),
                ],
            )
            .await?;

        let data: ESearchResponse = serde_json::from_str(&body)?;
        let mut ids = data.esearchresult.unwrap_or_default().idlist;
        ids.truncate(max_results);

        info!(count = ids.len(), "Search complete");
        Ok(ids)
    }

    /// Fetch and extract records for `ids` in a single batched request.
    ///
    /// An empty `ids` returns immediately without touching the network. Any
    /// failure is logged and yields an empty list.
    pub async fn fetch_details(&self, ids: &[String]) -> Vec<PaperRecord> {
        match self.try_fetch_details(ids).await {
            Ok(records) => records,
            Err(e) => {
                error!(count = ids.len(), kind = failure_kind(&e), error = %e, "Error fetching paper details");
                Vec::new()
            }
        }
    }

    /// Fallible form of [`fetch_details`](Self::fetch_details).
    pub async fn try_fetch_details(&self, ids: &[String]) -> Result<Vec<PaperRecord>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/efetch.fcgi", self.base_url);
        let id_list = ids.join(",");

        info!(count = ids.len(), "Fetching paper details");

        let body = self
            .get_text(
                &url,
                &[("db", "pubmed"), ("id", id_list.as_str()), ("retmode", "xml")],
            )
            .await?;

        let records = parse_articles(&body)?;
        info!(records = records.len(), "Details fetched");
        Ok(records)
    }

    async fn get_text(&self, url: &str, params: &[(&str, &str)]) -> Result<String> {
        debug!(url = url, "GET");
        let response = self.client.get(url).query(params).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(FetcherError::Api {
                code: status.as_u16(),
                message: format!("E-utilities error: {}", status),
            });
        }

        Ok(response.text().await?)
    }
}

fn failure_kind(e: &FetcherError) -> &'static str {
    if e.is_transport() {
        "transport"
    } else {
        "malformed response"
    }
}

// === esearch response types ===

#[derive(Debug, Deserialize)]
struct ESearchResponse {
    #[serde(default)]
    esearchresult: Option<ESearchResult>,
}

#[derive(Debug, Default, Deserialize)]
struct ESearchResult {
    #[serde(default)]
    idlist: Vec<String>,
}

/// Search PubMed with the default client.
///
/// Returns an empty list on any failure, including failure to build the client.
pub async fn search(query: &str, max_results: usize) -> Vec<String> {
    match PubMedClient::new(ClientConfig::default()) {
        Ok(client) => client.search(query, max_results).await,
        Err(e) => {
            error!(error = %e, "Error fetching data");
            Vec::new()
        }
    }
}

/// Fetch paper details with the default client.
///
/// Returns an empty list on any failure, and without a request when `ids` is empty.
pub async fn fetch_details(ids: &[String]) -> Vec<PaperRecord> {
    if ids.is_empty() {
        return Vec::new();
    }
    match PubMedClient::new(ClientConfig::default()) {
        Ok(client) => client.fetch_details(ids).await,
        Err(e) => {
            error!(error = %e, "Error fetching paper details");
            Vec::new()
        }
    }
}
