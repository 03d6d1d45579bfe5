// Copyright 2025 Servus Altissimi (Pseudonym)

// Permission is hereby granted, free of charge, to any person obtaining a copy of this software and associated documentation files (the "Software"), to deal in the Software without restriction, including without limitation the rights to use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of the Software, and to permit persons to whom the Software is furnished to do so, subject to the following conditions:
// The above copyright notice and this permission notice shall be included in all copies or substantial portions of the Software.
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! Literature search across arXiv, Semantic Scholar and CrossRef.

pub mod arxiv;
pub mod crossref;
pub mod semantic_scholar;

use async_trait::async_trait;
use chrono::{DateTime, Datelike};
use futures::future::join_all;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

use crate::config::ApiConfig;
use crate::error::{ResearchError, Result};

pub use arxiv::ArxivClient;
pub use crossref::CrossRefClient;
pub use semantic_scholar::SemanticScholarClient;

/// Used when a source gives no usable publication year.
pub const DEFAULT_YEAR: i32 = 2024;
pub const DEFAULT_MAX_RESULTS: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paper {
    pub title: String,
    #[serde(rename = "abstract", default)]
    pub abstract_text: String,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default = "default_year")]
    pub year: i32,
    #[serde(default)]
    pub citations: Option<u32>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub doi: Option<String>,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub relevance_score: f64,
}

fn default_year() -> i32 {
    DEFAULT_YEAR
}

/// Common interface for the paper search backends.
#[async_trait]
pub trait LiteratureSource: Send + Sync {
    fn name(&self) -> &'static str;

    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<Paper>>;
}

pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub(crate) fn year_from_date(date: &str) -> Option<i32> {
    DateTime::parse_from_rfc3339(date.trim()).ok().map(|d| d.year())
}

/// Source names accepted on the CLI and the web API.
pub const SOURCE_NAMES: [&str; 3] = ["arxiv", "semantic_scholar", "crossref"];

/// "Semantic Scholar", "semantic-scholar" and "semantic_scholar" all name the same source.
pub fn normalize_source(name: &str) -> String {
    name.trim().to_lowercase().replace([' ', '-'], "_")
}

/// Outcome of a multi-source search. One failing source does not fail the rest.
#[derive(Debug, Default, Serialize)]
pub struct SearchOutcome {
    pub papers: Vec<Paper>,
    pub errors: Vec<String>,
}

// Unbounded, keyed by source, max results and query. No eviction.
type PaperCache = Arc<Mutex<HashMap<String, Vec<Paper>>>>;

#[derive(Clone)]
pub struct SearchService {
    sources: Vec<(&'static str, Arc<dyn LiteratureSource>)>,
    cache: PaperCache,
}

impl SearchService {
    pub fn new(client: Client, config: &ApiConfig) -> Self {
        let sources: Vec<(&'static str, Arc<dyn LiteratureSource>)> = vec![
            ("arxiv", Arc::new(ArxivClient::new(client.clone()))),
            (
                "semantic_scholar",
                Arc::new(SemanticScholarClient::new(client.clone(), config.semantic_scholar_key())),
            ),
            ("crossref", Arc::new(CrossRefClient::new(client, config.crossref_email()))),
        ];
        Self::with_sources(sources)
    }

    pub fn with_sources(sources: Vec<(&'static str, Arc<dyn LiteratureSource>)>) -> Self {
        Self {
            sources,
            cache: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn source(&self, key: &str) -> Result<Arc<dyn LiteratureSource>> {
        let key = normalize_source(key);
        self.sources
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, source)| source.clone())
            .ok_or(ResearchError::UnknownSource(key))
    }

    fn cached(&self, key: &str) -> Option<Vec<Paper>> {
        self.cache.lock().ok()?.get(key).cloned()
    }

    fn remember(&self, key: String, papers: &[Paper]) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(key, papers.to_vec());
        }
    }

    async fn search_one(&self, source: Arc<dyn LiteratureSource>, query: &str, max_results: usize) -> Result<Vec<Paper>> {
        let key = format!("{}_{}_{}", source.name(), max_results, query);
        if let Some(papers) = self.cached(&key) {
            info!("{}: {} cached results", source.name(), papers.len());
            return Ok(papers);
        }

        let papers = source.search(query, max_results).await?;
        info!("{}: found {} results", source.name(), papers.len());
        self.remember(key, &papers);
        Ok(papers)
    }

    /// Query every named source concurrently and merge by relevance.
    /// An empty `sources` list means arXiv only.
    pub async fn search(&self, query: &str, sources: &[String], max_results: usize) -> Result<SearchOutcome> {
        let names: Vec<String> = if sources.is_empty() {
            vec!["arxiv".to_string()]
        } else {
            sources.to_vec()
        };

        let resolved = names
            .iter()
            .map(|name| self.source(name))
            .collect::<Result<Vec<_>>>()?;

        let query = query.trim();
        let results = join_all(
            resolved
                .into_iter()
                .map(|source| self.search_one(source, query, max_results)),
        )
        .await;

        let mut outcome = SearchOutcome::default();
        for (name, result) in names.iter().zip(results) {
            match result {
                Ok(papers) => outcome.papers.extend(papers),
                Err(e) => {
                    warn!("Search on {} failed: {}", name, e);
                    outcome.errors.push(e.to_string());
                }
            }
        }

        outcome
            .papers
            .sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));
        Ok(outcome)
    }
}
