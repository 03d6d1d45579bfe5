// Copyright 2025 Servus Altissimi (Pseudonym)

// Permission is hereby granted, free of charge, to any person obtaining a copy of this software and associated documentation files (the "Software"), to deal in the Software without restriction, including without limitation the rights to use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of the Software, and to permit persons to whom the Software is furnished to do so, subject to the following conditions:
// The above copyright notice and this permission notice shall be included in all copies or substantial portions of the Software.
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use thiserror::Error;

/// Failures from the remote services. The material heuristics never produce one.
#[derive(Debug, Error)]
pub enum ResearchError {
    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::DeError),

    #[error("{service} API error [{status}]: {message}")]
    Api {
        service: &'static str,
        status: u16,
        message: String,
    },

    #[error("Empty response from {0}")]
    EmptyResponse(&'static str),

    #[error("Invalid response from {service}: {reason}")]
    InvalidResponse {
        service: &'static str,
        reason: String,
    },

    #[error("Unknown literature source: {0}")]
    UnknownSource(String),
}

impl ResearchError {
    /// HTTP status the web layer should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            ResearchError::NotConfigured(_) => 503,
            ResearchError::UnknownSource(_) => 400,
            _ => 502,
        }
    }
}

pub type Result<T> = std::result::Result<T, ResearchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = ResearchError::Api {
            service: "Groq",
            status: 401,
            message: "Invalid API Key".to_string(),
        };
        assert_eq!(err.to_string(), "Groq API error [401]: Invalid API Key");
        assert_eq!(
            ResearchError::NotConfigured("Semantic Scholar").to_string(),
            "Semantic Scholar is not configured"
        );
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(ResearchError::NotConfigured("Groq").status_code(), 503);
        assert_eq!(ResearchError::UnknownSource("pubmed".into()).status_code(), 400);
        assert_eq!(ResearchError::EmptyResponse("Groq").status_code(), 502);
    }
}
