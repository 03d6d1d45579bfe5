// Copyright 2025 Servus Altissimi (Pseudonym)

// Permission is hereby granted, free of charge, to any person obtaining a copy of this software and associated documentation files (the "Software"), to deal in the Software without restriction, including without limitation the rights to use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of the Software, and to permit persons to whom the Software is furnished to do so, subject to the following conditions:
// The above copyright notice and this permission notice shall be included in all copies or substantial portions of the Software.
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use clap::Args;
use reqwest::Client;
use serde::Serialize;
use tokio::time::Duration;

pub const DEFAULT_GROQ_MODEL: &str = "llama-3.1-70b-versatile";

// Credentials, read from flags, the environment or a .env file
#[derive(Args, Debug, Clone, Default)]
pub struct ApiConfig {
    #[arg(long, env = "GROQ_API_KEY", hide_env_values = true, global = true)]
    pub groq_api_key: Option<String>,

    #[arg(long, env = "GROQ_MODEL", default_value = DEFAULT_GROQ_MODEL, global = true)]
    pub groq_model: String,

    #[arg(long, env = "SEMANTIC_SCHOLAR_API_KEY", hide_env_values = true, global = true)]
    pub semantic_scholar_api_key: Option<String>,

    #[arg(long, env = "CROSSREF_EMAIL", global = true)]
    pub crossref_email: Option<String>,

    #[arg(long, env = "MATERIALS_PROJECT_API_KEY", hide_env_values = true, global = true)]
    pub materials_project_api_key: Option<String>,
}

/// Which remote services have usable credentials.
#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceStatus {
    pub groq: bool,
    pub semantic_scholar: bool,
    pub materials_project: bool,
    pub crossref_polite_pool: bool,
}

impl ApiConfig {
    pub fn groq_key(&self) -> Option<String> {
        non_blank(&self.groq_api_key)
    }

    pub fn groq_model(&self) -> String {
        let model = self.groq_model.trim();
        if model.is_empty() {
            DEFAULT_GROQ_MODEL.to_string()
        } else {
            model.to_string()
        }
    }

    pub fn semantic_scholar_key(&self) -> Option<String> {
        non_blank(&self.semantic_scholar_api_key)
    }

    pub fn crossref_email(&self) -> Option<String> {
        non_blank(&self.crossref_email)
    }

    pub fn materials_project_key(&self) -> Option<String> {
        non_blank(&self.materials_project_api_key)
    }

    pub fn status(&self) -> ServiceStatus {
        ServiceStatus {
            groq: self.groq_key().is_some(),
            semantic_scholar: self.semantic_scholar_key().is_some(),
            materials_project: self.materials_project_key().is_some(),
            crossref_polite_pool: self.crossref_email().is_some(),
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

pub fn http_client() -> reqwest::Result<Client> {
    Client::builder()
        .user_agent(concat!("ResearcherAI/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(30))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_values_are_unset() {
        let config = ApiConfig {
            groq_api_key: Some("   ".to_string()),
            groq_model: "  ".to_string(),
            semantic_scholar_api_key: Some(" s2-key ".to_string()),
            crossref_email: None,
            materials_project_api_key: Some(String::new()),
        };

        assert_eq!(config.groq_key(), None);
        assert_eq!(config.groq_model(), DEFAULT_GROQ_MODEL);
        assert_eq!(config.semantic_scholar_key().as_deref(), Some("s2-key"));
        assert_eq!(
            config.status(),
            ServiceStatus {
                groq: false,
                semantic_scholar: true,
                materials_project: false,
                crossref_polite_pool: false,
            }
        );
    }
}
