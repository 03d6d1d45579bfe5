// Copyright 2025 Servus Altissimi (Pseudonym)

// Permission is hereby granted, free of charge, to any person obtaining a copy of this software and associated documentation files (the "Software"), to deal in the Software without restriction, including without limitation the rights to use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of the Software, and to permit persons to whom the Software is furnished to do so, subject to the following conditions:
// The above copyright notice and this permission notice shall be included in all copies or substantial portions of the Software.
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! Groq chat completions (OpenAI-compatible) for insights and the research chat.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::error::{ResearchError, Result};
use crate::sources::Paper;

const GROQ_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
const SERVICE: &str = "Groq";

const MAX_TOKENS: u32 = 800;
const TEMPERATURE: f32 = 0.7;
const MAX_ABSTRACTS: usize = 10;
// Larger payloads get rejected with a 400
const MAX_PROMPT_CHARS: usize = 8000;

pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are an expert research assistant. Be concise and cite when possible.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
}

pub struct GroqClient {
    client: Client,
    api_key: Option<String>,
    model: String,
}

impl GroqClient {
    pub fn new(client: Client, api_key: Option<String>, model: impl Into<String>) -> Self {
        Self {
            client,
            api_key,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Five bullet-point insights over the papers' abstracts, one line each.
    #[instrument(skip(self, papers), fields(n = papers.len()))]
    pub async fn generate_insights(&self, papers: &[Paper]) -> Result<Vec<String>> {
        let prompt = format!(
            "Analyze these research abstracts and provide 5 specific, evidence-backed insights for sustainability researchers. \
             Respond as bullet points only (no preamble):\n\n{}",
            combined_abstracts(papers)
        );
        let reply = self.complete(&[ChatMessage::new(Role::User, prompt)]).await?;
        Ok(split_lines(&reply))
    }

    /// One assistant turn. An empty history starts from the default system prompt.
    #[instrument(skip(self, messages), fields(n = messages.len()))]
    pub async fn chat(&self, messages: &[ChatMessage]) -> Result<String> {
        let defaults;
        let messages = if messages.is_empty() {
            defaults = [ChatMessage::new(Role::System, DEFAULT_SYSTEM_PROMPT)];
            &defaults[..]
        } else {
            messages
        };
        self.complete(messages).await
    }

    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ResearchError::NotConfigured(SERVICE))?;

        let request = CompletionRequest {
            model: &self.model,
            messages,
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
            top_p: 1.0,
        };

        let response = self
            .client
            .post(GROQ_API_URL)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(ResearchError::Api {
                service: SERVICE,
                status: status.as_u16(),
                message: error_message(&body, status.as_u16()),
            });
        }

        let json: Value = serde_json::from_str(&body)?;
        let content = reply_content(&json)?;
        debug!(chars = content.len(), "Groq reply");
        Ok(content)
    }
}

/// Up to ten non-empty abstracts, blank-line separated, capped in length.
fn combined_abstracts(papers: &[Paper]) -> String {
    let combined = papers
        .iter()
        .map(|p| p.abstract_text.trim())
        .filter(|a| !a.is_empty())
        .take(MAX_ABSTRACTS)
        .collect::<Vec<_>>()
        .join("\n\n");
    combined.chars().take(MAX_PROMPT_CHARS).collect()
}

fn split_lines(text: &str) -> Vec<String> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}

fn error_message(body: &str, status: u16) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| json["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| format!("HTTP {}", status))
}

fn reply_content(json: &Value) -> Result<String> {
    let choice = json["choices"]
        .as_array()
        .and_then(|choices| choices.first())
        .ok_or_else(|| ResearchError::InvalidResponse {
            service: SERVICE,
            reason: "no choices in response".to_string(),
        })?;

    match choice["message"]["content"].as_str() {
        Some(content) if !content.trim().is_empty() => Ok(content.to_string()),
        _ => Err(ResearchError::EmptyResponse(SERVICE)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn paper(abstract_text: &str) -> Paper {
        serde_json::from_value(json!({ "title": "t", "abstract": abstract_text })).unwrap()
    }

    #[test]
    fn test_combined_abstracts() {
        let papers = vec![paper("First."), paper("   "), paper("Second.")];
        assert_eq!(combined_abstracts(&papers), "First.\n\nSecond.");

        let many: Vec<Paper> = (0..15).map(|i| paper(&format!("A{}", i))).collect();
        let combined = combined_abstracts(&many);
        assert!(combined.ends_with("A9"));
        assert!(!combined.contains("A10"));

        let long = vec![paper(&"é".repeat(9000))];
        assert_eq!(combined_abstracts(&long).chars().count(), MAX_PROMPT_CHARS);
    }

    #[test]
    fn test_split_lines() {
        let reply = "- Perovskite stability dominates\n\n  \n- MOFs for CO2 capture\n";
        assert_eq!(
            split_lines(reply),
            vec!["- Perovskite stability dominates", "- MOFs for CO2 capture"]
        );
    }

    #[test]
    fn test_error_message() {
        let body = r#"{"error":{"message":"The model `x` does not exist","type":"invalid_request_error"}}"#;
        assert_eq!(error_message(body, 404), "The model `x` does not exist");
        assert_eq!(error_message("<html>bad gateway</html>", 502), "HTTP 502");
    }

    #[test]
    fn test_reply_content() {
        let ok = json!({ "choices": [{ "message": { "role": "assistant", "content": "Hi" } }] });
        assert_eq!(reply_content(&ok).unwrap(), "Hi");

        let empty = json!({ "choices": [{ "message": { "content": "" } }] });
        assert!(matches!(reply_content(&empty), Err(ResearchError::EmptyResponse(_))));

        let missing = json!({ "id": "x" });
        assert!(matches!(reply_content(&missing), Err(ResearchError::InvalidResponse { .. })));
    }

    #[test]
    fn test_request_shape() {
        let messages = [ChatMessage::new(Role::User, "hello")];
        let request = CompletionRequest {
            model: "llama-3.1-70b-versatile",
            messages: &messages,
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
            top_p: 1.0,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["max_tokens"], 800);
        assert_eq!(json["top_p"], 1.0);
    }

    #[tokio::test]
    async fn test_missing_key() {
        let groq = GroqClient::new(Client::new(), None, "llama-3.1-70b-versatile");
        let err = groq.chat(&[]).await.unwrap_err();
        assert!(matches!(err, ResearchError::NotConfigured("Groq")));
        let err = groq.generate_insights(&[paper("x")]).await.unwrap_err();
        assert!(matches!(err, ResearchError::NotConfigured(_)));
    }
}
