// Copyright 2025 Servus Altissimi (Pseudonym)

// Permission is hereby granted, free of charge, to any person obtaining a copy of this software and associated documentation files (the "Software"), to deal in the Software without restriction, including without limitation the rights to use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of the Software, and to permit persons to whom the Software is furnished to do so, subject to the following conditions:
// The above copyright notice and this permission notice shall be included in all copies or substantial portions of the Software.
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

// The single page UI and its JSON API.

use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;
use tracing::info;
use warp::http::StatusCode;
use warp::{Filter, Reply};

use crate::config::{ApiConfig, ServiceStatus};
use crate::error::ResearchError;
use crate::llm::{ChatMessage, GroqClient};
use crate::materials::project::MaterialsProjectClient;
use crate::sources::{Paper, SearchService, DEFAULT_MAX_RESULTS};

const MAX_BODY_BYTES: u64 = 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub search: SearchService,
    pub groq: Arc<GroqClient>,
    pub materials: Arc<MaterialsProjectClient>,
    pub config: Arc<ApiConfig>,
}

impl AppState {
    pub fn new(client: reqwest::Client, config: ApiConfig) -> Self {
        Self {
            search: SearchService::new(client.clone(), &config),
            groq: Arc::new(GroqClient::new(client.clone(), config.groq_key(), config.groq_model())),
            materials: Arc::new(MaterialsProjectClient::new(client, config.materials_project_key())),
            config: Arc::new(config),
        }
    }
}

#[derive(Debug, Serialize)]
struct StatusMessage {
    status: String,
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchRequest {
    query: String,
    #[serde(default)]
    sources: Vec<String>,
    #[serde(default)]
    max_results: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct InsightsRequest {
    papers: Vec<Paper>,
}

#[derive(Debug, Serialize)]
struct InsightsResponse {
    insights: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct PredictRequest {
    formula: String,
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    #[serde(default)]
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
struct ChatResponse {
    content: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusResponse {
    status: String,
    services: ServiceStatus,
    groq_model: String,
}

pub async fn start_web_server(state: AppState, port: u16) {
    info!("Web interface running on http://localhost:{}", port);
    warp::serve(routes(state)).run(([127, 0, 0, 1], port)).await;
}

fn with_state(state: AppState) -> impl Filter<Extract = (AppState,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

fn json_body<T: serde::de::DeserializeOwned + Send>() -> impl Filter<Extract = (T,), Error = warp::Rejection> + Clone {
    warp::body::content_length_limit(MAX_BODY_BYTES).and(warp::body::json())
}

pub fn routes(state: AppState) -> impl Filter<Extract = (impl Reply,), Error = warp::Rejection> + Clone {
    let index = warp::get()
        .and(warp::path::end())
        .map(|| warp::reply::html(index_html()));

    let search = warp::post()
        .and(warp::path!("api" / "search"))
        .and(json_body())
        .and(with_state(state.clone()))
        .and_then(search_papers);

    let insights = warp::post()
        .and(warp::path!("api" / "insights"))
        .and(json_body())
        .and(with_state(state.clone()))
        .and_then(generate_insights);

    let materials = warp::post()
        .and(warp::path!("api" / "materials"))
        .and(json_body())
        .and(with_state(state.clone()))
        .and_then(predict_material);

    let chat = warp::post()
        .and(warp::path!("api" / "chat"))
        .and(json_body())
        .and(with_state(state.clone()))
        .and_then(chat_turn);

    let status = warp::get()
        .and(warp::path!("api" / "status"))
        .and(with_state(state))
        .map(|state: AppState| {
            warp::reply::json(&StatusResponse {
                status: "ok".to_string(),
                services: state.config.status(),
                groq_model: state.groq.model().to_string(),
            })
        });

    index.or(search).or(insights).or(materials).or(chat).or(status)
}

fn error_reply(status: u16, message: impl Into<String>) -> warp::reply::Response {
    let code = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    warp::reply::with_status(
        warp::reply::json(&StatusMessage {
            status: "error".to_string(),
            message: message.into(),
        }),
        code,
    )
    .into_response()
}

fn research_error_reply(err: ResearchError) -> warp::reply::Response {
    error_reply(err.status_code(), err.to_string())
}

async fn search_papers(request: SearchRequest, state: AppState) -> Result<warp::reply::Response, warp::Rejection> {
    if request.query.trim().is_empty() {
        return Ok(error_reply(400, "Query must not be empty"));
    }
    let max_results = request.max_results.unwrap_or(DEFAULT_MAX_RESULTS).clamp(1, 100);

    match state.search.search(&request.query, &request.sources, max_results).await {
        Ok(outcome) => Ok(warp::reply::json(&outcome).into_response()),
        Err(e) => Ok(research_error_reply(e)),
    }
}

async fn generate_insights(request: InsightsRequest, state: AppState) -> Result<warp::reply::Response, warp::Rejection> {
    if request.papers.is_empty() {
        return Ok(error_reply(400, "No papers to analyze"));
    }
    match state.groq.generate_insights(&request.papers).await {
        Ok(insights) => Ok(warp::reply::json(&InsightsResponse { insights }).into_response()),
        Err(e) => Ok(research_error_reply(e)),
    }
}

async fn predict_material(request: PredictRequest, state: AppState) -> Result<warp::reply::Response, warp::Rejection> {
    let formula = request.formula.trim();
    if formula.is_empty() {
        return Ok(error_reply(400, "Formula must not be empty"));
    }
    let result = state.materials.properties(formula).await;
    Ok(warp::reply::json(&result).into_response())
}

async fn chat_turn(request: ChatRequest, state: AppState) -> Result<warp::reply::Response, warp::Rejection> {
    match state.groq.chat(&request.messages).await {
        Ok(content) => Ok(warp::reply::json(&ChatResponse { content }).into_response()),
        Err(e) => Ok(research_error_reply(e)),
    }
}

fn index_html() -> &'static str {
    r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>ResearchAI</title>
    <style>
        body { font-family: Arial; margin: 20px; background: #f5f5f5; min-height: 100vh; display: flex; flex-direction: column; }
        .content { flex: 1; }
        h1 { color: #333; }

        .status-message { padding: 10px; margin: 10px 0; display: none; }
        .status-message.error { background: #f8d7da; color: #721c24; border: 1px solid #f5c6cb; display: block; }

        input[type="text"], input[type="number"], textarea { padding: 8px; margin: 5px 0; width: 100%; box-sizing: border-box; }

        button { padding: 8px 16px; background: rgb(100, 149, 237); color: white; border: none; cursor: pointer; margin-right: 5px; }
        button:hover { background: #5a8dd4; }

        .result { background: white; padding: 15px; margin: 10px 0; border: 1px solid #ddd; }
        .result h3 { margin: 0 0 10px 0; }
        .result a { color: #007bff; text-decoration: none; }
        .score { font-weight: bold; color: rgb(0, 150, 255); }
        .info { color: #666; font-size: 14px; }
        .badge { background: #28a745; color: white; padding: 3px 8px; font-size: 12px; margin-right: 4px; display: inline-block; }
        .badge.warn { background: #dc3545; }

        .tabs { margin: 20px 0; border-bottom: 2px solid #ddd; }
        .tab { display: inline-block; padding: 10px 20px; cursor: pointer; background: #e9ecef; margin-right: 5px; }
        .tab.active { background: white; border: 1px solid #ddd; border-bottom: none; }
        .tab-content { display: none; }
        .tab-content.active { display: block; }

        .panel { background: white; padding: 20px; max-width: 800px; }
        .panel label { display: block; margin: 10px 0 5px 0; font-weight: bold; }
        .chat-line { margin: 6px 0; }
        .chat-line.user { color: #333; }
        .chat-line.assistant { color: #0b5394; }
    </style>
</head>
<body>
<div class="content">
    <h1>ResearchAI</h1>
    <div id="status" class="status-message"></div>

    <div class="tabs">
        <div class="tab active" data-tab="search">Search</div>
        <div class="tab" data-tab="insights">Insights</div>
        <div class="tab" data-tab="materials">Materials</div>
        <div class="tab" data-tab="chat">Chat</div>
    </div>

    <div id="search" class="tab-content active">
        <div class="panel">
            <label>Query</label>
            <input type="text" id="query" value="perovskite solar cells">
            <label>Sources</label>
            <input type="checkbox" id="src-arxiv" checked> arXiv
            <input type="checkbox" id="src-semantic_scholar"> Semantic Scholar
            <input type="checkbox" id="src-crossref"> CrossRef
            <label>Max results</label>
            <input type="number" id="max-results" value="20" min="1" max="100">
            <button onclick="searchPapers()">Search</button>
        </div>
        <div id="papers"></div>
    </div>

    <div id="insights" class="tab-content">
        <div class="panel">
            <p class="info">Insights are generated from the abstracts of the last search.</p>
            <button onclick="generateInsights()">Generate insights</button>
        </div>
        <div id="insight-list"></div>
    </div>

    <div id="materials" class="tab-content">
        <div class="panel">
            <label>Chemical formula</label>
            <input type="text" id="formula" value="CsPbBr3">
            <button onclick="predictMaterial()">Predict</button>
        </div>
        <div id="prediction"></div>
    </div>

    <div id="chat" class="tab-content">
        <div class="panel">
            <div id="chat-log"></div>
            <textarea id="chat-input" rows="3"></textarea>
            <button onclick="sendChat()">Send</button>
        </div>
    </div>
</div>

<script>
    let lastPapers = [];
    const chatHistory = [{ role: 'system', content: 'You are an expert research assistant. Be concise and cite when possible.' }];

    document.querySelectorAll('.tab').forEach(tab => tab.addEventListener('click', () => {
        document.querySelectorAll('.tab, .tab-content').forEach(el => el.classList.remove('active'));
        tab.classList.add('active');
        document.getElementById(tab.dataset.tab).classList.add('active');
    }));

    function escapeHtml(text) {
        const div = document.createElement('div');
        div.textContent = text == null ? '' : String(text);
        return div.innerHTML;
    }

    function showError(message) {
        const status = document.getElementById('status');
        status.textContent = message;
        status.className = message ? 'status-message error' : 'status-message';
    }

    async function post(path, body) {
        const response = await fetch(path, {
            method: 'POST',
            headers: { 'Content-Type': 'application/json' },
            body: JSON.stringify(body)
        });
        const data = await response.json();
        if (!response.ok) throw new Error(data.message || ('HTTP ' + response.status));
        return data;
    }

    async function searchPapers() {
        showError('');
        const sources = ['arxiv', 'semantic_scholar', 'crossref'].filter(s => document.getElementById('src-' + s).checked);
        try {
            const data = await post('/api/search', {
                query: document.getElementById('query').value,
                sources,
                maxResults: parseInt(document.getElementById('max-results').value, 10)
            });
            lastPapers = data.papers;
            if (data.errors.length) showError(data.errors.join(' | '));
            document.getElementById('papers').innerHTML = data.papers.map(p => `
                <div class="result">
                    <h3><a href="${escapeHtml(p.url)}" target="_blank">${escapeHtml(p.title)}</a></h3>
                    <div class="info">${escapeHtml(p.authors.join(', '))} (${p.year}) &middot; ${escapeHtml(p.source)}
                        ${p.citations != null ? ' &middot; ' + p.citations + ' citations' : ''}</div>
                    <div class="score">Relevance: ${p.relevanceScore.toFixed(2)}</div>
                    <p>${escapeHtml(p.abstract)}</p>
                </div>`).join('');
        } catch (e) { showError(e.message); }
    }

    async function generateInsights() {
        showError('');
        try {
            const data = await post('/api/insights', { papers: lastPapers });
            document.getElementById('insight-list').innerHTML =
                '<div class="result">' + data.insights.map(i => '<p>' + escapeHtml(i) + '</p>').join('') + '</div>';
        } catch (e) { showError(e.message); }
    }

    async function predictMaterial() {
        showError('');
        try {
            const r = await post('/api/materials', { formula: document.getElementById('formula').value });
            const props = r.properties;
            document.getElementById('prediction').innerHTML = `
                <div class="result">
                    <h3>${escapeHtml(r.formula)} <span class="info">${escapeHtml(r.classification)}</span></h3>
                    <div class="info">Source: ${escapeHtml(r.source)} &middot; confidence ${(r.confidence * 100).toFixed(0)}%</div>
                    <p>Band gap: ${props.bandGap ?? 'n/a'} eV &middot; Efficiency: ${props.efficiency ?? 'n/a'}% &middot; Stability: ${props.stability ?? 'n/a'}/100</p>
                    <p>${Object.entries(r.composition).map(([el, n]) => escapeHtml(el) + '<sub>' + n + '</sub>').join(' ')}</p>
                    <p>${r.suggestedApplications.map(a => '<span class="badge">' + escapeHtml(a) + '</span>').join('')}</p>
                    <p>${r.warnings.map(w => '<span class="badge warn">' + escapeHtml(w) + '</span>').join('')}</p>
                    <ul>${r.recommendations.map(x => '<li>' + escapeHtml(x) + '</li>').join('')}</ul>
                    <p class="info">${escapeHtml(r.rationale)}</p>
                </div>`;
        } catch (e) { showError(e.message); }
    }

    function renderChat() {
        document.getElementById('chat-log').innerHTML = chatHistory
            .filter(m => m.role !== 'system')
            .map(m => '<div class="chat-line ' + m.role + '"><b>' + m.role + ':</b> ' + escapeHtml(m.content) + '</div>')
            .join('');
    }

    async function sendChat() {
        showError('');
        const input = document.getElementById('chat-input');
        if (!input.value.trim()) return;
        chatHistory.push({ role: 'user', content: input.value });
        input.value = '';
        renderChat();
        try {
            const data = await post('/api/chat', { messages: chatHistory });
            chatHistory.push({ role: 'assistant', content: data.content });
            renderChat();
        } catch (e) { showError(e.message); }
    }
</script>
</body>
</html>"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn test_state() -> AppState {
        AppState::new(reqwest::Client::new(), ApiConfig::default())
    }

    #[tokio::test]
    async fn test_index_page() {
        let res = warp::test::request().method("GET").path("/").reply(&routes(test_state())).await;
        assert_eq!(res.status(), 200);
        assert!(String::from_utf8_lossy(res.body()).contains("<title>ResearchAI</title>"));
    }

    #[tokio::test]
    async fn test_materials_without_key() {
        let res = warp::test::request()
            .method("POST")
            .path("/api/materials")
            .json(&json!({ "formula": " CsPbBr3 " }))
            .reply(&routes(test_state()))
            .await;
        assert_eq!(res.status(), 200);

        let body: Value = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(body["formula"], "CsPbBr3");
        assert_eq!(body["classification"], "Halide Perovskite-like");
        assert_eq!(body["source"], "computational_prediction");
        assert_eq!(body["confidence"], 0.65);
    }

    #[tokio::test]
    async fn test_empty_formula_rejected() {
        let res = warp::test::request()
            .method("POST")
            .path("/api/materials")
            .json(&json!({ "formula": "  " }))
            .reply(&routes(test_state()))
            .await;
        assert_eq!(res.status(), 400);
        let body: Value = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(body["status"], "error");
    }

    #[tokio::test]
    async fn test_chat_without_key() {
        let res = warp::test::request()
            .method("POST")
            .path("/api/chat")
            .json(&json!({ "messages": [{ "role": "user", "content": "hi" }] }))
            .reply(&routes(test_state()))
            .await;
        assert_eq!(res.status(), 503);
        let body: Value = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(body["message"], "Groq is not configured");
    }

    #[tokio::test]
    async fn test_unknown_source() {
        let res = warp::test::request()
            .method("POST")
            .path("/api/search")
            .json(&json!({ "query": "mof", "sources": ["pubmed"] }))
            .reply(&routes(test_state()))
            .await;
        assert_eq!(res.status(), 400);
    }

    #[tokio::test]
    async fn test_status() {
        let res = warp::test::request().method("GET").path("/api/status").reply(&routes(test_state())).await;
        assert_eq!(res.status(), 200);
        let body: Value = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(body["services"]["groq"], false);
        assert_eq!(body["services"]["materialsProject"], false);
    }
}
