// ┬─┐┌─┐┌─┐┌─┐┌─┐┬─┐┌─┐┬ ┬┌─┐┬─┐
// ├┬┘├┤ └─┐├┤ ├─┤├┬┘│  ├─┤├┤ ├┬┘
// ┴└─└─┘└─┘└─┘┴ ┴┴└─└─┘┴ ┴└─┘┴└─

// Searches arXiv, Semantic Scholar & CrossRef, asks Groq for insights,
// and predicts material properties via the Materials Project (or heuristics).

// Copyright 2025 Servus Altissimi (Pseudonym)

// Permission is hereby granted, free of charge, to any person obtaining a copy of this software and associated documentation files (the "Software"), to deal in the Software without restriction, including without limitation the rights to use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of the Software, and to permit persons to whom the Software is furnished to do so, subject to the following conditions:
// The above copyright notice and this permission notice shall be included in all copies or substantial portions of the Software.
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

mod config;
mod error;
mod llm;
mod materials;
mod sources;
mod web;

use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use config::ApiConfig;
use llm::{ChatMessage, GroqClient, Role, DEFAULT_SYSTEM_PROMPT};
use materials::project::MaterialsProjectClient;
use materials::PredictionResult;
use sources::{normalize_source, SearchOutcome, SearchService, DEFAULT_MAX_RESULTS, SOURCE_NAMES};

#[derive(Parser, Debug)]
#[command(author, version, about = "ResearchAI: literature search, AI insights and material property prediction", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    api: ApiConfig,

    #[arg(short, long, default_value_t = false, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search papers across literature databases
    Search {
        query: String,

        /// Comma separated: arxiv, semantic_scholar, crossref
        #[arg(short, long, default_value = "arxiv", value_delimiter = ',')]
        sources: Vec<String>,

        #[arg(short, long, default_value_t = DEFAULT_MAX_RESULTS)]
        max_results: usize,
    },

    /// Search, then summarize the abstracts with Groq
    Insights {
        query: String,

        #[arg(short, long, default_value = "arxiv", value_delimiter = ',')]
        sources: Vec<String>,

        #[arg(short, long, default_value_t = 10)]
        max_results: usize,
    },

    /// Predict properties of a chemical formula, e.g. CsPbBr3
    Predict {
        formula: String,

        /// Print the raw JSON result
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Talk to the research assistant. Without a message, reads lines from stdin.
    Chat {
        message: Option<String>,
    },

    /// Serve the web interface
    Serve {
        #[arg(short, long, default_value_t = 6601)]
        port: u16,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "researcher_ai=debug,info" } else { "researcher_ai=info,warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_target(false)
        .init();
}

fn banner(title: &str) {
    println!("{}", "=".repeat(64));
    println!("   {}", title);
    println!("{}", "=".repeat(64));
}

fn print_papers(outcome: &SearchOutcome) {
    for (i, paper) in outcome.papers.iter().enumerate() {
        println!("\n[{}/{}] {}", i + 1, outcome.papers.len(), paper.title);
        println!("Source: {} ({})", paper.source, paper.year);
        if !paper.authors.is_empty() {
            println!("Authors: {}", paper.authors.join(", "));
        }
        if let Some(doi) = &paper.doi {
            println!("DOI: {}", doi);
        }
        if let Some(citations) = paper.citations {
            println!("Citations: {}", citations);
        }
        println!("URL: {}", paper.url);
        println!("Score: {:.2}/1.0", paper.relevance_score);

        let preview: String = paper.abstract_text.chars().take(200).collect();
        if preview.len() < paper.abstract_text.len() {
            println!("   \"{}...\"", preview);
        } else if !preview.is_empty() {
            println!("   \"{}\"", preview);
        }
    }

    for error in &outcome.errors {
        eprintln!("Warning: {}", error);
    }
    println!("\nFound {} papers\n", outcome.papers.len());
}

fn print_prediction(result: &PredictionResult) {
    banner(&format!("{} | {}", result.formula, result.classification));
    println!("Source: {}, confidence {:.0}%", result.source.as_str(), result.confidence * 100.0);

    let props = &result.properties;
    let or_na = |v: Option<String>| v.unwrap_or_else(|| "n/a".to_string());
    println!("Band gap: {} eV", or_na(props.band_gap.map(|v| format!("{:.2}", v))));
    println!("Efficiency: {} %", or_na(props.efficiency.map(|v| format!("{:.1}", v))));
    println!("Stability: {} /100", or_na(props.stability.map(|v| v.to_string())));

    if result.composition.is_empty() {
        println!("Composition: no element symbols recognized");
    } else {
        let composition: Vec<String> = result
            .composition
            .iter()
            .map(|(el, n)| format!("{}:{}", el, n))
            .collect();
        println!("Composition: {}", composition.join(" "));
    }

    println!("\nApplications:");
    for app in &result.suggested_applications {
        println!("   - {}", app);
    }
    if !result.warnings.is_empty() {
        println!("\nWarnings:");
        for warning in &result.warnings {
            println!("   ! {}", warning);
        }
    }
    println!("\nRecommendations:");
    for rec in &result.recommendations {
        println!("   - {}", rec);
    }
    println!("\n{}\n", result.rationale);
}

async fn chat_loop(groq: &GroqClient, first: Option<String>) -> Result<()> {
    let mut history = vec![ChatMessage::new(Role::System, DEFAULT_SYSTEM_PROMPT)];

    if let Some(message) = first {
        history.push(ChatMessage::new(Role::User, message));
        let reply = groq.chat(&history).await?;
        println!("{}", reply);
        return Ok(());
    }

    println!("Chatting with {} (empty line to quit)\n", groq.model());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            break;
        }
        history.push(ChatMessage::new(Role::User, line));
        let reply = groq.chat(&history).await?;
        println!("\n{}\n", reply);
        history.push(ChatMessage::new(Role::Assistant, reply));
    }
    Ok(())
}

fn check_sources(sources: &[String]) -> Result<()> {
    for source in sources {
        if !SOURCE_NAMES.contains(&normalize_source(source).as_str()) {
            return Err(anyhow!("Unknown source '{}'. Valid options: {}", source, SOURCE_NAMES.join(", ")));
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Values from .env only fill in what the environment does not set
    let dotenv = dotenvy::dotenv();
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    if let Ok(path) = dotenv {
        debug!("Loaded {}", path.display());
    }

    let client = config::http_client()?;

    match cli.command {
        Command::Search { query, sources, max_results } => {
            check_sources(&sources)?;
            banner("ResearchAI Literature Search");
            println!("\nQuery: {}", query);
            println!("Sources: {}", sources.join(", "));
            println!("Max results: {}\n", max_results);

            let search = SearchService::new(client, &cli.api);
            let outcome = search.search(&query, &sources, max_results).await?;
            print_papers(&outcome);
        }
        Command::Insights { query, sources, max_results } => {
            check_sources(&sources)?;
            let search = SearchService::new(client.clone(), &cli.api);
            let groq = GroqClient::new(client, cli.api.groq_key(), cli.api.groq_model());

            let outcome = search.search(&query, &sources, max_results).await?;
            if outcome.papers.is_empty() {
                return Err(anyhow!("No papers found for '{}'", query));
            }
            info!("Analyzing {} abstracts with {}", outcome.papers.len(), groq.model());

            let insights = groq.generate_insights(&outcome.papers).await?;
            banner(&format!("Insights: {}", query));
            for insight in insights {
                println!("{}", insight);
            }
            println!();
        }
        Command::Predict { formula, json } => {
            let materials = MaterialsProjectClient::new(client, cli.api.materials_project_key());
            if !materials.is_configured() {
                info!("MATERIALS_PROJECT_API_KEY not set, using heuristic prediction");
            }
            let result = materials.properties(formula.trim()).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_prediction(&result);
            }
        }
        Command::Chat { message } => {
            let groq = GroqClient::new(client, cli.api.groq_key(), cli.api.groq_model());
            chat_loop(&groq, message).await?;
        }
        Command::Serve { port } => {
            let state = web::AppState::new(client, cli.api);
            web::start_web_server(state, port).await;
        }
    }

    Ok(())
}
