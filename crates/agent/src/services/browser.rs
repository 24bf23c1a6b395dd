//! Page fetching, text and link extraction, question-driven summaries

use async_trait::async_trait;
use autopilot_provider::{ChatParams, Message, Provider};
use reqwest::{Client, Url};
use scraper::{Html, Selector};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::{ServiceError, USER_AGENT};

const CHUNK_CHARS: usize = 8192;

/// Readable text and formatted hyperlinks of one page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WebPage {
    pub text: String,
    pub links: Vec<String>,
}

#[async_trait]
pub trait Browser: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<WebPage, ServiceError>;
}

/// Plain HTTP browser; no script execution
pub struct HttpBrowser {
    client: Client,
}

impl HttpBrowser {
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client }
    }
}

impl Default for HttpBrowser {
    fn default() -> Self {
        Self::new()
    }
}

/// Only absolute http(s) URLs are fetched
pub fn check_url(url: &str) -> Result<Url, ServiceError> {
    let parsed = Url::parse(url).map_err(|_| ServiceError::Failed("Invalid URL format".to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        "file" => Err(ServiceError::Failed(
            "Access to local files is restricted".to_string(),
        )),
        _ => Err(ServiceError::Failed("Invalid URL format".to_string())),
    }
}

#[async_trait]
impl Browser for HttpBrowser {
    async fn fetch(&self, url: &str) -> Result<WebPage, ServiceError> {
        let base = check_url(url)?;
        debug!("◆ Fetching {}", base);

        let response = self.client.get(base.clone()).send().await?;
        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(ServiceError::Api {
                service: "browser",
                status: status.as_u16(),
                message: format!("HTTP {} error", status.as_u16()),
            });
        }
        let final_url = response.url().clone();
        let html = response.text().await?;

        Ok(WebPage {
            text: extract_text(&html),
            links: extract_links(&html, &final_url),
        })
    }
}

/// Visible text, one phrase per line
pub fn extract_text(html: &str) -> String {
    let rendered = html2text::from_read(html.as_bytes(), 200);
    rendered
        .lines()
        .flat_map(|line| line.trim().split("  ").map(str::trim).collect::<Vec<_>>())
        .filter(|phrase| !phrase.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// `text (absolute url)` for every anchor with an href
pub fn extract_links(html: &str, base: &Url) -> Vec<String> {
    let document = Html::parse_document(html);
    let Ok(anchors) = Selector::parse("a[href]") else {
        return Vec::new();
    };
    document
        .select(&anchors)
        .filter_map(|a| {
            let href = a.value().attr("href")?;
            let url = base.join(href).ok()?;
            let text = a.text().collect::<String>().trim().to_string();
            Some(format!("{} ({})", text, url))
        })
        .collect()
}

/// Split on line boundaries into chunks of at most `max_chars` characters
pub fn split_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for line in text.lines() {
        let mut line = line.to_string();
        while line.chars().count() > max_chars {
            let split_at = line
                .char_indices()
                .nth(max_chars)
                .map(|(i, _)| i)
                .unwrap_or(line.len());
            let rest = line.split_off(split_at);
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
            chunks.push(line);
            line = rest;
        }
        if current.chars().count() + line.chars().count() + 1 > max_chars && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push('\n');
        }
        current.push_str(&line);
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Answers a question from page text with the fast model
pub struct Summarizer {
    provider: Arc<dyn Provider>,
    model: String,
    max_tokens: u32,
}

impl Summarizer {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            provider,
            model: model.into(),
            max_tokens,
        }
    }

    async fn ask(&self, text: &str, question: &str) -> Result<String, ServiceError> {
        let prompt = format!(
            "\"\"\"{}\"\"\" Using the above text, answer the following question: \"{}\" -- if the question cannot be answered using the text, summarize the text.",
            text, question
        );
        let params = ChatParams {
            model: self.model.clone(),
            messages: vec![Message::user(prompt)],
            max_tokens: self.max_tokens,
            temperature: 0.0,
        };
        Ok(self.provider.chat(params).await?.into_text())
    }

    /// Summarize each chunk, then summarize the summaries
    pub async fn summarize(&self, text: &str, question: &str) -> Result<String, ServiceError> {
        if text.trim().is_empty() {
            return Ok("Error: No text to summarize".to_string());
        }

        let chunks = split_text(text, CHUNK_CHARS);
        debug!("◆ Summarizing {} chunk(s)", chunks.len());
        let mut summaries = Vec::with_capacity(chunks.len());
        for chunk in &chunks {
            summaries.push(self.ask(chunk, question).await?);
        }

        if summaries.len() == 1 {
            return Ok(summaries.remove(0));
        }
        self.ask(&summaries.join("\n"), question).await
    }
}
