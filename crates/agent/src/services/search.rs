//! Web search backends for the `google` command

use async_trait::async_trait;
use reqwest::{Client, Url};
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::{ServiceError, USER_AGENT};

/// One search result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub href: String,
    pub body: String,
}

#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search(&self, query: &str, num_results: u32) -> Result<Vec<SearchHit>, ServiceError>;
}

/// Keyless search scraped from DuckDuckGo's HTML endpoint
pub struct DuckDuckGoSearch {
    client: Client,
    endpoint: String,
}

impl DuckDuckGoSearch {
    pub fn new() -> Self {
        Self::with_endpoint("https://html.duckduckgo.com/html/")
    }

    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

impl Default for DuckDuckGoSearch {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SearchBackend for DuckDuckGoSearch {
    async fn search(&self, query: &str, num_results: u32) -> Result<Vec<SearchHit>, ServiceError> {
        debug!("◆ Keyless search: {}", query);
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("q", query)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::Api {
                service: "duckduckgo",
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("error").to_string(),
            });
        }

        let html = response.text().await?;
        Ok(parse_duckduckgo_html(&html, num_results as usize))
    }
}

/// Extract results from a DuckDuckGo HTML result page
pub fn parse_duckduckgo_html(html: &str, limit: usize) -> Vec<SearchHit> {
    let document = Html::parse_document(html);
    let (Ok(result_sel), Ok(link_sel), Ok(snippet_sel)) = (
        Selector::parse(".result"),
        Selector::parse("a.result__a"),
        Selector::parse(".result__snippet"),
    ) else {
        return Vec::new();
    };

    document
        .select(&result_sel)
        .filter_map(|result| {
            let link = result.select(&link_sel).next()?;
            let href = unwrap_redirect(link.value().attr("href")?);
            let title = link.text().collect::<String>().trim().to_string();
            let body = result
                .select(&snippet_sel)
                .next()
                .map(|s| s.text().collect::<String>().trim().to_string())
                .unwrap_or_default();
            Some(SearchHit { title, href, body })
        })
        .take(limit)
        .collect()
}

/// DuckDuckGo wraps targets as `//duckduckgo.com/l/?uddg=<encoded>`
fn unwrap_redirect(href: &str) -> String {
    let absolute = if href.starts_with("//") {
        format!("https:{}", href)
    } else {
        href.to_string()
    };
    Url::parse(&absolute)
        .ok()
        .and_then(|url| {
            url.query_pairs()
                .find(|(k, _)| k == "uddg")
                .map(|(_, v)| v.into_owned())
        })
        .unwrap_or(absolute)
}

/// Official Google Custom Search JSON API
pub struct GoogleCustomSearch {
    client: Client,
    api_key: String,
    engine_id: String,
    endpoint: String,
}

impl GoogleCustomSearch {
    pub fn new(api_key: impl Into<String>, engine_id: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(15))
                .build()
                .unwrap_or_else(|_| Client::new()),
            api_key: api_key.into(),
            engine_id: engine_id.into(),
            endpoint: "https://www.googleapis.com/customsearch/v1".to_string(),
        }
    }
}

#[derive(Deserialize)]
struct GoogleResponse {
    #[serde(default)]
    items: Vec<GoogleItem>,
}

#[derive(Deserialize)]
struct GoogleItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
}

#[async_trait]
impl SearchBackend for GoogleCustomSearch {
    async fn search(&self, query: &str, num_results: u32) -> Result<Vec<SearchHit>, ServiceError> {
        if self.api_key.trim().is_empty() {
            return Err(ServiceError::NotConfigured("services.google.api_key"));
        }
        debug!("◆ Google search: {}", query);

        let num = num_results.clamp(1, 10).to_string();
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("key", self.api_key.as_str()),
                ("cx", self.engine_id.as_str()),
                ("q", query),
                ("num", num.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body: serde_json::Value = response.json().await?;
        if !status.is_success() {
            let message = body["error"]["message"]
                .as_str()
                .unwrap_or("unknown error")
                .to_string();
            let message = if status.as_u16() == 403 && message.contains("API key") {
                "The provided Google API key is invalid or missing.".to_string()
            } else {
                message
            };
            return Err(ServiceError::Api {
                service: "google",
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GoogleResponse = serde_json::from_value(body)?;
        Ok(parsed
            .items
            .into_iter()
            .map(|item| SearchHit {
                title: item.title,
                href: item.link,
                body: item.snippet,
            })
            .collect())
    }
}
