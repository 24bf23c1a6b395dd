//! google, browse_website, get_text_summary, get_hyperlinks

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use super::{Arguments, Command, CommandError, CommandOutput, Result};
use crate::services::{Browser, SearchBackend, Summarizer};

const MAX_LINKS: usize = 5;

/// Uses the official backend whenever one was configured, the keyless one otherwise
pub struct GoogleCommand {
    keyless: Arc<dyn SearchBackend>,
    official: Option<Arc<dyn SearchBackend>>,
    max_results: u32,
}

impl GoogleCommand {
    pub fn new(
        keyless: Arc<dyn SearchBackend>,
        official: Option<Arc<dyn SearchBackend>>,
        max_results: u32,
    ) -> Self {
        Self {
            keyless,
            official,
            max_results,
        }
    }
}

#[async_trait]
impl Command for GoogleCommand {
    fn name(&self) -> &str {
        "google"
    }

    async fn execute(&self, args: &Arguments) -> Result<CommandOutput> {
        let query = args.require_str("input")?;
        let backend = match &self.official {
            Some(official) => {
                debug!("◆ Using official search");
                official
            }
            None => &self.keyless,
        };
        let hits = backend.search(&query, self.max_results).await?;
        let rendered = serde_json::to_string_pretty(&hits)
            .map_err(|e| CommandError::Failed(e.to_string()))?;
        Ok(CommandOutput::Reply(rendered))
    }
}

pub struct BrowseWebsiteCommand {
    browser: Arc<dyn Browser>,
    summarizer: Arc<Summarizer>,
}

impl BrowseWebsiteCommand {
    pub fn new(browser: Arc<dyn Browser>, summarizer: Arc<Summarizer>) -> Self {
        Self {
            browser,
            summarizer,
        }
    }
}

#[async_trait]
impl Command for BrowseWebsiteCommand {
    fn name(&self) -> &str {
        "browse_website"
    }

    async fn execute(&self, args: &Arguments) -> Result<CommandOutput> {
        let url = args.require_str("url")?;
        let question = args.require_str("question")?;

        let page = self.browser.fetch(&url).await?;
        let summary = self.summarizer.summarize(&page.text, &question).await?;
        let links: Vec<&String> = page.links.iter().take(MAX_LINKS).collect();

        Ok(CommandOutput::Reply(format!(
            "Answer gathered from website: {} \n \n Links: {:?}",
            summary, links
        )))
    }
}

pub struct TextSummaryCommand {
    browser: Arc<dyn Browser>,
    summarizer: Arc<Summarizer>,
}

impl TextSummaryCommand {
    pub fn new(browser: Arc<dyn Browser>, summarizer: Arc<Summarizer>) -> Self {
        Self {
            browser,
            summarizer,
        }
    }
}

#[async_trait]
impl Command for TextSummaryCommand {
    fn name(&self) -> &str {
        "get_text_summary"
    }

    async fn execute(&self, args: &Arguments) -> Result<CommandOutput> {
        let url = args.require_str("url")?;
        let question = args.require_str("question")?;

        let page = self.browser.fetch(&url).await?;
        let summary = self.summarizer.summarize(&page.text, &question).await?;
        Ok(CommandOutput::Reply(format!(" \"Result\" : {}", summary)))
    }
}

pub struct HyperlinksCommand {
    browser: Arc<dyn Browser>,
}

impl HyperlinksCommand {
    pub fn new(browser: Arc<dyn Browser>) -> Self {
        Self { browser }
    }
}

#[async_trait]
impl Command for HyperlinksCommand {
    fn name(&self) -> &str {
        "get_hyperlinks"
    }

    async fn execute(&self, args: &Arguments) -> Result<CommandOutput> {
        let url = args.require_str("url")?;
        let page = self.browser.fetch(&url).await?;
        Ok(CommandOutput::Reply(format!("{:?}", page.links)))
    }
}
