//! Stub collaborators shared by the agent integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use autopilot_agent::services::{Browser, MediaOps, ProcessRunner, SearchBackend, SearchHit, ServiceError, WebPage};
use autopilot_agent::workspace::{self, FileOps, WorkspaceError};
use autopilot_agent::{register_default_commands, CommandRegistry, Dispatcher, Services};
use autopilot_config::Config;
use autopilot_provider::{ChatParams, ChatResponse, Provider, ProviderError};
use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Records every call and answers reads with a fixed text
#[derive(Default)]
pub struct StubFiles {
    pub calls: Mutex<Vec<String>>,
    pub fail_reads: bool,
}

impl StubFiles {
    pub fn failing() -> Self {
        Self {
            fail_reads: true,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl FileOps for StubFiles {
    async fn read(&self, file: &str) -> workspace::Result<String> {
        self.record(format!("read {}", file));
        if self.fail_reads {
            return Err(WorkspaceError::NotFound(file.to_string()));
        }
        Ok(format!("contents of {}", file))
    }

    async fn write(&self, file: &str, text: &str) -> workspace::Result<String> {
        self.record(format!("write {} {}", file, text));
        Ok("written".to_string())
    }

    async fn append(&self, file: &str, text: &str) -> workspace::Result<String> {
        self.record(format!("append {} {}", file, text));
        Ok("appended".to_string())
    }

    async fn delete(&self, files: &[String]) -> workspace::Result<String> {
        self.record(format!("delete {:?}", files));
        Ok("deleted".to_string())
    }

    async fn copy(&self, sources: &[String], destination: &str) -> workspace::Result<String> {
        self.record(format!("copy {:?} {}", sources, destination));
        Ok("copied".to_string())
    }

    async fn move_files(&self, sources: &[String], destination: &str) -> workspace::Result<String> {
        self.record(format!("move {:?} {}", sources, destination));
        Ok("moved".to_string())
    }

    async fn rename(&self, source: &str, destination: &str) -> workspace::Result<String> {
        self.record(format!("rename {} {}", source, destination));
        Ok("renamed".to_string())
    }

    async fn search(&self, directory: &str, _phrase: Option<&str>) -> workspace::Result<Vec<String>> {
        self.record(format!("search {}", directory));
        Ok(vec!["notes/a.txt".to_string()])
    }

    async fn create_directory(&self, directory: &str) -> workspace::Result<String> {
        self.record(format!("mkdir {}", directory));
        Ok("created".to_string())
    }

    async fn list_resources(&self) -> workspace::Result<Vec<String>> {
        Ok(vec!["File: a.txt".to_string()])
    }

    async fn summarize_resources(&self) -> workspace::Result<String> {
        Ok("Summary of contents".to_string())
    }

    async fn filesystem_tree(&self) -> workspace::Result<String> {
        Ok("file: a.txt, ".to_string())
    }
}

/// Returns one hit naming which backend answered
pub struct StubSearch {
    pub label: &'static str,
    pub calls: AtomicUsize,
}

impl StubSearch {
    pub fn new(label: &'static str) -> Arc<Self> {
        Arc::new(Self {
            label,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SearchBackend for StubSearch {
    async fn search(&self, query: &str, _num_results: u32) -> Result<Vec<SearchHit>, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![SearchHit {
            title: format!("{} result", self.label),
            href: "https://example.com".to_string(),
            body: query.to_string(),
        }])
    }
}

pub struct StubBrowser;

#[async_trait]
impl Browser for StubBrowser {
    async fn fetch(&self, url: &str) -> Result<WebPage, ServiceError> {
        Ok(WebPage {
            text: format!("Page text of {}", url),
            links: (1..=7)
                .map(|i| format!("Link {} (https://example.com/{})", i, i))
                .collect(),
        })
    }
}

pub struct StubMedia;

#[async_trait]
impl MediaOps for StubMedia {
    async fn generate_image(&self, _prompt: &str) -> Result<Vec<u8>, ServiceError> {
        Err(ServiceError::NotConfigured("services.image.api_key"))
    }

    async fn transcribe_audio(&self, _audio: Vec<u8>) -> Result<String, ServiceError> {
        Err(ServiceError::NotConfigured("services.huggingface.api_key"))
    }

    async fn post_tweet(&self, _text: &str) -> Result<String, ServiceError> {
        Ok("42".to_string())
    }
}

/// Answers with queued replies, then echoes the last user message
#[derive(Default)]
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<Result<String, ProviderError>>>,
    pub requests: Mutex<Vec<ChatParams>>,
}

impl ScriptedProvider {
    pub fn new(replies: Vec<Result<String, ProviderError>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    async fn chat(&self, params: ChatParams) -> autopilot_provider::Result<ChatResponse> {
        let last = params
            .messages
            .last()
            .map(|m| m.content.clone())
            .unwrap_or_default();
        self.requests.lock().unwrap().push(params);
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(text)) => Ok(ChatResponse::text(text)),
            Some(Err(e)) => Err(e),
            None => Ok(ChatResponse::text(format!("echo: {}", last))),
        }
    }

    fn default_model(&self) -> String {
        "scripted".to_string()
    }

    fn is_configured(&self) -> bool {
        true
    }
}

/// Dispatcher with every default command over stub collaborators
pub struct Harness {
    pub dispatcher: Dispatcher,
    pub files: Arc<StubFiles>,
    pub keyless: Arc<StubSearch>,
    pub official: Arc<StubSearch>,
    pub provider: Arc<ScriptedProvider>,
    pub workspace: TempDir,
}

pub struct HarnessOptions {
    pub files: StubFiles,
    pub execute_local_commands: bool,
    pub google_key: Option<&'static str>,
    pub replies: Vec<Result<String, ProviderError>>,
}

impl Default for HarnessOptions {
    fn default() -> Self {
        Self {
            files: StubFiles::default(),
            execute_local_commands: false,
            google_key: None,
            replies: Vec::new(),
        }
    }
}

pub fn config_for(workspace: &Path, execute_local_commands: bool) -> Config {
    let mut config = Config::default();
    config.agent.defaults.workspace = workspace.to_string_lossy().to_string();
    config.agent.defaults.execute_local_commands = execute_local_commands;
    config
}

impl Harness {
    pub fn new() -> Self {
        Self::with(HarnessOptions::default())
    }

    pub fn with(options: HarnessOptions) -> Self {
        let workspace = tempfile::tempdir().unwrap();
        let mut config = config_for(workspace.path(), options.execute_local_commands);
        if let Some(key) = options.google_key {
            config.services.google.api_key = key.to_string();
        }

        let files = Arc::new(options.files);
        let keyless = StubSearch::new("keyless");
        let official = StubSearch::new("official");
        let provider = ScriptedProvider::new(options.replies);

        let services = Services {
            files: files.clone(),
            provider: provider.clone(),
            keyless_search: keyless.clone(),
            official_search: config
                .google_api_key()
                .map(|_| official.clone() as Arc<dyn SearchBackend>),
            browser: Arc::new(StubBrowser),
            media: Arc::new(StubMedia),
            process: Arc::new(ProcessRunner::with_workspace(workspace.path())),
        };

        let registry = Arc::new(CommandRegistry::new(options.execute_local_commands));
        let mut dispatcher = Dispatcher::new();
        register_default_commands(&mut dispatcher, registry, &config, services);

        Self {
            dispatcher,
            files,
            keyless,
            official,
            provider,
            workspace,
        }
    }
}
