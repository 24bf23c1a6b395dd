//! Command handlers
//!
//! Each command the model can name is one `Command` implementation. Handlers
//! receive the lazily-validated argument map and return either a reply for the
//! model or a shutdown request; failures surface as `CommandError` and are
//! rendered by the dispatcher.

pub mod agents;
pub mod code;
pub mod files;
pub mod media;
pub mod meta;
pub mod web;

use async_trait::async_trait;
use autopilot_config::Config;
use autopilot_provider::{Provider, ProviderError};
use serde_json::{Map, Value};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::dispatcher::Dispatcher;
use crate::registry::CommandRegistry;
use crate::services::{
    Browser, DuckDuckGoSearch, HttpBrowser, HttpMedia, MediaOps, ProcessRunner, SearchBackend,
    ServiceError,
};
use crate::subagent::{SubAgentDirectory, SubAgentError};
use crate::workspace::{FileOps, WorkspaceError, WorkspaceFiles};

/// Handler failures. Rendered as `Error: <message>` at the dispatch boundary.
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("missing required argument '{0}'")]
    MissingArgument(String),

    #[error("invalid argument '{name}': {reason}")]
    InvalidArgument { name: String, reason: String },

    #[error(transparent)]
    Workspace(#[from] WorkspaceError),

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error(transparent)]
    SubAgent(#[from] SubAgentError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("command '{0}' panicked")]
    Panicked(String),

    #[error("{0}")]
    Failed(String),
}

pub type Result<T> = std::result::Result<T, CommandError>;

/// What a handler produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutput {
    /// Text fed back to the model
    Reply(String),
    /// Terminal request to end the run
    Shutdown { reason: String },
}

impl CommandOutput {
    pub fn reply(text: impl Into<String>) -> Self {
        Self::Reply(text.into())
    }
}

/// String-keyed argument map, checked only when a handler reads it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments(Map<String, Value>);

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Anything but an object becomes an empty map
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Strings pass through, numbers and booleans are stringified, null is missing
    pub fn require_str(&self, key: &str) -> Result<String> {
        self.optional_str(key)
            .ok_or_else(|| CommandError::MissingArgument(key.to_string()))
    }

    pub fn optional_str(&self, key: &str) -> Option<String> {
        match self.0.get(key)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            other => Some(other.to_string()),
        }
    }

    /// A single string or an array of strings
    pub fn require_str_list(&self, key: &str) -> Result<Vec<String>> {
        match self.0.get(key) {
            None | Some(Value::Null) => Err(CommandError::MissingArgument(key.to_string())),
            Some(Value::String(s)) => Ok(vec![s.clone()]),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s.clone()),
                    Value::Number(n) => Ok(n.to_string()),
                    _ => Err(CommandError::InvalidArgument {
                        name: key.to_string(),
                        reason: "expected a string or a list of strings".to_string(),
                    }),
                })
                .collect(),
            Some(_) => Err(CommandError::InvalidArgument {
                name: key.to_string(),
                reason: "expected a string or a list of strings".to_string(),
            }),
        }
    }
}

impl From<Map<String, Value>> for Arguments {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Compact JSON, as the model wrote it
impl std::fmt::Display for Arguments {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", Value::Object(self.0.clone()))
    }
}

/// One dispatchable command
#[async_trait]
pub trait Command: Send + Sync {
    fn name(&self) -> &str;
    async fn execute(&self, args: &Arguments) -> Result<CommandOutput>;
}

/// Collaborators the handlers are built over
#[derive(Clone)]
pub struct Services {
    pub files: Arc<dyn FileOps>,
    pub provider: Arc<dyn Provider>,
    pub keyless_search: Arc<dyn SearchBackend>,
    /// Custom Search client, used only while a real key is configured
    pub official_search: Option<Arc<dyn SearchBackend>>,
    pub browser: Arc<dyn Browser>,
    pub media: Arc<dyn MediaOps>,
    pub process: Arc<ProcessRunner>,
}

impl Services {
    /// Real network and filesystem backends for a loaded config
    pub fn from_config(config: &Config, provider: Arc<dyn Provider>) -> Self {
        let workspace = config.workspace_path();
        let official_search = config.google_api_key().map(|key| {
            Arc::new(crate::services::GoogleCustomSearch::new(
                key,
                config.services.google.custom_search_engine_id.clone(),
            )) as Arc<dyn SearchBackend>
        });

        Self {
            files: Arc::new(WorkspaceFiles::new(workspace.clone())),
            provider,
            keyless_search: Arc::new(DuckDuckGoSearch::new()),
            official_search,
            browser: Arc::new(HttpBrowser::new()),
            media: Arc::new(HttpMedia::new(
                config.services.image.clone(),
                config.services.huggingface.clone(),
                config.services.twitter.clone(),
            )),
            process: Arc::new(ProcessRunner::with_workspace(workspace)),
        }
    }
}

/// Register every command in the table. The sub-agent directory created here
/// is shared only by the four agent commands.
pub fn register_default_commands(
    dispatcher: &mut Dispatcher,
    registry: Arc<CommandRegistry>,
    config: &Config,
    services: Services,
) {
    let fast_model = config.fast_model();
    let smart_model = config.smart_model();
    let max_tokens = config.agent.defaults.max_tokens;
    let workspace = config.workspace_path();

    // Web
    dispatcher.register(web::GoogleCommand::new(
        services.keyless_search.clone(),
        services.official_search.clone(),
        config.search_max_results(),
    ));
    let summarizer = Arc::new(crate::services::Summarizer::new(
        services.provider.clone(),
        fast_model.clone(),
        max_tokens,
    ));
    dispatcher.register(web::BrowseWebsiteCommand::new(
        services.browser.clone(),
        summarizer.clone(),
    ));
    dispatcher.register(web::TextSummaryCommand::new(
        services.browser.clone(),
        summarizer,
    ));
    dispatcher.register(web::HyperlinksCommand::new(services.browser.clone()));

    // Sub-agents
    let directory = Arc::new(Mutex::new(SubAgentDirectory::new(
        services.provider.clone(),
        max_tokens,
        config.agent.defaults.temperature,
    )));
    dispatcher.register(agents::StartAgentCommand::new(directory.clone(), fast_model));
    dispatcher.register(agents::MessageAgentCommand::new(directory.clone()));
    dispatcher.register(agents::ListAgentsCommand::new(directory.clone()));
    dispatcher.register(agents::DeleteAgentCommand::new(directory));

    // Files
    files::register(dispatcher, services.files.clone());

    // Code and processes
    code::register(
        dispatcher,
        services.provider.clone(),
        smart_model,
        max_tokens,
        services.process.clone(),
        config.execute_local_commands(),
    );

    // Media
    dispatcher.register(media::GenerateImageCommand::new(
        services.media.clone(),
        workspace.clone(),
    ));
    dispatcher.register(media::ReadAudioCommand::new(
        services.media.clone(),
        workspace,
    ));
    dispatcher.register(media::SendTweetCommand::new(services.media));

    // Meta
    dispatcher.register(meta::HelpCommand::new(registry.clone()));
    dispatcher.register(meta::ListCommandsCommand::new(registry));
    dispatcher.register(meta::DoNothingCommand);
    dispatcher.register(meta::TaskCompleteCommand);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(value: Value) -> Arguments {
        Arguments::from_value(value)
    }

    #[test]
    fn test_require_str_coerces_scalars() {
        let a = args(json!({"key": 3, "flag": true, "name": "x", "gone": null}));
        assert_eq!(a.require_str("key").unwrap(), "3");
        assert_eq!(a.require_str("flag").unwrap(), "true");
        assert_eq!(a.require_str("name").unwrap(), "x");
        assert_eq!(
            a.require_str("gone").unwrap_err().to_string(),
            "missing required argument 'gone'"
        );
        assert!(a.optional_str("absent").is_none());
    }

    #[test]
    fn test_require_str_list() {
        let a = args(json!({"one": "a.txt", "many": ["a.txt", "b.txt"], "bad": {"x": 1}}));
        assert_eq!(a.require_str_list("one").unwrap(), vec!["a.txt"]);
        assert_eq!(a.require_str_list("many").unwrap(), vec!["a.txt", "b.txt"]);
        assert!(matches!(
            a.require_str_list("bad"),
            Err(CommandError::InvalidArgument { .. })
        ));
        assert!(matches!(
            a.require_str_list("missing"),
            Err(CommandError::MissingArgument(_))
        ));
    }

    #[test]
    fn test_non_object_arguments_are_empty() {
        assert!(args(json!("text")).is_empty());
        assert!(args(json!([1, 2])).is_empty());
        assert_eq!(args(json!({"a": 1})).len(), 1);
    }

    #[test]
    fn test_display_is_compact_json() {
        assert_eq!(args(json!({"file": "a.txt"})).to_string(), r#"{"file":"a.txt"}"#);
        assert_eq!(Arguments::new().to_string(), "{}");
    }
}
