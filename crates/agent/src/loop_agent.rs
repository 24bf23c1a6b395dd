//! Agent loop: ask the model, resolve its reply, dispatch, record, repeat

use async_trait::async_trait;
use autopilot_config::{AiSettings, Config};
use autopilot_provider::{ChatParams, Message, Provider};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::commands::{register_default_commands, Services};
use crate::context::PromptBuilder;
use crate::dispatcher::{DispatchOutcome, Dispatcher};
use crate::registry::CommandRegistry;
use crate::resolver::{thoughts, CommandResolver, ParsedCommand, Thoughts};

pub const NEXT_COMMAND_PROMPT: &str =
    "Determine which next command to use, and respond using the format specified above:";

/// Per-run knobs taken from `agent.defaults`
#[derive(Debug, Clone)]
pub struct LoopSettings {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub max_cycles: u32,
    /// Most recent history messages replayed to the model each turn
    pub history_window: usize,
}

impl LoopSettings {
    pub fn from_config(config: &Config) -> Self {
        let defaults = &config.agent.defaults;
        Self {
            model: config.smart_model(),
            max_tokens: defaults.max_tokens,
            temperature: defaults.temperature,
            max_cycles: defaults.max_cycles,
            history_window: defaults.history_window,
        }
    }
}

impl Default for LoopSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Operator decision on a proposed command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Approval {
    Run,
    Stop,
    /// Skip the command and hand this text back to the model instead
    Feedback(String),
}

/// Consulted before every command runs
#[async_trait]
pub trait TurnGate: Send {
    async fn approve(&mut self, command: &ParsedCommand, thoughts: Option<&Thoughts>) -> Approval;
}

/// Approves everything (continuous mode)
pub struct AutoApprove;

#[async_trait]
impl TurnGate for AutoApprove {
    async fn approve(&mut self, _command: &ParsedCommand, _thoughts: Option<&Thoughts>) -> Approval {
        Approval::Run
    }
}

/// What one turn did
#[derive(Debug, Clone, PartialEq)]
pub enum TurnResult {
    Continue {
        command: Option<String>,
        result: String,
    },
    Completed {
        reason: String,
    },
    Stopped,
}

/// How a whole run ended
#[derive(Debug, Clone, PartialEq)]
pub enum LoopOutcome {
    Completed { reason: String, cycles: u32 },
    Stopped { cycles: u32 },
    CycleLimit { cycles: u32 },
}

/// Append-only, timestamped transcript in the workspace
#[derive(Debug, Clone)]
pub struct ActivityLog {
    path: PathBuf,
}

impl ActivityLog {
    pub const FILE_NAME: &'static str = "activity.log";

    pub fn new(workspace: &Path) -> Self {
        Self {
            path: workspace.join(Self::FILE_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn record(&self, title: &str, body: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        let stamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        file.write_all(format!("{} {} {}\n", stamp, title, body).as_bytes())
            .await
    }
}

pub struct AgentLoop {
    provider: Arc<dyn Provider>,
    dispatcher: Dispatcher,
    resolver: CommandResolver,
    system_prompt: String,
    settings: LoopSettings,
    gate: Box<dyn TurnGate>,
    activity: Option<ActivityLog>,
    history: Vec<Message>,
    cycles: u32,
}

impl AgentLoop {
    pub fn new(
        provider: Arc<dyn Provider>,
        dispatcher: Dispatcher,
        system_prompt: impl Into<String>,
        settings: LoopSettings,
    ) -> Self {
        Self {
            provider,
            dispatcher,
            resolver: CommandResolver::default(),
            system_prompt: system_prompt.into(),
            settings,
            gate: Box::new(AutoApprove),
            activity: None,
            history: Vec::new(),
            cycles: 0,
        }
    }

    /// Full wiring for a loaded config: registry, services, handlers, prompt
    pub fn from_config(config: &Config, provider: Arc<dyn Provider>, ai: &AiSettings) -> Self {
        let registry = Arc::new(CommandRegistry::new(config.execute_local_commands()));
        let mut dispatcher = Dispatcher::new();
        let services = Services::from_config(config, provider.clone());
        register_default_commands(&mut dispatcher, registry.clone(), config, services);

        let prompt = PromptBuilder::new().full_prompt(ai, &registry);
        Self::new(provider, dispatcher, prompt, LoopSettings::from_config(config))
            .with_activity_log(ActivityLog::new(&config.workspace_path()))
    }

    pub fn with_gate(mut self, gate: Box<dyn TurnGate>) -> Self {
        self.gate = gate;
        self
    }

    pub fn with_activity_log(mut self, log: ActivityLog) -> Self {
        self.activity = Some(log);
        self
    }

    pub fn with_resolver(mut self, resolver: CommandResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    pub fn cycles(&self) -> u32 {
        self.cycles
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    async fn log(&self, title: &str, body: &str) {
        if let Some(activity) = &self.activity {
            if let Err(e) = activity.record(title, body).await {
                warn!("◆ Failed to write activity log: {}", e);
            }
        }
    }

    fn build_messages(&self) -> Vec<Message> {
        let window = self.settings.history_window;
        let start = self.history.len().saturating_sub(window);
        let mut messages = vec![
            Message::system(self.system_prompt.clone()),
            PromptBuilder::time_message(),
        ];
        messages.extend(self.history[start..].iter().cloned());
        messages.push(Message::user(NEXT_COMMAND_PROMPT));
        messages
    }

    /// One model call and at most one command
    pub async fn step(&mut self) -> crate::Result<TurnResult> {
        self.cycles += 1;
        debug!("◆ Cycle {}", self.cycles);

        let params = ChatParams {
            model: self.settings.model.clone(),
            messages: self.build_messages(),
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
        };
        let raw = self.provider.chat(params).await?.into_text();
        self.log("ASSISTANT:", &raw).await;

        self.history.push(Message::user(NEXT_COMMAND_PROMPT));
        self.history.push(Message::assistant(raw.clone()));

        let resolved = self.resolver.parse(&raw).and_then(|value| {
            if let Some(t) = thoughts(&value) {
                log_thoughts(&t);
            }
            self.resolver
                .resolve_value(&value)
                .map(|parsed| (parsed, thoughts(&value)))
        });

        let (command, result) = match resolved {
            Err(e) => {
                warn!("◆ Unusable reply: {}", e);
                (None, format!("Error: {}", e))
            }
            Ok((parsed, thoughts)) => match self.gate.approve(&parsed, thoughts.as_ref()).await {
                Approval::Stop => {
                    info!("◆ Run stopped by operator");
                    self.log("SYSTEM:", "Stopped by operator").await;
                    return Ok(TurnResult::Stopped);
                }
                Approval::Feedback(text) => (None, format!("Human feedback: {}", text)),
                Approval::Run => match self.dispatcher.dispatch(&parsed).await {
                    DispatchOutcome::Shutdown { reason } => {
                        info!("◆ Task complete: {}", reason);
                        self.log("SYSTEM:", &format!("Shutting down: {}", reason))
                            .await;
                        return Ok(TurnResult::Completed { reason });
                    }
                    DispatchOutcome::Reply(text) => (
                        Some(parsed.name.clone()),
                        format!("Command {} returned: {}", parsed.name, text),
                    ),
                },
            },
        };

        self.log("SYSTEM:", &result).await;
        self.history.push(Message::system(result.clone()));
        Ok(TurnResult::Continue { command, result })
    }

    /// Step until `task_complete`, an operator stop, or the cycle limit
    pub async fn run(&mut self) -> crate::Result<LoopOutcome> {
        info!("◆ Starting run (max {} cycles)", self.settings.max_cycles);
        while self.cycles < self.settings.max_cycles {
            match self.step().await? {
                TurnResult::Continue { .. } => {}
                TurnResult::Completed { reason } => {
                    return Ok(LoopOutcome::Completed {
                        reason,
                        cycles: self.cycles,
                    })
                }
                TurnResult::Stopped => return Ok(LoopOutcome::Stopped { cycles: self.cycles }),
            }
        }
        info!("◆ Cycle limit reached");
        Ok(LoopOutcome::CycleLimit {
            cycles: self.cycles,
        })
    }
}

fn log_thoughts(t: &Thoughts) {
    if let Some(text) = &t.text {
        info!("◆ THOUGHTS: {}", text);
    }
    if let Some(reasoning) = &t.reasoning {
        debug!("◆ REASONING: {}", reasoning);
    }
    if let Some(plan) = &t.plan {
        debug!("◆ PLAN:\n{}", plan);
    }
    if let Some(criticism) = &t.criticism {
        debug!("◆ CRITICISM: {}", criticism);
    }
}
