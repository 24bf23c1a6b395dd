//! start_agent, message_agent, list_agents, delete_agent

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::{Arguments, Command, CommandOutput, Result};
use crate::subagent::{SubAgentDirectory, SubAgentError};

type SharedDirectory = Arc<Mutex<SubAgentDirectory>>;

const AGENT_INTRO: &str = "You are an agent helping to assist a central AI program with a given task. The central AI may not understand your limitations and capabilities, so you must be explicit and clear in your response to the central AI. If you do not have enough context to assist, let the central AI know the specific information that you need to assist properly.";

pub struct StartAgentCommand {
    directory: SharedDirectory,
    model: String,
}

impl StartAgentCommand {
    pub fn new(directory: SharedDirectory, model: impl Into<String>) -> Self {
        Self {
            directory,
            model: model.into(),
        }
    }
}

#[async_trait]
impl Command for StartAgentCommand {
    fn name(&self) -> &str {
        "start_agent"
    }

    async fn execute(&self, args: &Arguments) -> Result<CommandOutput> {
        let name = args.require_str("name")?;
        let task = args.require_str("task")?;
        let prompt = args.require_str("prompt")?;

        let first_message = format!("You are {}.  Respond with: \"Acknowledged\".", name);
        // The acknowledgement and the intro replies are not reported
        let (key, reply) = self
            .directory
            .lock()
            .await
            .open(
                &task,
                &[first_message.as_str(), AGENT_INTRO, prompt.as_str()],
                &self.model,
            )
            .await?;

        Ok(CommandOutput::reply(format!(
            "Agent {} created with key {}. First response: {}",
            name, key, reply
        )))
    }
}

pub struct MessageAgentCommand {
    directory: SharedDirectory,
}

impl MessageAgentCommand {
    pub fn new(directory: SharedDirectory) -> Self {
        Self { directory }
    }
}

#[async_trait]
impl Command for MessageAgentCommand {
    fn name(&self) -> &str {
        "message_agent"
    }

    async fn execute(&self, args: &Arguments) -> Result<CommandOutput> {
        let key = args.require_str("key")?;
        let message = args.require_str("message")?;

        match self.directory.lock().await.message(&key, &message).await {
            Ok(reply) => Ok(CommandOutput::Reply(reply)),
            // Key problems are answered in plain text, not as errors
            Err(e @ (SubAgentError::NonIntegerKey | SubAgentError::UnknownKey(_))) => {
                Ok(CommandOutput::Reply(e.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

pub struct ListAgentsCommand {
    directory: SharedDirectory,
}

impl ListAgentsCommand {
    pub fn new(directory: SharedDirectory) -> Self {
        Self { directory }
    }
}

#[async_trait]
impl Command for ListAgentsCommand {
    fn name(&self) -> &str {
        "list_agents"
    }

    async fn execute(&self, _args: &Arguments) -> Result<CommandOutput> {
        let lines = self
            .directory
            .lock()
            .await
            .list()
            .into_iter()
            .map(|(key, task)| format!("{}: {}", key, task))
            .collect::<Vec<_>>()
            .join("\n");
        Ok(CommandOutput::Reply(format!("List of agents:\n{}", lines)))
    }
}

pub struct DeleteAgentCommand {
    directory: SharedDirectory,
}

impl DeleteAgentCommand {
    pub fn new(directory: SharedDirectory) -> Self {
        Self { directory }
    }
}

#[async_trait]
impl Command for DeleteAgentCommand {
    fn name(&self) -> &str {
        "delete_agent"
    }

    async fn execute(&self, args: &Arguments) -> Result<CommandOutput> {
        let key = args.require_str("key")?;
        let deleted = self.directory.lock().await.delete(&key);
        Ok(CommandOutput::Reply(if deleted {
            format!("Agent {} deleted.", key)
        } else {
            format!("Agent {} does not exist.", key)
        }))
    }
}
