//! help, list_commands, do_nothing, task_complete

use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use super::{Arguments, Command, CommandOutput, Result};
use crate::registry::{CommandRegistry, NO_HELP};

pub struct HelpCommand {
    registry: Arc<CommandRegistry>,
}

impl HelpCommand {
    pub fn new(registry: Arc<CommandRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl Command for HelpCommand {
    fn name(&self) -> &str {
        "help"
    }

    async fn execute(&self, args: &Arguments) -> Result<CommandOutput> {
        let command = args.require_str("command")?;
        let help = self.registry.help_text(&command);
        if help == NO_HELP {
            return Ok(CommandOutput::Reply(help));
        }
        Ok(CommandOutput::Reply(format!(
            "Help page for {}: {}. Respond in JSON with your next command.",
            command, help
        )))
    }
}

pub struct ListCommandsCommand {
    registry: Arc<CommandRegistry>,
}

impl ListCommandsCommand {
    pub fn new(registry: Arc<CommandRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl Command for ListCommandsCommand {
    fn name(&self) -> &str {
        "list_commands"
    }

    async fn execute(&self, _args: &Arguments) -> Result<CommandOutput> {
        Ok(CommandOutput::Reply(format!("{:?}", self.registry.names())))
    }
}

pub struct DoNothingCommand;

#[async_trait]
impl Command for DoNothingCommand {
    fn name(&self) -> &str {
        "do_nothing"
    }

    async fn execute(&self, _args: &Arguments) -> Result<CommandOutput> {
        Ok(CommandOutput::reply("No action performed."))
    }
}

pub struct TaskCompleteCommand;

#[async_trait]
impl Command for TaskCompleteCommand {
    fn name(&self) -> &str {
        "task_complete"
    }

    async fn execute(&self, args: &Arguments) -> Result<CommandOutput> {
        let reason = args
            .optional_str("reason")
            .unwrap_or_else(|| "Task complete".to_string());
        info!("◆ Shutting down: {}", reason);
        Ok(CommandOutput::Shutdown { reason })
    }
}
