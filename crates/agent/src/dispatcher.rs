//! Executes one resolved command per turn

use futures::FutureExt;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use tracing::{debug, warn};

use crate::commands::{Command, CommandError, CommandOutput};
use crate::resolver::{CommandResolver, ParsedCommand};

type BoxedCommand = Box<dyn Command>;

/// Result of a dispatch; never an error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Reply(String),
    Shutdown { reason: String },
}

impl DispatchOutcome {
    /// Reply text, or the shutdown reason
    pub fn text(&self) -> &str {
        match self {
            Self::Reply(text) => text,
            Self::Shutdown { reason } => reason,
        }
    }

    pub fn is_shutdown(&self) -> bool {
        matches!(self, Self::Shutdown { .. })
    }
}

/// Name-to-handler table, fixed after registration
pub struct Dispatcher {
    commands: HashMap<String, BoxedCommand>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            commands: HashMap::new(),
        }
    }

    pub fn register<C: Command + 'static>(&mut self, command: C) {
        let name = command.name().to_string();
        self.commands.insert(name, Box::new(command));
    }

    pub fn has(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.commands.keys().cloned().collect();
        names.sort();
        names
    }

    /// Run the named handler. Unknown names, handler errors and handler panics
    /// all come back as reply text.
    pub async fn dispatch(&self, command: &ParsedCommand) -> DispatchOutcome {
        let Some(handler) = self.commands.get(&command.name) else {
            debug!("◆ Unknown command: {}", command.name);
            return DispatchOutcome::Reply(unknown_command(&command.name));
        };

        debug!("◆ Executing {} ({} args)", command.name, command.arguments.len());
        let result = AssertUnwindSafe(handler.execute(&command.arguments))
            .catch_unwind()
            .await
            .unwrap_or_else(|_| Err(CommandError::Panicked(command.name.clone())));

        match result {
            Ok(CommandOutput::Reply(text)) => DispatchOutcome::Reply(text),
            Ok(CommandOutput::Shutdown { reason }) => DispatchOutcome::Shutdown { reason },
            Err(e) => {
                warn!("◆ Command {} failed: {}", command.name, e);
                DispatchOutcome::Reply(format!("Error: {}", e))
            }
        }
    }

    /// Resolve a raw model reply and dispatch it. Resolution failures never
    /// reach a handler.
    pub async fn dispatch_response(
        &self,
        resolver: &CommandResolver,
        raw: &str,
    ) -> (Option<ParsedCommand>, DispatchOutcome) {
        match resolver.resolve(raw) {
            Ok(parsed) => {
                let outcome = self.dispatch(&parsed).await;
                (Some(parsed), outcome)
            }
            Err(e) => {
                warn!("◆ Could not resolve reply: {}", e);
                (None, DispatchOutcome::Reply(format!("Error: {}", e)))
            }
        }
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

pub fn unknown_command(name: &str) -> String {
    format!(
        "Unknown command '{}'. Please use list_commands to get a list of available commands and only respond in the specified JSON format.",
        name
    )
}
