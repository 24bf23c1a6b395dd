//! Autopilot agent core
//!
//! Resolves each model reply into exactly one command, runs it through a
//! registration-time handler table, and feeds the result back on the next turn.

use thiserror::Error;

pub mod commands;
pub mod context;
pub mod dispatcher;
pub mod json_repair;
pub mod loop_agent;
pub mod registry;
pub mod resolver;
pub mod services;
pub mod subagent;
pub mod workspace;

pub use commands::{
    register_default_commands, Arguments, Command, CommandError, CommandOutput, Services,
};
pub use context::PromptBuilder;
pub use dispatcher::{DispatchOutcome, Dispatcher};
pub use json_repair::{JsonRepair, LenientJsonRepair, RepairError};
pub use loop_agent::{
    ActivityLog, AgentLoop, Approval, AutoApprove, LoopOutcome, LoopSettings, TurnGate, TurnResult,
};
pub use registry::{map_command_synonyms, CommandRegistry, CommandSpec, NO_HELP};
pub use resolver::{CommandResolver, ParsedCommand, ResolveError, Thoughts};
pub use subagent::{SubAgentDirectory, SubAgentError};
pub use workspace::{FileOps, PathGuard, WorkspaceError, WorkspaceFiles};

/// Run-level failures; per-command failures never reach this type
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("model call failed: {0}")]
    Provider(#[from] autopilot_provider::ProviderError),

    #[error("config error: {0}")]
    Config(#[from] autopilot_config::ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AgentError>;
