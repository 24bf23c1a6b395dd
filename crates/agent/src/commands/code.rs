//! Model-backed code helpers and local process commands

use async_trait::async_trait;
use autopilot_provider::{ChatParams, Message, Provider};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use super::{Arguments, Command, CommandOutput, Result};
use crate::dispatcher::Dispatcher;
use crate::services::ProcessRunner;

pub const SHELL_DISABLED: &str = "You are not allowed to run local shell commands. To execute shell commands, EXECUTE_LOCAL_COMMANDS must be set to 'True' in your config. Do not attempt to bypass the restriction.";

/// Which pseudo-function the model is asked to act as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiFunction {
    EvaluateCode,
    ImproveCode,
    WriteTests,
}

impl AiFunction {
    fn command_name(self) -> &'static str {
        match self {
            AiFunction::EvaluateCode => "evaluate_code",
            AiFunction::ImproveCode => "improve_code",
            AiFunction::WriteTests => "write_tests",
        }
    }

    fn signature(self) -> &'static str {
        match self {
            AiFunction::EvaluateCode => "def analyze_code(code: str) -> list[str]:",
            AiFunction::ImproveCode => {
                "def generate_improved_code(suggestions: list[str], code: str) -> str:"
            }
            AiFunction::WriteTests => {
                "def create_test_cases(code: str, focus: Optional[str] = None) -> str:"
            }
        }
    }

    fn description(self) -> &'static str {
        match self {
            AiFunction::EvaluateCode => {
                "Analyzes the given code and returns a list of suggestions for improvements."
            }
            AiFunction::ImproveCode => {
                "Improves the provided code based on the suggestions provided, making no other changes."
            }
            AiFunction::WriteTests => {
                "Generates test cases for the existing code, focusing on specific areas if required."
            }
        }
    }

    /// Call arguments rendered as Python-ish literals
    fn call_args(self, args: &Arguments) -> Result<Vec<String>> {
        let code = args.require_str("code")?;
        Ok(match self {
            AiFunction::EvaluateCode => vec![code],
            AiFunction::ImproveCode => {
                let suggestions = match args.get("suggestions") {
                    Some(Value::Array(_)) => args.require_str_list("suggestions")?.join(", "),
                    _ => args.require_str("suggestions")?,
                };
                vec![format!("[{}]", suggestions), code]
            }
            AiFunction::WriteTests => vec![
                code,
                args.optional_str("focus").unwrap_or_else(|| "None".to_string()),
            ],
        })
    }
}

pub struct AiFunctionCommand {
    function: AiFunction,
    provider: Arc<dyn Provider>,
    model: String,
    max_tokens: u32,
}

impl AiFunctionCommand {
    pub fn new(
        function: AiFunction,
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        max_tokens: u32,
    ) -> Self {
        Self {
            function,
            provider,
            model: model.into(),
            max_tokens,
        }
    }
}

#[async_trait]
impl Command for AiFunctionCommand {
    fn name(&self) -> &str {
        self.function.command_name()
    }

    async fn execute(&self, args: &Arguments) -> Result<CommandOutput> {
        let call_args = self.function.call_args(args)?.join(", ");
        let system = format!(
            "You are now the following python function: ```# {}\n{}```\n\nOnly respond with your `return` value.",
            self.function.description(),
            self.function.signature()
        );
        debug!("◆ AI function {} with {} chars of input", self.name(), call_args.len());

        let params = ChatParams {
            model: self.model.clone(),
            messages: vec![Message::system(system), Message::user(call_args)],
            max_tokens: self.max_tokens,
            temperature: 0.0,
        };
        let reply = self.provider.chat(params).await?.into_text();
        Ok(CommandOutput::Reply(reply))
    }
}

pub struct ExecutePythonFileCommand {
    runner: Arc<ProcessRunner>,
}

impl ExecutePythonFileCommand {
    pub fn new(runner: Arc<ProcessRunner>) -> Self {
        Self { runner }
    }
}

#[async_trait]
impl Command for ExecutePythonFileCommand {
    fn name(&self) -> &str {
        "execute_python_file"
    }

    async fn execute(&self, args: &Arguments) -> Result<CommandOutput> {
        let file = args.require_str("file")?;
        Ok(CommandOutput::Reply(
            self.runner.execute_python_file(&file).await?,
        ))
    }
}

/// Registered unconditionally so a disabled call gets the refusal text
/// instead of "Unknown command"
pub struct ExecuteShellCommand {
    runner: Arc<ProcessRunner>,
    enabled: bool,
}

impl ExecuteShellCommand {
    pub fn new(runner: Arc<ProcessRunner>, enabled: bool) -> Self {
        Self { runner, enabled }
    }
}

#[async_trait]
impl Command for ExecuteShellCommand {
    fn name(&self) -> &str {
        "execute_shell"
    }

    async fn execute(&self, args: &Arguments) -> Result<CommandOutput> {
        if !self.enabled {
            warn!("◆ Refused execute_shell: local commands are disabled");
            return Ok(CommandOutput::reply(SHELL_DISABLED));
        }
        let command_line = args.require_str("command_line")?;
        Ok(CommandOutput::Reply(
            self.runner.execute_shell(&command_line).await?,
        ))
    }
}

pub struct CloneRepositoryCommand {
    runner: Arc<ProcessRunner>,
}

impl CloneRepositoryCommand {
    pub fn new(runner: Arc<ProcessRunner>) -> Self {
        Self { runner }
    }
}

#[async_trait]
impl Command for CloneRepositoryCommand {
    fn name(&self) -> &str {
        "clone_repository"
    }

    async fn execute(&self, args: &Arguments) -> Result<CommandOutput> {
        let url = args.require_str("repository_url")?;
        let path = args.require_str("clone_path")?;
        Ok(CommandOutput::Reply(
            self.runner.clone_repository(&url, &path).await?,
        ))
    }
}

pub fn register(
    dispatcher: &mut Dispatcher,
    provider: Arc<dyn Provider>,
    smart_model: String,
    max_tokens: u32,
    runner: Arc<ProcessRunner>,
    execute_local_commands: bool,
) {
    for function in [
        AiFunction::EvaluateCode,
        AiFunction::ImproveCode,
        AiFunction::WriteTests,
    ] {
        dispatcher.register(AiFunctionCommand::new(
            function,
            provider.clone(),
            smart_model.clone(),
            max_tokens,
        ));
    }
    dispatcher.register(ExecutePythonFileCommand::new(runner.clone()));
    dispatcher.register(ExecuteShellCommand::new(runner.clone(), execute_local_commands));
    dispatcher.register(CloneRepositoryCommand::new(runner));
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_call_args() {
        let args = Arguments::from_value(json!({
            "suggestions": ["add docstrings", "use f-strings"],
            "code": "print(1)"
        }));
        assert_eq!(
            AiFunction::ImproveCode.call_args(&args).unwrap(),
            vec!["[add docstrings, use f-strings]", "print(1)"]
        );
        assert_eq!(
            AiFunction::WriteTests.call_args(&args).unwrap(),
            vec!["print(1)", "None"]
        );
        assert!(AiFunction::EvaluateCode
            .call_args(&Arguments::new())
            .is_err());
    }

    #[tokio::test]
    async fn test_shell_refused_when_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let command = ExecuteShellCommand::new(
            Arc::new(ProcessRunner::with_workspace(dir.path())),
            false,
        );
        let args = Arguments::from_value(json!({"command_line": "touch pwned"}));
        assert_eq!(
            command.execute(&args).await.unwrap(),
            CommandOutput::Reply(SHELL_DISABLED.to_string())
        );
        assert!(!dir.path().join("pwned").exists());
    }
}
