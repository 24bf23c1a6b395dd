//! Autopilot command implementations

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{info, warn};

use autopilot_agent::{
    AgentLoop, Approval, CommandRegistry, LoopOutcome, ParsedCommand, Thoughts, TurnGate,
};
use autopilot_config::{self, AiSettings, Config};
use autopilot_provider::openrouter::OpenRouterProvider;

/// Overrides for a single run
#[derive(Debug, Default)]
pub struct RunArgs {
    pub name: Option<String>,
    pub role: Option<String>,
    pub goals: Vec<String>,
    pub continuous: bool,
    pub max_cycles: Option<u32>,
}

/// Initialize config, workspace and AI settings
pub async fn init_command() -> Result<()> {
    println!("◆ Initializing Autopilot...");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let config = autopilot_config::init().await?;

    println!("\n◆ Autopilot initialized");
    println!("  Workspace:   {}", config.workspace_path().display());
    println!("  AI settings: {}", config.ai_settings_path().display());
    println!("\nNext steps:");
    println!(
        "  1. Add your API key to {}",
        autopilot_config::config_path().display()
    );
    println!("     Get one at: https://openrouter.ai/keys");
    println!("  2. Start a run: autopilot run --goal \"Write a haiku to haiku.txt\"");

    Ok(())
}

/// Run the agent loop until it completes, is stopped, or hits the cycle limit
pub async fn run_command(args: RunArgs) -> Result<()> {
    let mut config = Config::load().await?;
    if let Some(max_cycles) = args.max_cycles {
        config.agent.defaults.max_cycles = max_cycles;
    }

    let api_key = config
        .api_key()
        .with_context(|| {
            format!(
                "No API key configured. Set one in {}",
                autopilot_config::config_path().display()
            )
        })?;

    let mut settings = AiSettings::load_from(&config.ai_settings_path()).await?;
    if let Some(name) = args.name {
        settings.ai_name = name;
    }
    if let Some(role) = args.role {
        settings.ai_role = role;
    }
    if !args.goals.is_empty() {
        settings.ai_goals = args.goals;
    }

    tokio::fs::create_dir_all(config.workspace_path()).await?;

    let provider = Arc::new(OpenRouterProvider::new(
        api_key,
        config.api_base(),
        Some(config.smart_model()),
    ));
    let mut agent = AgentLoop::from_config(&config, provider, &settings);
    if !args.continuous {
        agent = agent.with_gate(Box::new(StdinGate::new()));
    } else {
        warn!("◆ Continuous mode: commands run without authorisation");
    }

    println!("◆ {} is starting", settings.ai_name);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Role: {}", settings.ai_role);
    for (i, goal) in settings.ai_goals.iter().enumerate() {
        println!("Goal {}: {}", i + 1, goal);
    }
    println!();

    let outcome = agent.run().await?;
    println!("\n{}", describe_outcome(&outcome));
    info!(
        "◆ Transcript kept in {}",
        config.workspace_path().join("activity.log").display()
    );

    Ok(())
}

fn describe_outcome(outcome: &LoopOutcome) -> String {
    match outcome {
        LoopOutcome::Completed { reason, cycles } => {
            format!("◆ Task complete after {} cycles: {}", cycles, reason)
        }
        LoopOutcome::Stopped { cycles } => format!("◆ Stopped by operator after {} cycles", cycles),
        LoopOutcome::CycleLimit { cycles } => format!("◆ Cycle limit of {} reached", cycles),
    }
}

/// Print the commands offered to the model, numbered as in the prompt
pub async fn commands_command() -> Result<()> {
    let config = Config::load().await?;
    let registry = CommandRegistry::new(config.execute_local_commands());

    println!("◆ Commands");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    for (i, spec) in registry.all_commands().iter().enumerate() {
        println!("{}. {}", i + 1, spec.prompt_line());
    }
    Ok(())
}

/// Print one command's help text
pub async fn help_command(command: &str) -> Result<()> {
    let config = Config::load().await?;
    let registry = CommandRegistry::new(config.execute_local_commands());
    println!("{}", registry.help_text(command));
    Ok(())
}

/// Show system status
pub async fn status_command() -> Result<()> {
    let config_path = autopilot_config::config_path();

    println!("◆ Autopilot System Status");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    println!(
        "Config:    {} {}",
        config_path.display(),
        if config_path.exists() {
            "[OK]"
        } else {
            "[Missing]"
        }
    );

    let config = Config::load().await?;
    let workspace = config.workspace_path();
    println!(
        "Workspace: {} {}",
        workspace.display(),
        if workspace.exists() { "[OK]" } else { "[Missing]" }
    );
    println!("Fast model:  {}", config.fast_model());
    println!("Smart model: {}", config.smart_model());
    println!(
        "API Key:   {}",
        if config.has_api_key() {
            "[Set]"
        } else {
            "[Missing]"
        }
    );
    println!(
        "Search:    {}",
        if config.google_api_key().is_some() {
            "[Google API]"
        } else {
            "[Keyless]"
        }
    );
    println!(
        "Shell:     {}",
        if config.execute_local_commands() {
            "[Enabled]"
        } else {
            "[Disabled]"
        }
    );

    println!("\n◆ Ready");

    Ok(())
}

/// What the operator typed at the authorisation prompt
#[derive(Debug, PartialEq, Eq)]
enum Reply {
    /// Run this command and the next `n - 1` without asking
    Approve(u32),
    Deny,
    Feedback(String),
    Invalid,
}

fn parse_reply(input: &str) -> Reply {
    let input = input.trim();
    if input.eq_ignore_ascii_case("y") {
        return Reply::Approve(1);
    }
    if input.eq_ignore_ascii_case("n") {
        return Reply::Deny;
    }
    if let Some(count) = input.strip_prefix("y -").or_else(|| input.strip_prefix("Y -")) {
        return match count.trim().parse::<u32>() {
            Ok(n) if n > 0 => Reply::Approve(n),
            _ => Reply::Invalid,
        };
    }
    if input.is_empty() {
        Reply::Invalid
    } else {
        Reply::Feedback(input.to_string())
    }
}

/// Asks on stdin before each command runs
struct StdinGate {
    lines: Lines<BufReader<Stdin>>,
    preapproved: u32,
}

impl StdinGate {
    fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
            preapproved: 0,
        }
    }
}

#[async_trait]
impl TurnGate for StdinGate {
    async fn approve(&mut self, command: &ParsedCommand, thoughts: Option<&Thoughts>) -> Approval {
        if let Some(t) = thoughts {
            print_thoughts(t);
        }
        println!(
            "NEXT ACTION: COMMAND = {} ARGUMENTS = {}",
            command.name, command.arguments
        );

        if self.preapproved > 0 {
            self.preapproved -= 1;
            return Approval::Run;
        }

        loop {
            print!("Enter 'y' to authorise command, 'y -N' to run N continuous commands, 'n' to exit program, or enter feedback: ");
            let _ = std::io::stdout().flush();

            let line = match self.lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => return Approval::Stop,
                Err(e) => {
                    warn!("◆ Failed to read stdin: {}", e);
                    return Approval::Stop;
                }
            };

            match parse_reply(&line) {
                Reply::Approve(n) => {
                    self.preapproved = n - 1;
                    return Approval::Run;
                }
                Reply::Deny => return Approval::Stop,
                Reply::Feedback(text) => return Approval::Feedback(text),
                Reply::Invalid => println!("Invalid input format."),
            }
        }
    }
}

fn print_thoughts(t: &Thoughts) {
    if let Some(text) = &t.text {
        println!("THOUGHTS: {}", text);
    }
    if let Some(reasoning) = &t.reasoning {
        println!("REASONING: {}", reasoning);
    }
    if let Some(plan) = &t.plan {
        println!("PLAN:\n{}", plan);
    }
    if let Some(criticism) = &t.criticism {
        println!("CRITICISM: {}", criticism);
    }
    if let Some(speak) = &t.speak {
        println!("SPEAK: {}", speak);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reply() {
        assert_eq!(parse_reply("y"), Reply::Approve(1));
        assert_eq!(parse_reply(" Y \n"), Reply::Approve(1));
        assert_eq!(parse_reply("y -5"), Reply::Approve(5));
        assert_eq!(parse_reply("y -0"), Reply::Invalid);
        assert_eq!(parse_reply("y -many"), Reply::Invalid);
        assert_eq!(parse_reply("n"), Reply::Deny);
        assert_eq!(parse_reply(""), Reply::Invalid);
        assert_eq!(
            parse_reply("save the notes first"),
            Reply::Feedback("save the notes first".to_string())
        );
    }

    #[test]
    fn test_describe_outcome() {
        assert_eq!(
            describe_outcome(&LoopOutcome::Completed {
                reason: "done".to_string(),
                cycles: 3
            }),
            "◆ Task complete after 3 cycles: done"
        );
        assert_eq!(
            describe_outcome(&LoopOutcome::CycleLimit { cycles: 10 }),
            "◆ Cycle limit of 10 reached"
        );
    }
}
