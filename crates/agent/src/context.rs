//! System prompt assembly

use autopilot_config::AiSettings;
use autopilot_provider::Message;
use chrono::Local;
use serde_json::json;

use crate::registry::CommandRegistry;

/// Builds the standing instructions sent at the top of every turn
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    constraints: Vec<String>,
    resources: Vec<String>,
    performance_evaluations: Vec<String>,
}

impl PromptBuilder {
    const CONSTRAINTS: &'static [&'static str] = &[
        "~4000 word limit for short term memory. Your short term memory is short, so immediately save important information to files.",
        "If you are unsure how you previously did something or want to recall past events, thinking about similar events will help you remember.",
        "No user assistance",
        "Exclusively use a valid command listed in double quotes e.g. \"command name\"",
        "All content should be written in .md files using Markdown formatting unless a .csv file is warranted or you are creating a directory.",
        "All responses must be in JSON and only JSON.",
        "Do not create new files with the same content as existing files.",
    ];

    const RESOURCES: &'static [&'static str] = &[
        "Internet access for searches and information gathering.",
        "Long Term memory management.",
        "GPT-3.5 powered Agents for delegation of simple tasks.",
        "File output.",
    ];

    const PERFORMANCE_EVALUATIONS: &'static [&'static str] = &[
        "Continuously review and analyze your actions to ensure you are performing to the best of your abilities and producing quality research output.",
        "Constructively evaluate the file system and implement strategies that allow information to coalesce into folders.",
        "Constructively self-criticize your big-picture behavior from time to time.",
        "Reflect on past decisions, strategies, and output to refine your approach.",
        "Every command has a cost, so be smart and efficient. Aim to complete tasks in the least number of steps.",
    ];

    pub fn new() -> Self {
        let owned = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
        Self {
            constraints: owned(Self::CONSTRAINTS),
            resources: owned(Self::RESOURCES),
            performance_evaluations: owned(Self::PERFORMANCE_EVALUATIONS),
        }
    }

    pub fn add_constraint(&mut self, constraint: impl Into<String>) {
        self.constraints.push(constraint.into());
    }

    pub fn add_resource(&mut self, resource: impl Into<String>) {
        self.resources.push(resource.into());
    }

    pub fn add_performance_evaluation(&mut self, evaluation: impl Into<String>) {
        self.performance_evaluations.push(evaluation.into());
    }

    /// Shape the model must answer in
    pub fn response_format() -> String {
        let format = json!({
            "thoughts": {
                "text": "thought",
                "reasoning": "reasoning",
                "plan": "- short bulleted\n- list that conveys\n- long-term plan",
                "criticism": "constructive self-criticism",
                "speak": "thoughts summary to say to user"
            },
            "command": {
                "name": "command name",
                "args": {"arg name": "value"}
            }
        });
        serde_json::to_string_pretty(&format).unwrap_or_default()
    }

    /// Constraints, numbered commands, resources, evaluations and the response format
    pub fn build(&self, registry: &CommandRegistry) -> String {
        let commands: Vec<String> = registry
            .all_commands()
            .iter()
            .map(|c| c.prompt_line())
            .collect();

        format!(
            "Constraints:\n{}\n\nCommands:\n{}\n\nResources:\n{}\n\nPerformance Evaluation:\n{}\n\nYou should only respond in JSON format as described below \nResponse Format: \n{} \nEnsure the response can be parsed by a strict JSON parser",
            numbered(&self.constraints),
            numbered(&commands),
            numbered(&self.resources),
            numbered(&self.performance_evaluations),
            Self::response_format()
        )
    }

    /// Persona header followed by the command prompt
    pub fn full_prompt(&self, settings: &AiSettings, registry: &CommandRegistry) -> String {
        format!("{}\n\n{}", settings.prompt_header(), self.build(registry))
    }

    /// Wall-clock note sent with each turn
    pub fn time_message() -> Message {
        Message::system(format!(
            "The current time and date is {}",
            Local::now().format("%a %b %e %H:%M:%S %Y")
        ))
    }
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn numbered(items: &[String]) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{}. {}", i + 1, item))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sections_in_order() {
        let prompt = PromptBuilder::new().build(&CommandRegistry::new(false));
        let constraints = prompt.find("Constraints:\n1. ~4000 word limit").unwrap();
        let commands = prompt.find("\n\nCommands:\n1. Google Search: \"google\", args: \"input\": \"<search>\"").unwrap();
        let resources = prompt.find("\n\nResources:\n1. Internet access").unwrap();
        let evaluation = prompt.find("\n\nPerformance Evaluation:\n1. Continuously review").unwrap();
        assert!(constraints < commands && commands < resources && resources < evaluation);
        assert!(prompt.ends_with("Ensure the response can be parsed by a strict JSON parser"));
    }

    #[test]
    fn test_shell_listed_only_when_enabled() {
        let without = PromptBuilder::new().build(&CommandRegistry::new(false));
        assert!(!without.contains("execute_shell"));
        assert!(without.contains("29. Task Complete (Shutdown): \"task_complete\""));

        let with = PromptBuilder::new().build(&CommandRegistry::new(true));
        assert!(with.contains("29. Execute Shell Command, non-interactive commands only: \"execute_shell\""));
        assert!(with.contains("30. Task Complete (Shutdown)"));
    }

    #[test]
    fn test_response_format_is_valid_json() {
        let format: serde_json::Value = serde_json::from_str(&PromptBuilder::response_format()).unwrap();
        assert_eq!(format["command"]["name"], "command name");
    }

    #[test]
    fn test_full_prompt_has_persona() {
        let settings = AiSettings::new("ResearchGPT", "a research assistant", vec!["Summarize Rust news".to_string()]);
        let prompt = PromptBuilder::new().full_prompt(&settings, &CommandRegistry::default());
        assert!(prompt.starts_with("You are ResearchGPT, a research assistant"));
        assert!(prompt.contains("1. Summarize Rust news"));
        assert!(prompt.contains("Constraints:"));
    }

    #[test]
    fn test_extra_constraint_numbered() {
        let mut builder = PromptBuilder::new();
        builder.add_constraint("Never spend money.");
        assert!(builder
            .build(&CommandRegistry::default())
            .contains("8. Never spend money."));
    }
}
