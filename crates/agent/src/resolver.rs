//! Turns one raw model reply into a `ParsedCommand`

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::commands::Arguments;
use crate::json_repair::{JsonRepair, LenientJsonRepair};
use crate::registry::map_command_synonyms;

/// A command name plus its unvalidated arguments
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedCommand {
    pub name: String,
    pub arguments: Arguments,
}

impl ParsedCommand {
    pub fn new(name: impl Into<String>, arguments: Arguments) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolveError {
    #[error("Invalid JSON: {0}")]
    MalformedResponse(String),

    #[error("Missing 'command' object in JSON")]
    MissingCommandField,

    #[error("'command' object is not a dictionary")]
    InvalidCommandShape,

    #[error("Missing 'name' field in 'command' object")]
    MissingNameField,
}

/// The model's self-reported reasoning, for the operator only
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Thoughts {
    pub text: Option<String>,
    pub reasoning: Option<String>,
    pub plan: Option<String>,
    pub criticism: Option<String>,
    pub speak: Option<String>,
}

pub struct CommandResolver {
    repair: Box<dyn JsonRepair>,
}

impl CommandResolver {
    pub fn new(repair: Box<dyn JsonRepair>) -> Self {
        Self { repair }
    }

    /// Repair a raw reply into JSON
    pub fn parse(&self, raw: &str) -> Result<Value, ResolveError> {
        self.repair
            .repair(raw)
            .map_err(|e| ResolveError::MalformedResponse(e.0))
    }

    pub fn resolve(&self, raw: &str) -> Result<ParsedCommand, ResolveError> {
        let value = self.parse(raw)?;
        self.resolve_value(&value)
    }

    /// Extract and correct the command from an already-parsed reply
    pub fn resolve_value(&self, value: &Value) -> Result<ParsedCommand, ResolveError> {
        let root = value.as_object().ok_or(ResolveError::MissingCommandField)?;
        let command = root
            .get("command")
            .ok_or(ResolveError::MissingCommandField)?
            .as_object()
            .ok_or(ResolveError::InvalidCommandShape)?;
        let name = command
            .get("name")
            .and_then(Value::as_str)
            .ok_or(ResolveError::MissingNameField)?;

        let arguments = command
            .get("args")
            .cloned()
            .map(Arguments::from_value)
            .unwrap_or_default();

        let corrected = map_command_synonyms(name);
        if corrected != name {
            debug!("◆ Mapped command '{}' to '{}'", name, corrected);
        }
        Ok(ParsedCommand::new(corrected, arguments))
    }
}

impl Default for CommandResolver {
    fn default() -> Self {
        Self::new(Box::new(LenientJsonRepair))
    }
}

/// Pull the optional `thoughts` object out of a reply. A list-valued plan is
/// joined into bullet lines.
pub fn thoughts(value: &Value) -> Option<Thoughts> {
    let obj = value.get("thoughts")?.as_object()?;
    let field = |key: &str| match obj.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Array(items) => Some(
            items
                .iter()
                .map(|item| match item {
                    Value::String(s) => format!("- {}", s),
                    other => format!("- {}", other),
                })
                .collect::<Vec<_>>()
                .join("\n"),
        ),
        _ => None,
    };
    Some(Thoughts {
        text: field("text"),
        reasoning: field("reasoning"),
        plan: field("plan"),
        criticism: field("criticism"),
        speak: field("speak"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::json_repair::RepairError;
    use serde_json::json;

    fn resolve(raw: &str) -> Result<ParsedCommand, ResolveError> {
        CommandResolver::default().resolve(raw)
    }

    #[test]
    fn test_resolves_name_and_args() {
        let parsed = resolve(r#"{"command": {"name": "read_file", "args": {"file": "a.txt"}}}"#).unwrap();
        assert_eq!(parsed.name, "read_file");
        assert_eq!(parsed.arguments.require_str("file").unwrap(), "a.txt");
    }

    #[test]
    fn test_args_default_to_empty() {
        let parsed = resolve(r#"{"command": {"name": "list_agents"}}"#).unwrap();
        assert!(parsed.arguments.is_empty());

        let parsed = resolve(r#"{"command": {"name": "list_agents", "args": "nothing"}}"#).unwrap();
        assert!(parsed.arguments.is_empty());
    }

    #[test]
    fn test_synonym_applied() {
        let parsed = resolve(r#"{"command": {"name": "create_file", "args": {"file": "x", "text": "y"}}}"#).unwrap();
        assert_eq!(parsed.name, "write_to_file");
        let parsed = resolve(r#"{"command": {"name": "search", "args": {"input": "rust"}}}"#).unwrap();
        assert_eq!(parsed.name, "google");
    }

    #[test]
    fn test_shape_errors() {
        assert_eq!(resolve(r#"{"thoughts": {}}"#), Err(ResolveError::MissingCommandField));
        assert_eq!(resolve("[1, 2, 3]"), Err(ResolveError::MissingCommandField));
        assert_eq!(resolve(r#"{"command": "read_file"}"#), Err(ResolveError::InvalidCommandShape));
        assert_eq!(resolve(r#"{"command": {"args": {}}}"#), Err(ResolveError::MissingNameField));
        assert_eq!(resolve(r#"{"command": {"name": 7}}"#), Err(ResolveError::MissingNameField));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ResolveError::MissingCommandField.to_string(),
            "Missing 'command' object in JSON"
        );
        assert_eq!(
            ResolveError::MissingNameField.to_string(),
            "Missing 'name' field in 'command' object"
        );
        assert_eq!(
            ResolveError::InvalidCommandShape.to_string(),
            "'command' object is not a dictionary"
        );
    }

    struct Refuse;

    impl JsonRepair for Refuse {
        fn repair(&self, _raw: &str) -> Result<Value, RepairError> {
            Err(RepairError("expected value at line 1 column 1".to_string()))
        }
    }

    #[test]
    fn test_malformed_carries_repair_message() {
        let resolver = CommandResolver::new(Box::new(Refuse));
        let err = resolver.resolve("whatever").unwrap_err();
        assert_eq!(
            err,
            ResolveError::MalformedResponse("expected value at line 1 column 1".to_string())
        );
        assert_eq!(err.to_string(), "Invalid JSON: expected value at line 1 column 1");
    }

    #[test]
    fn test_thoughts() {
        let value = json!({
            "thoughts": {
                "text": "look around",
                "plan": ["list files", "read notes"],
                "criticism": "",
                "speak": "Checking files"
            },
            "command": {"name": "list_resources"}
        });
        let t = thoughts(&value).unwrap();
        assert_eq!(t.text.as_deref(), Some("look around"));
        assert_eq!(t.plan.as_deref(), Some("- list files\n- read notes"));
        assert!(t.criticism.is_none());
        assert!(t.reasoning.is_none());
        assert!(thoughts(&json!({"command": {}})).is_none());
    }
}
