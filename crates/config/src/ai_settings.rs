//! AI persona: name, role and goals fed into the system prompt

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::Result;

/// The agent's identity and objectives
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiSettings {
    #[serde(default = "default_name")]
    pub ai_name: String,
    #[serde(default = "default_role")]
    pub ai_role: String,
    #[serde(default)]
    pub ai_goals: Vec<String>,
}

fn default_name() -> String {
    "Autopilot".to_string()
}

fn default_role() -> String {
    "an AI designed to autonomously develop and run businesses with the sole goal of increasing your net worth.".to_string()
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            ai_name: default_name(),
            ai_role: default_role(),
            ai_goals: vec![
                "Increase net worth".to_string(),
                "Develop and manage multiple businesses autonomously".to_string(),
            ],
        }
    }
}

impl AiSettings {
    pub fn new(name: impl Into<String>, role: impl Into<String>, goals: Vec<String>) -> Self {
        Self {
            ai_name: name.into(),
            ai_role: role.into(),
            ai_goals: goals,
        }
    }

    /// Load settings, falling back to defaults when the file is absent
    pub async fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("◆ No AI settings at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        let content = tokio::fs::read_to_string(path).await?;
        Ok(serde_json::from_str(&content)?)
    }

    pub async fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, serde_json::to_string_pretty(self)?).await?;
        Ok(())
    }

    /// Identity and numbered goals, placed ahead of the command prompt
    pub fn prompt_header(&self) -> String {
        let mut header = format!(
            "You are {}, {}\nYour decisions must always be made independently without seeking user assistance. Play to your strengths as an LLM and pursue simple strategies with no legal complications.\n\nGOALS:\n\n",
            self.ai_name, self.ai_role
        );
        for (i, goal) in self.ai_goals.iter().enumerate() {
            header.push_str(&format!("{}. {}\n", i + 1, goal));
        }
        header
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_prompt_header_numbers_goals() {
        let settings = AiSettings::new(
            "Researcher",
            "an AI that studies things.",
            vec!["Find papers".to_string(), "Summarize them".to_string()],
        );
        let header = settings.prompt_header();
        assert!(header.starts_with("You are Researcher, an AI that studies things."));
        assert!(header.contains("1. Find papers\n"));
        assert!(header.contains("2. Summarize them\n"));
    }

    #[tokio::test]
    async fn test_load_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let settings = AiSettings::load_from(&dir.path().join("none.json"))
            .await
            .unwrap();
        assert_eq!(settings, AiSettings::default());
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("ai.json");
        let settings = AiSettings::new("A", "b", vec!["c".to_string()]);
        settings.save_to(&path).await.unwrap();
        assert_eq!(AiSettings::load_from(&path).await.unwrap(), settings);
    }
}
