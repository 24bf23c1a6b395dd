//! Path utilities

use std::path::{Path, PathBuf};

/// Data directory (~/.autopilot)
pub fn data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".autopilot")
}

/// Config file location
pub fn config_path() -> PathBuf {
    data_dir().join("config.json")
}

/// Default workspace location
pub fn workspace_path() -> PathBuf {
    data_dir().join("workspace")
}

/// Default AI settings location
pub fn ai_settings_path() -> PathBuf {
    data_dir().join("ai_settings.json")
}

/// Expand a leading `~` to the home directory
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    } else if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

/// Ensure directory exists
pub async fn ensure_dir(path: &Path) -> std::io::Result<()> {
    tokio::fs::create_dir_all(path).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_home() {
        let home = dirs::home_dir().expect("home dir");
        assert_eq!(expand_home("~/ws"), home.join("ws"));
        assert_eq!(expand_home("~"), home);
        assert_eq!(expand_home("/abs/ws"), PathBuf::from("/abs/ws"));
        assert_eq!(expand_home("rel/ws"), PathBuf::from("rel/ws"));
    }

    #[test]
    fn test_paths_under_data_dir() {
        assert!(config_path().starts_with(data_dir()));
        assert!(workspace_path().starts_with(data_dir()));
        assert!(ai_settings_path().ends_with("ai_settings.json"));
    }
}
