//! Workspace file operations
//!
//! Every path a command names is normalised and confined to the workspace
//! root before it touches the filesystem.

pub mod files;
pub mod oplog;
pub mod path_utils;
pub mod summary;

pub use files::WorkspaceFiles;
pub use oplog::OperationLog;
pub use path_utils::{PathGuard, PathValidationError};

use async_trait::async_trait;
use thiserror::Error;

/// File operation failures, rendered into the command reply
#[derive(Error, Debug)]
pub enum WorkspaceError {
    #[error(transparent)]
    Path(#[from] PathValidationError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// Failure that includes the current tree so the model can re-orient
    #[error("trying to {operation} {file} - File likely doesn't exist. Current filesystem:\n{tree}\nError: {reason}")]
    Operation {
        operation: String,
        file: String,
        tree: String,
        reason: String,
    },

    #[error("File has already been {0}.")]
    Duplicate(&'static str),

    #[error("File {0} not found.")]
    NotFound(String),

    #[error("directory does not exist")]
    NoSuchDirectory,

    #[error("Invalid file type. {0}")]
    Unsupported(String),
}

pub type Result<T> = std::result::Result<T, WorkspaceError>;

/// Filesystem command bodies
#[async_trait]
pub trait FileOps: Send + Sync {
    async fn read(&self, file: &str) -> Result<String>;
    async fn write(&self, file: &str, text: &str) -> Result<String>;
    async fn append(&self, file: &str, text: &str) -> Result<String>;
    /// Sources may contain `*` and `?` in their final component
    async fn delete(&self, files: &[String]) -> Result<String>;
    async fn copy(&self, sources: &[String], destination: &str) -> Result<String>;
    async fn move_files(&self, sources: &[String], destination: &str) -> Result<String>;
    async fn rename(&self, source: &str, destination: &str) -> Result<String>;
    /// Workspace-relative paths under `directory`, optionally only files containing `phrase`
    async fn search(&self, directory: &str, phrase: Option<&str>) -> Result<Vec<String>>;
    async fn create_directory(&self, directory: &str) -> Result<String>;
    async fn list_resources(&self) -> Result<Vec<String>>;
    async fn summarize_resources(&self) -> Result<String>;
    async fn filesystem_tree(&self) -> Result<String>;
}

/// Lowercase the final path component and replace its spaces with underscores
pub fn format_filename(filename: &str) -> String {
    match filename.rsplit_once('/') {
        Some((dir, name)) => format!("{}/{}", dir, name.replace(' ', "_").to_lowercase()),
        None => filename.replace(' ', "_").to_lowercase(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_filename() {
        assert_eq!(format_filename("My Notes.TXT"), "my_notes.txt");
        assert_eq!(format_filename("Research Dir/Final Draft.md"), "Research Dir/final_draft.md");
        assert_eq!(format_filename("plain.txt"), "plain.txt");
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            WorkspaceError::Duplicate("updated").to_string(),
            "File has already been updated."
        );
        assert_eq!(
            WorkspaceError::NotFound("x.txt".to_string()).to_string(),
            "File x.txt not found."
        );
        let err = WorkspaceError::Operation {
            operation: "read".to_string(),
            file: "gone.txt".to_string(),
            tree: "file: a.txt".to_string(),
            reason: "No such file or directory".to_string(),
        };
        assert!(err.to_string().starts_with("trying to read gone.txt"));
        assert!(err.to_string().contains("Current filesystem:\nfile: a.txt\n"));
    }
}
