//! Append-only record of file operations kept inside the workspace

use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::trace;

pub const LOG_FILE: &str = "file_logger.txt";

const LOG_HEADER: &str = "File Operation Logger ";

/// `file_logger.txt` in the workspace root.
///
/// Entries are `"{operation}: {target}\n"` or `"{operation}: {target} to {dest}\n"`.
#[derive(Debug, Clone)]
pub struct OperationLog {
    path: PathBuf,
}

impl OperationLog {
    pub fn new(workspace_root: &Path) -> Self {
        Self {
            path: workspace_root.join(LOG_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether `path` is the log file itself; writes to it are never logged
    pub fn is_log_file(&self, path: &Path) -> bool {
        path == self.path
    }

    /// Whether this exact operation on this target was recorded before
    pub async fn contains(&self, operation: &str, target: &str) -> bool {
        let entry = format!("{}: {}\n", operation, target);
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content.contains(&entry),
            Err(_) => false,
        }
    }

    pub async fn record(
        &self,
        operation: &str,
        target: &str,
        destination: Option<&str>,
    ) -> std::io::Result<()> {
        let entry = match destination {
            Some(dest) => format!("{}: {} to {}\n", operation, target, dest),
            None => format!("{}: {}\n", operation, target),
        };
        trace!("◆ oplog {}", entry.trim_end());

        let fresh = !self.path.exists();
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        if fresh {
            file.write_all(LOG_HEADER.as_bytes()).await?;
        }
        file.write_all(entry.as_bytes()).await?;
        file.flush().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_record_then_contains() {
        let dir = TempDir::new().unwrap();
        let log = OperationLog::new(dir.path());

        assert!(!log.contains("write", "a.txt").await);
        log.record("write", "a.txt", None).await.unwrap();
        assert!(log.contains("write", "a.txt").await);
        assert!(!log.contains("delete", "a.txt").await);
    }

    #[tokio::test]
    async fn test_header_written_once() {
        let dir = TempDir::new().unwrap();
        let log = OperationLog::new(dir.path());
        log.record("mkdir", "docs", None).await.unwrap();
        log.record("copy", "a.txt", Some("docs/a.txt")).await.unwrap();

        let content = std::fs::read_to_string(log.path()).unwrap();
        assert_eq!(content.matches(LOG_HEADER).count(), 1);
        assert!(content.contains("copy: a.txt to docs/a.txt\n"));
    }

    #[test]
    fn test_is_log_file() {
        let log = OperationLog::new(Path::new("/ws"));
        assert!(log.is_log_file(Path::new("/ws/file_logger.txt")));
        assert!(!log.is_log_file(Path::new("/ws/other.txt")));
    }
}
