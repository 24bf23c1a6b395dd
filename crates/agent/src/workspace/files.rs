//! Workspace-backed implementation of the file commands

use async_trait::async_trait;
use regex::Regex;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::debug;
use walkdir::WalkDir;

use super::oplog::OperationLog;
use super::path_utils::{validate_workspace_path, PathGuard};
use super::summary::summarize_directory;
use super::{format_filename, FileOps, Result, WorkspaceError};

/// File commands over one workspace root, with the operation log alongside
#[derive(Debug, Clone)]
pub struct WorkspaceFiles {
    guard: PathGuard,
    log: OperationLog,
}

impl WorkspaceFiles {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let guard = PathGuard::new(root);
        let log = OperationLog::new(guard.root());
        Self { guard, log }
    }

    pub fn root(&self) -> &Path {
        self.guard.root()
    }

    pub fn guard(&self) -> &PathGuard {
        &self.guard
    }

    fn file_error(&self, operation: &str, file: &str, err: std::io::Error) -> WorkspaceError {
        WorkspaceError::Operation {
            operation: operation.to_string(),
            file: file.to_string(),
            tree: filesystem_representation(self.root()),
            reason: err.to_string(),
        }
    }

    fn current_files(&self) -> String {
        format!(
            "Your current files are now: {:?}",
            collect_resources(self.root())
        )
    }

    /// Another file with the same name somewhere else in the workspace
    fn find_elsewhere(&self, target: &Path) -> Option<PathBuf> {
        let name = target.file_name()?;
        WalkDir::new(self.root())
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file() && e.file_name() == name)
            .map(|e| e.into_path())
            .find(|p| p != target)
    }

    /// Files matched by a resolved path whose final component may hold wildcards
    async fn matching_files(&self, pattern: &Path) -> Result<Vec<PathBuf>> {
        let name = match pattern.file_name() {
            Some(name) => name.to_string_lossy().to_string(),
            None => return Ok(Vec::new()),
        };

        if !has_wildcard(&name) {
            return Ok(if pattern.is_file() {
                vec![pattern.to_path_buf()]
            } else {
                Vec::new()
            });
        }

        let dir = match pattern.parent() {
            Some(dir) if dir.is_dir() => dir,
            _ => return Ok(Vec::new()),
        };
        let matcher = wildcard_regex(&name);
        let mut matches = Vec::new();
        let mut entries = tokio::fs::read_dir(dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let entry_name = entry.file_name().to_string_lossy().to_string();
            let path = entry.path();
            if self.log.is_log_file(&path) {
                continue;
            }
            if entry.file_type().await?.is_file() && matcher.is_match(&entry_name) {
                validate_workspace_path(&path.to_string_lossy(), self.root()).await?;
                matches.push(path);
            }
        }
        matches.sort();
        Ok(matches)
    }

    async fn resolve_sources(&self, file: &str) -> Result<Vec<PathBuf>> {
        let pattern = self.guard.resolve(&format_filename(file)).await?;
        let matches = self.matching_files(&pattern).await?;
        if matches.is_empty() {
            return Err(WorkspaceError::NotFound(file.to_string()));
        }
        Ok(matches)
    }

    /// Copy or move every source into `destination`, logging each transfer
    async fn transfer(
        &self,
        operation: &str,
        sources: &[String],
        destination: &str,
    ) -> Result<Vec<String>> {
        let dest_dir = self.guard.resolve(destination).await?;
        tokio::fs::create_dir_all(&dest_dir).await?;

        let mut transferred = Vec::new();
        for source in sources {
            for path in self.resolve_sources(source).await? {
                let name = basename(&path);
                let dest = dest_dir.join(&name);
                if operation == "copy" {
                    tokio::fs::copy(&path, &dest).await?;
                } else {
                    tokio::fs::rename(&path, &dest).await?;
                }
                self.log
                    .record(
                        operation,
                        &self.guard.relative(&path),
                        Some(&self.guard.relative(&dest)),
                    )
                    .await?;
                transferred.push(name);
            }
        }
        Ok(transferred)
    }
}

#[async_trait]
impl FileOps for WorkspaceFiles {
    async fn read(&self, file: &str) -> Result<String> {
        let path = self.guard.resolve(&format_filename(file)).await?;
        debug!("◆ Reading {:?}", path);

        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| self.file_error("read", file, e))?;
        if bytes.starts_with(b"%PDF-") {
            return Err(WorkspaceError::Unsupported(
                "PDF text extraction is not supported.".to_string(),
            ));
        }
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    async fn write(&self, file: &str, text: &str) -> Result<String> {
        let path = self.guard.resolve(&format_filename(file)).await?;
        let relative = self.guard.relative(&path);
        if self.log.contains("write", &relative).await {
            return Err(WorkspaceError::Duplicate("updated"));
        }
        if let Some(existing) = self.find_elsewhere(&path) {
            return Ok(format!(
                "A file with that name already exists in a different location: {}. Use append_to_file instead.",
                self.guard.relative(&existing)
            ));
        }

        debug!("◆ Writing {:?}", path);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, text)
            .await
            .map_err(|e| self.file_error("write", file, e))?;
        self.log.record("write", &relative, None).await?;

        Ok(format!(
            "File {} written to successfully. {}",
            file,
            self.current_files()
        ))
    }

    async fn append(&self, file: &str, text: &str) -> Result<String> {
        let path = self.guard.resolve(&format_filename(file)).await?;
        if let Some(existing) = self.find_elsewhere(&path) {
            return Ok(format!(
                "A file with that name already exists in a different location: {}",
                self.guard.relative(&existing)
            ));
        }

        debug!("◆ Appending to {:?}", path);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut handle = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| self.file_error("append", file, e))?;
        handle
            .write_all(text.as_bytes())
            .await
            .map_err(|e| self.file_error("append", file, e))?;
        handle.flush().await?;

        if !self.log.is_log_file(&path) {
            self.log
                .record("append", &self.guard.relative(&path), None)
                .await?;
        }

        Ok(format!(
            "Text appended to {} successfully. {}",
            file,
            self.current_files()
        ))
    }

    async fn delete(&self, files: &[String]) -> Result<String> {
        let mut deleted = Vec::new();
        for file in files {
            let pattern = self.guard.resolve(&format_filename(file)).await?;
            if self
                .log
                .contains("delete", &self.guard.relative(&pattern))
                .await
            {
                return Err(WorkspaceError::Duplicate("deleted"));
            }
            let matches = self.matching_files(&pattern).await?;
            if matches.is_empty() {
                return Err(WorkspaceError::NotFound(file.clone()));
            }
            for path in matches {
                debug!("◆ Deleting {:?}", path);
                tokio::fs::remove_file(&path).await?;
                self.log
                    .record("delete", &self.guard.relative(&path), None)
                    .await?;
                deleted.push(basename(&path));
            }
        }
        Ok(format!(
            "Files {:?} deleted successfully. {}",
            deleted,
            self.current_files()
        ))
    }

    async fn copy(&self, sources: &[String], destination: &str) -> Result<String> {
        let copied = self.transfer("copy", sources, destination).await?;
        Ok(format!(
            "Files {:?} copied successfully. {}",
            copied,
            self.current_files()
        ))
    }

    async fn move_files(&self, sources: &[String], destination: &str) -> Result<String> {
        let moved = self.transfer("move", sources, destination).await?;
        Ok(format!(
            "Files {:?} moved successfully. {}",
            moved,
            self.current_files()
        ))
    }

    async fn rename(&self, source: &str, destination: &str) -> Result<String> {
        let from = self.resolve_sources(source).await?.remove(0);
        let to = self.guard.resolve(&format_filename(destination)).await?;
        if let Some(parent) = to.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::rename(&from, &to).await?;
        self.log
            .record(
                "rename",
                &self.guard.relative(&from),
                Some(&self.guard.relative(&to)),
            )
            .await?;

        Ok(format!(
            "File {} renamed to {} successfully. {}",
            source,
            destination,
            self.current_files()
        ))
    }

    async fn search(&self, directory: &str, phrase: Option<&str>) -> Result<Vec<String>> {
        let dir = self.guard.resolve(directory).await?;
        if !dir.is_dir() {
            return Err(WorkspaceError::NoSuchDirectory);
        }
        let phrase = phrase
            .map(|p| p.trim().to_lowercase())
            .filter(|p| !p.is_empty());

        let mut found = Vec::new();
        for entry in WalkDir::new(&dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            if entry.file_name().to_string_lossy().starts_with('.') {
                continue;
            }
            if let Some(phrase) = &phrase {
                let content = tokio::fs::read(entry.path()).await.unwrap_or_default();
                if !String::from_utf8_lossy(&content)
                    .to_lowercase()
                    .contains(phrase.as_str())
                {
                    continue;
                }
            }
            found.push(self.guard.relative(entry.path()));
        }
        found.sort();
        Ok(found)
    }

    async fn create_directory(&self, directory: &str) -> Result<String> {
        let path = self.guard.resolve(directory).await?;
        tokio::fs::create_dir_all(&path).await?;
        self.log
            .record("mkdir", &self.guard.relative(&path), None)
            .await?;
        Ok(format!(
            "Directory '{}' created successfully. {}",
            directory,
            self.current_files()
        ))
    }

    async fn list_resources(&self) -> Result<Vec<String>> {
        Ok(collect_resources(self.root()))
    }

    async fn summarize_resources(&self) -> Result<String> {
        let summary = summarize_directory(self.root());
        Ok(format!(
            "Summary of contents:\n{}\n\nResource file map:\n{:?}",
            summary.render(),
            collect_resources(self.root())
        ))
    }

    async fn filesystem_tree(&self) -> Result<String> {
        Ok(filesystem_representation(self.root()))
    }
}

fn basename(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

fn has_wildcard(name: &str) -> bool {
    name.contains('*') || name.contains('?')
}

/// `*` matches any run of characters, `?` exactly one
fn wildcard_regex(pattern: &str) -> Regex {
    let mut re = String::from("^");
    for ch in pattern.chars() {
        match ch {
            '*' => re.push_str(".*"),
            '?' => re.push('.'),
            other => re.push_str(&regex::escape(&other.to_string())),
        }
    }
    re.push('$');
    Regex::new(&re).expect("escaped wildcard pattern is a valid regex")
}

fn sorted_entries(dir: &Path) -> Vec<std::fs::DirEntry> {
    let mut entries: Vec<_> = match std::fs::read_dir(dir) {
        Ok(rd) => rd.filter_map(|e| e.ok()).collect(),
        Err(_) => return Vec::new(),
    };
    entries.sort_by_key(|e| e.file_name());
    entries
}

/// `Folder: x` / `File: y` entries, depth first, hidden entries skipped
fn collect_resources(dir: &Path) -> Vec<String> {
    let mut resources = Vec::new();
    for entry in sorted_entries(dir) {
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with('.') {
            continue;
        }
        let path = entry.path();
        if path.is_dir() {
            resources.push(format!("Folder: {}", name));
            resources.extend(collect_resources(&path));
        } else if path.is_file() {
            resources.push(format!("File: {}", name));
        }
    }
    resources
}

/// One-line tree: `file: a.txt, dir: docs {file: b.md}`
pub fn filesystem_representation(dir: &Path) -> String {
    sorted_entries(dir)
        .into_iter()
        .filter_map(|entry| {
            let name = entry.file_name().to_string_lossy().replace(' ', "_");
            let path = entry.path();
            if path.is_file() {
                Some(format!("file: {}", name))
            } else if path.is_dir() {
                Some(format!("dir: {} {{{}}}", name, filesystem_representation(&path)))
            } else {
                None
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wildcard_regex() {
        let re = wildcard_regex("*.txt");
        assert!(re.is_match("notes.txt"));
        assert!(!re.is_match("notes.md"));
        let re = wildcard_regex("draft?.md");
        assert!(re.is_match("draft1.md"));
        assert!(!re.is_match("draft12.md"));
        assert!(wildcard_regex("a+b(1).txt").is_match("a+b(1).txt"));
    }

    #[test]
    fn test_filesystem_representation() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.txt"), "").unwrap();
        std::fs::create_dir(dir.path().join("my docs")).unwrap();
        std::fs::write(dir.path().join("my docs/b.md"), "").unwrap();
        std::fs::create_dir(dir.path().join("empty")).unwrap();

        assert_eq!(
            filesystem_representation(dir.path()),
            "file: a.txt, dir: empty {}, dir: my_docs {file: b.md}"
        );
    }

    #[test]
    fn test_collect_resources_skips_hidden() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join(".secret"), "").unwrap();
        std::fs::create_dir(dir.path().join("docs")).unwrap();
        std::fs::write(dir.path().join("docs/b.md"), "").unwrap();
        std::fs::write(dir.path().join("z.txt"), "").unwrap();

        assert_eq!(
            collect_resources(dir.path()),
            vec!["Folder: docs", "File: b.md", "File: z.txt"]
        );
    }
}
