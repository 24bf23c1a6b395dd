//! Path validation utilities for workspace-safe operations

use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Error type for path validation failures
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Path {path} is outside workspace {workspace}")]
pub struct PathValidationError {
    pub path: String,
    pub workspace: String,
}

/// Confines every file-oriented command to one workspace root
#[derive(Debug, Clone)]
pub struct PathGuard {
    root: PathBuf,
}

impl PathGuard {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let root = std::fs::canonicalize(&root).unwrap_or_else(|_| normalize(&root));
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a command-supplied path to an absolute path inside the root.
    ///
    /// Empty and `/` mean the root itself.
    pub async fn resolve(&self, path: &str) -> Result<PathBuf, PathValidationError> {
        if path.is_empty() || path == "/" {
            return Ok(self.root.clone());
        }
        validate_workspace_path(path, &self.root).await
    }

    /// Path relative to the root, for messages and the operation log
    pub fn relative(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .to_string_lossy()
            .to_string()
    }
}

/// Validates that a path is within the workspace.
///
/// Steps:
/// 1. Expand `~/` to the home directory, or join relative paths to the workspace
/// 2. Collapse `.` and `..` lexically
/// 3. Canonicalize the longest existing ancestor so symlinks cannot escape
/// 4. Ensure the result starts with the canonical workspace root
pub async fn validate_workspace_path(
    path: &str,
    workspace_root: &Path,
) -> Result<PathBuf, PathValidationError> {
    let expanded = if path.starts_with('~') {
        expand_tilde(path)
    } else if Path::new(path).is_absolute() {
        PathBuf::from(path)
    } else {
        workspace_root.join(path)
    };

    let absolute = resolve_existing_prefix(&normalize(&expanded)).await;

    let canonical_workspace = if workspace_root.exists() {
        tokio::fs::canonicalize(workspace_root)
            .await
            .unwrap_or_else(|_| workspace_root.to_path_buf())
    } else {
        normalize(workspace_root)
    };

    if !is_path_within_workspace(&absolute, &canonical_workspace) {
        return Err(PathValidationError {
            path: path.to_string(),
            workspace: canonical_workspace.display().to_string(),
        });
    }

    Ok(absolute)
}

/// Canonicalize the deepest ancestor that exists and re-append the rest
async fn resolve_existing_prefix(path: &Path) -> PathBuf {
    let mut existing = path.to_path_buf();
    let mut rest = Vec::new();

    while !existing.exists() {
        match (existing.file_name(), existing.parent()) {
            (Some(name), Some(parent)) => {
                rest.push(name.to_os_string());
                existing = parent.to_path_buf();
            }
            _ => return path.to_path_buf(),
        }
    }

    let mut resolved = tokio::fs::canonicalize(&existing)
        .await
        .unwrap_or(existing);
    for name in rest.into_iter().rev() {
        resolved.push(name);
    }
    resolved
}

/// Lexical normalization; `..` above the filesystem root is dropped
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Check if a path is within the workspace
fn is_path_within_workspace(path: &Path, workspace: &Path) -> bool {
    let path_components: Vec<_> = path.components().collect();
    let workspace_components: Vec<_> = workspace.components().collect();

    if path_components.len() < workspace_components.len() {
        return false;
    }

    workspace_components
        .iter()
        .enumerate()
        .all(|(i, comp)| path_components.get(i) == Some(comp))
}

/// Expand tilde (~) to home directory
fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}
