//! # contract: interfaces between the pipeline stages
//!
//! This module defines the two seams of the publish pipeline and the plain
//! data types they exchange:
//!
//! - [`DocBuilder`] produces the static documentation tree (real
//!   implementation: a subprocess around the configured generator).
//! - [`BranchVcs`] performs every operation against the publishing branch
//!   (real implementation: the `git` binary).
//!
//! Both traits are async, return boxed errors where the underlying tool
//! decides the failure shape, and are annotated for `mockall` so the
//! orchestration can be tested without a generator or a remote.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

/// Result of a successful documentation build.
#[derive(Debug, Clone)]
pub struct BuiltDocs {
    /// Directory holding the generated static files.
    pub output_dir: PathBuf,
    /// Number of regular files produced.
    pub file_count: usize,
    /// SHA-256 digest over the output tree (paths and contents).
    pub digest: String,
}

/// Identifier of a created commit, as printed by the VCS.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct CommitId(pub String);

/// Whether the commit identity was already configured or the fallback bot
/// identity had to be applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum IdentitySource {
    Configured,
    Fallback,
}

/// Error type for documentation builds.
#[derive(Debug)]
pub enum BuildError {
    Io(std::io::Error),
    /// The generator binary could not be launched at all.
    Spawn(std::io::Error),
    /// The generator ran and exited with a failure status.
    Generator(String),
}

impl From<std::io::Error> for BuildError {
    fn from(e: std::io::Error) -> Self {
        BuildError::Io(e)
    }
}

impl std::fmt::Display for BuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildError::Io(e) => write!(f, "documentation build I/O error: {e}"),
            BuildError::Spawn(e) => write!(f, "failed to launch documentation generator: {e}"),
            BuildError::Generator(msg) => write!(f, "documentation generator failed: {msg}"),
        }
    }
}

impl std::error::Error for BuildError {}

/// Error type for VCS operations (boxed, the tool decides the shape).
pub type VcsError = Box<dyn std::error::Error + Send + Sync>;

/// Trait for building the documentation tree as configured.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait DocBuilder: Send + Sync {
    /// Run the generator and describe what it produced.
    async fn build(&self) -> Result<BuiltDocs, BuildError>;
}

/// Trait for every operation against the publishing branch.
///
/// The implementor owns the remote URL, the branch name and the credential;
/// callers only hand it the working tree they are operating on.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait BranchVcs: Send + Sync {
    /// Clone the publishing branch into `dest` (single branch, shallow).
    async fn clone_branch(&self, dest: &Path) -> Result<(), VcsError>;

    /// Stage every change in the working tree.
    async fn stage_all(&self, worktree: &Path) -> Result<(), VcsError>;

    /// Whether anything is actually staged against the index.
    async fn staged_changes(&self, worktree: &Path) -> Result<bool, VcsError>;

    /// Make sure a commit identity exists, applying the repository-local
    /// fallback bot identity only when none is configured.
    async fn ensure_identity(&self, worktree: &Path) -> Result<IdentitySource, VcsError>;

    /// Create a commit from the staged changes.
    async fn commit(&self, worktree: &Path, message: &str) -> Result<CommitId, VcsError>;

    /// Push the new commit to the publishing branch.
    async fn push(&self, worktree: &Path) -> Result<(), VcsError>;
}
