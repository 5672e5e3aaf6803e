//! Git subprocess driver for the publishing branch.
//!
//! Every mutation of the publishing branch goes through the `git` binary;
//! nothing here reimplements version control. The credential travels only
//! inside the remote URL handed to `git` and is masked before any URL is
//! logged or put into an error message.

use std::path::Path;
use std::process::Command;
use tracing::{debug, error, info};

use crate::config::PublishConfig;
use crate::contract::{BranchVcs, CommitId, IdentitySource, VcsError};

/// Bot identity applied when the clone has no commit identity configured.
pub const FALLBACK_USER_NAME: &str = "docs-sync[bot]";
pub const FALLBACK_USER_EMAIL: &str = "docs-sync[bot]@users.noreply.github.com";

/// Mask the userinfo portion of any URL embedded in `s`.
pub fn redact_url(s: &str) -> String {
    regex::Regex::new(r"://[^/@\s]+@")
        .unwrap()
        .replace_all(s, "://***@")
        .into_owned()
}

/// Attach the push credential to an `https` remote URL. Non-HTTP remotes
/// (`file://`, local paths, ssh) are returned unchanged; they carry their own
/// authentication.
pub fn authenticated_url(remote: &str, credential: &str) -> String {
    match remote.strip_prefix("https://") {
        Some(rest) => format!("https://x-access-token:{credential}@{rest}"),
        None => remote.to_string(),
    }
}

/// Real [`BranchVcs`] over the `git` binary.
pub struct GitCli {
    remote_url: String,
    branch: String,
}

impl GitCli {
    pub fn new(remote_url: String, branch: String) -> Self {
        Self { remote_url, branch }
    }

    /// Build the driver from merged config, attaching the credential to the
    /// remote URL when one is present.
    pub fn from_config(config: &PublishConfig) -> Self {
        let remote_url = match &config.credential {
            Some(credential) => authenticated_url(&config.remote, credential),
            None => config.remote.clone(),
        };
        Self::new(remote_url, config.target.branch.clone())
    }

    /// `git config <key>` resolved for the clone: Ok(true) when set anywhere
    /// (local, global or system), Ok(false) when unset.
    fn identity_key_set(&self, worktree: &Path, key: &str) -> Result<bool, VcsError> {
        let status = Command::new("git")
            .arg("-C")
            .arg(worktree)
            .arg("config")
            .arg(key)
            .status();
        match status {
            Ok(s) if s.success() => Ok(true),
            Ok(s) if s.code() == Some(1) => Ok(false),
            Ok(s) => Err(format!("git config {key} exited with {s}").into()),
            Err(e) => Err(format!("failed to launch git config: {e}").into()),
        }
    }

    fn set_local_identity(&self, worktree: &Path, key: &str, value: &str) -> Result<(), VcsError> {
        let status = Command::new("git")
            .arg("-C")
            .arg(worktree)
            .arg("config")
            .arg(key)
            .arg(value)
            .status();
        match status {
            Ok(s) if s.success() => Ok(()),
            Ok(s) => Err(format!("git config {key} exited with {s}").into()),
            Err(e) => Err(format!("failed to launch git config: {e}").into()),
        }
    }
}

#[async_trait::async_trait]
impl BranchVcs for GitCli {
    async fn clone_branch(&self, dest: &Path) -> Result<(), VcsError> {
        let output = Command::new("git")
            .arg("clone")
            .arg("--branch")
            .arg(&self.branch)
            .arg("--single-branch")
            .arg("--depth")
            .arg("1")
            .arg(&self.remote_url)
            .arg(dest)
            .output();

        match output {
            Ok(out) if out.status.success() => {
                info!(
                    remote = %redact_url(&self.remote_url),
                    branch = %self.branch,
                    path = %dest.display(),
                    "Cloned publishing branch"
                );
                Ok(())
            }
            Ok(out) => {
                let stderr = redact_url(&String::from_utf8_lossy(&out.stderr));
                error!(
                    remote = %redact_url(&self.remote_url),
                    branch = %self.branch,
                    "Git clone exited with non-zero code: {}", out.status
                );
                Err(format!(
                    "git clone of branch {} failed with {}: {}",
                    self.branch,
                    out.status,
                    stderr.trim()
                )
                .into())
            }
            Err(e) => {
                error!(error = ?e, "Failed to launch git clone");
                Err(format!("failed to launch git clone: {e}").into())
            }
        }
    }

    async fn stage_all(&self, worktree: &Path) -> Result<(), VcsError> {
        let status = Command::new("git")
            .arg("-C")
            .arg(worktree)
            .arg("add")
            .arg("-A")
            .status();
        match status {
            Ok(s) if s.success() => {
                debug!(path = %worktree.display(), "Staged working tree");
                Ok(())
            }
            Ok(s) => {
                error!(path = %worktree.display(), "Git add exited with non-zero code: {}", s);
                Err(format!("git add -A exited with {s}").into())
            }
            Err(e) => {
                error!(error = ?e, "Failed to launch git add");
                Err(format!("failed to launch git add: {e}").into())
            }
        }
    }

    async fn staged_changes(&self, worktree: &Path) -> Result<bool, VcsError> {
        // Exit 0: index matches HEAD. Exit 1: something is staged.
        let status = Command::new("git")
            .arg("-C")
            .arg(worktree)
            .arg("diff")
            .arg("--cached")
            .arg("--quiet")
            .status();
        match status {
            Ok(s) if s.success() => {
                info!(path = %worktree.display(), "No staged changes in worktree");
                Ok(false)
            }
            Ok(s) if s.code() == Some(1) => {
                info!(path = %worktree.display(), "Worktree has staged changes");
                Ok(true)
            }
            Ok(s) => {
                error!(path = %worktree.display(), "Git diff exited with unexpected code: {}", s);
                Err(format!("git diff --cached --quiet exited with {s}").into())
            }
            Err(e) => {
                error!(error = ?e, "Failed to launch git diff");
                Err(format!("failed to launch git diff: {e}").into())
            }
        }
    }

    async fn ensure_identity(&self, worktree: &Path) -> Result<IdentitySource, VcsError> {
        let name_set = self.identity_key_set(worktree, "user.name")?;
        let email_set = self.identity_key_set(worktree, "user.email")?;
        if name_set && email_set {
            debug!("Commit identity already configured");
            return Ok(IdentitySource::Configured);
        }
        if !name_set {
            self.set_local_identity(worktree, "user.name", FALLBACK_USER_NAME)?;
        }
        if !email_set {
            self.set_local_identity(worktree, "user.email", FALLBACK_USER_EMAIL)?;
        }
        info!(
            user_name = FALLBACK_USER_NAME,
            "Applied fallback commit identity"
        );
        Ok(IdentitySource::Fallback)
    }

    async fn commit(&self, worktree: &Path, message: &str) -> Result<CommitId, VcsError> {
        let status = Command::new("git")
            .arg("-C")
            .arg(worktree)
            .arg("commit")
            .arg("-m")
            .arg(message)
            .status();
        match status {
            Ok(s) if s.success() => {}
            Ok(s) => {
                error!("Git commit exited with non-zero code: {}", s);
                return Err(format!("git commit exited with {s}").into());
            }
            Err(e) => {
                error!(error = ?e, "Failed to launch git commit");
                return Err(format!("failed to launch git commit: {e}").into());
            }
        }

        let output = Command::new("git")
            .arg("-C")
            .arg(worktree)
            .arg("rev-parse")
            .arg("HEAD")
            .output();
        match output {
            Ok(out) if out.status.success() => {
                let id = String::from_utf8_lossy(&out.stdout).trim().to_string();
                info!(commit = %id, "Created publishing commit");
                Ok(CommitId(id))
            }
            Ok(out) => Err(format!("git rev-parse HEAD exited with {}", out.status).into()),
            Err(e) => Err(format!("failed to launch git rev-parse: {e}").into()),
        }
    }

    async fn push(&self, worktree: &Path) -> Result<(), VcsError> {
        let output = Command::new("git")
            .arg("-C")
            .arg(worktree)
            .arg("push")
            .arg("origin")
            .arg(format!("HEAD:{}", self.branch))
            .output();
        match output {
            Ok(out) if out.status.success() => {
                info!(
                    remote = %redact_url(&self.remote_url),
                    branch = %self.branch,
                    "Pushed publishing branch"
                );
                Ok(())
            }
            Ok(out) => {
                let stderr = redact_url(&String::from_utf8_lossy(&out.stderr));
                error!(
                    branch = %self.branch,
                    "Git push exited with non-zero code: {}", out.status
                );
                Err(format!(
                    "git push to branch {} failed with {}: {}",
                    self.branch,
                    out.status,
                    stderr.trim()
                )
                .into())
            }
            Err(e) => {
                error!(error = ?e, "Failed to launch git push");
                Err(format!("failed to launch git push: {e}").into())
            }
        }
    }
}
