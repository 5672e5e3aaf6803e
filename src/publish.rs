//! Coordinating module for the build-gate-clone-overlay-commit-push pipeline.

use tracing::{debug, error, info};
use uuid::Uuid;

use crate::config::PublishConfig;
use crate::contract::{BranchVcs, BuildError, DocBuilder, IdentitySource, VcsError};
use crate::overlay;

/// Exit status the binary uses when the push credential is empty or unset.
pub const MISSING_CREDENTIAL_EXIT: i32 = 12;

/// What a publish run ended as.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub enum PublishOutcome {
    /// A new commit was created and pushed to the publishing branch.
    Published {
        commit: String,
        identity: IdentitySource,
    },
    /// The built documentation matched the publishing branch; nothing to do.
    NoChanges,
    /// Dry run: reports whether a real run would have published.
    DryRun { would_publish: bool },
}

/// Report handed back to the CLI after a run.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PublishReport {
    pub run_id: String,
    pub outcome: PublishOutcome,
    pub built_files: usize,
    pub digest: String,
    pub dry_run: bool,
}

#[derive(Debug)]
pub enum PublishError {
    /// The push credential is empty or unset. Mapped to exit status 12.
    MissingCredential,
    Build(BuildError),
    Vcs { stage: &'static str, source: VcsError },
    Io(std::io::Error),
}

impl From<std::io::Error> for PublishError {
    fn from(e: std::io::Error) -> Self {
        PublishError::Io(e)
    }
}

impl std::fmt::Display for PublishError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PublishError::MissingCredential => {
                write!(f, "push credential is empty or unset")
            }
            PublishError::Build(e) => write!(f, "{e}"),
            PublishError::Vcs { stage, source } => write!(f, "{stage} failed: {source}"),
            PublishError::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for PublishError {}

/// Run the full pipeline.
///
/// Stage order: credential gate, documentation build, clone of the publishing
/// branch, overlay, staged-change probe, then commit and push only when the
/// overlay actually changed something. With `dry_run` the gate is skipped and
/// the run stops after the probe.
pub async fn publish(
    config: &PublishConfig,
    dry_run: bool,
    builder: &dyn DocBuilder,
    vcs: &dyn BranchVcs,
) -> Result<PublishReport, PublishError> {
    let run_id = Uuid::new_v4().to_string();
    info!(run_id = %run_id, dry_run = dry_run, "Starting publish pipeline");

    if !dry_run && config.credential.is_none() {
        error!(run_id = %run_id, "Push credential is empty or unset, aborting before any VCS work");
        return Err(PublishError::MissingCredential);
    }

    let built = match builder.build().await {
        Ok(built) => {
            info!(
                run_id = %run_id,
                files = built.file_count,
                digest = %built.digest,
                "Documentation build succeeded"
            );
            built
        }
        Err(e) => {
            error!(run_id = %run_id, error = %e, "Documentation build failed");
            return Err(PublishError::Build(e));
        }
    };

    let workdir = tempfile::tempdir()?;
    let worktree = workdir.path();

    if let Err(e) = vcs.clone_branch(worktree).await {
        return Err(PublishError::Vcs {
            stage: "clone of publishing branch",
            source: e,
        });
    }

    if config.target.clean {
        overlay::clean_stale(worktree, &built.output_dir)?;
    }
    overlay::copy_tree(&built.output_dir, worktree)?;

    if let Err(e) = vcs.stage_all(worktree).await {
        return Err(PublishError::Vcs {
            stage: "staging",
            source: e,
        });
    }
    let changed = match vcs.staged_changes(worktree).await {
        Ok(changed) => changed,
        Err(e) => {
            return Err(PublishError::Vcs {
                stage: "staged-change probe",
                source: e,
            })
        }
    };

    if dry_run {
        let report = PublishReport {
            run_id,
            outcome: PublishOutcome::DryRun {
                would_publish: changed,
            },
            built_files: built.file_count,
            digest: built.digest,
            dry_run: true,
        };
        trace_report(&report);
        return Ok(report);
    }

    if !changed {
        info!(run_id = %run_id, "Publishing branch already up to date, no commit created");
        let report = PublishReport {
            run_id,
            outcome: PublishOutcome::NoChanges,
            built_files: built.file_count,
            digest: built.digest,
            dry_run: false,
        };
        trace_report(&report);
        return Ok(report);
    }

    let identity = match vcs.ensure_identity(worktree).await {
        Ok(identity) => identity,
        Err(e) => {
            return Err(PublishError::Vcs {
                stage: "identity setup",
                source: e,
            })
        }
    };

    let message = match &config.target.commit_message {
        Some(message) => message.clone(),
        None => format!(
            "Update API documentation (build {})",
            &built.digest[..12.min(built.digest.len())]
        ),
    };
    let commit = match vcs.commit(worktree, &message).await {
        Ok(commit) => commit,
        Err(e) => {
            return Err(PublishError::Vcs {
                stage: "commit",
                source: e,
            })
        }
    };

    if let Err(e) = vcs.push(worktree).await {
        return Err(PublishError::Vcs {
            stage: "push",
            source: e,
        });
    }

    info!(run_id = %run_id, commit = %commit.0, "Publish pipeline complete");
    let report = PublishReport {
        run_id,
        outcome: PublishOutcome::Published {
            commit: commit.0,
            identity,
        },
        built_files: built.file_count,
        digest: built.digest,
        dry_run: false,
    };
    trace_report(&report);
    Ok(report)
}

fn trace_report(report: &PublishReport) {
    match serde_json::to_string_pretty(report) {
        Ok(json) => debug!(json = %json, "Publish report as JSON"),
        Err(e) => error!(error = ?e, "Failed to serialize publish report as JSON"),
    }
}
