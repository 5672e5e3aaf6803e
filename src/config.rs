use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info};

/// How the documentation is built: which generator binary to run, against
/// which source package, and where the static output lands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    pub generator: String,
    pub package: String,
    pub output_dir: PathBuf,
    #[serde(default)]
    pub extra_args: Vec<String>,
}

impl BuildConfig {
    pub fn trace_loaded(&self) {
        info!(
            generator = %self.generator,
            package = %self.package,
            output_dir = %self.output_dir.display(),
            extra_args = self.extra_args.len(),
            "Loaded build config"
        );
    }
}

/// Where the built documentation is published: the branch, an optional
/// explicit remote URL, and the overlay/commit behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishTarget {
    pub branch: String,
    #[serde(default)]
    pub remote: Option<String>,
    #[serde(default)]
    pub clean: bool,
    #[serde(default)]
    pub commit_message: Option<String>,
}

impl PublishTarget {
    pub fn trace_loaded(&self) {
        info!(
            branch = %self.branch,
            remote_configured = self.remote.is_some(),
            clean = self.clean,
            "Loaded publish target"
        );
    }
}

/// Fully merged runtime configuration: static file sections plus
/// environment-injected values. `remote` is the unauthenticated clone URL;
/// the credential is attached only when a push is actually performed.
pub struct PublishConfig {
    pub build: BuildConfig,
    pub target: PublishTarget,
    pub remote: String,
    pub credential: Option<String>,
}

// Hand-written so a debug dump can never leak the credential.
impl std::fmt::Debug for PublishConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublishConfig")
            .field("build", &self.build)
            .field("target", &self.target)
            .field("remote", &self.remote)
            .field("credential", &self.credential.as_ref().map(|_| "***"))
            .finish()
    }
}

impl PublishConfig {
    pub fn trace_loaded(&self) {
        // The credential itself must never reach a log line.
        info!(
            branch = %self.target.branch,
            remote = %crate::gitops::redact_url(&self.remote),
            credential_present = self.credential.is_some(),
            "Config loaded and merged"
        );
        debug!(build = ?self.build, target = ?self.target, "Config loaded (full debug)");
    }
}
