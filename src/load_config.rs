use crate::config::{BuildConfig, PublishConfig, PublishTarget};
use anyhow::Result;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Environment variable holding the push credential. Empty counts as unset.
pub const CREDENTIAL_ENV: &str = "PAGES_PUSH_TOKEN";
/// Environment variable holding the `owner/name` repository slug used to
/// construct the clone URL when no explicit remote is configured.
pub const REPOSITORY_ENV: &str = "GITHUB_REPOSITORY";

#[derive(Deserialize)]
struct StaticConfig {
    build: BuildSection,
    publish: PublishSection,
}

#[derive(Deserialize)]
struct BuildSection {
    generator: String,
    package: String,
    output_dir: PathBuf,
    #[serde(default)]
    extra_args: Vec<String>,
}

#[derive(Deserialize)]
struct PublishSection {
    branch: String,
    #[serde(default)]
    remote: Option<String>,
    #[serde(default)]
    clean: bool,
    #[serde(default)]
    commit_message: Option<String>,
}

/// Loads the static YAML config file (no secrets) and injects the
/// environment-derived values: the push credential and, when no explicit
/// remote is configured, the repository slug. Returns a fully merged
/// [`PublishConfig`] or an error.
///
/// The credential is deliberately kept optional here; whether its absence is
/// fatal is decided by the publish pipeline (exit status 12), not the loader.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<PublishConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    let static_conf: StaticConfig = match serde_yaml::from_str(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            conf
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
        }
    };

    let build = BuildConfig {
        generator: static_conf.build.generator,
        package: static_conf.build.package,
        output_dir: static_conf.build.output_dir,
        extra_args: static_conf.build.extra_args,
    };
    build.trace_loaded();

    let target = PublishTarget {
        branch: static_conf.publish.branch,
        remote: static_conf.publish.remote,
        clean: static_conf.publish.clean,
        commit_message: static_conf.publish.commit_message,
    };
    target.trace_loaded();

    // Empty credential counts as unset; the gate in the pipeline decides.
    let credential = match std::env::var(CREDENTIAL_ENV) {
        Ok(token) if !token.is_empty() => {
            info!(credential_len = token.len(), "{CREDENTIAL_ENV} found in env");
            Some(token)
        }
        _ => {
            info!("{CREDENTIAL_ENV} not set or empty");
            None
        }
    };

    let remote = match &target.remote {
        Some(remote) => remote.clone(),
        None => {
            let slug = match std::env::var(REPOSITORY_ENV) {
                Ok(slug) if !slug.is_empty() => slug,
                _ => {
                    error!("{REPOSITORY_ENV} environment variable not set and no explicit remote configured");
                    anyhow::bail!(
                        "{REPOSITORY_ENV} environment variable not set and no publish.remote configured"
                    );
                }
            };
            let slug_shape = regex::Regex::new(
                r"^[A-Za-z0-9][A-Za-z0-9_.-]*/[A-Za-z0-9][A-Za-z0-9_.-]*$",
            )
            .unwrap();
            if !slug_shape.is_match(&slug) {
                error!(slug = %slug, "{REPOSITORY_ENV} is not an owner/name slug");
                anyhow::bail!("{REPOSITORY_ENV} must be an owner/name slug, got {slug:?}");
            }
            format!("https://github.com/{slug}.git")
        }
    };

    let config = PublishConfig {
        build,
        target,
        remote,
        credential,
    };
    config.trace_loaded();
    Ok(config)
}
