//! Documentation build stage: drives the external generator as a subprocess.

use std::fs;
use std::path::Path;
use std::process::Command;
use tracing::{error, info};

use crate::config::BuildConfig;
use crate::contract::{BuildError, BuiltDocs, DocBuilder};
use crate::overlay;

/// Real [`DocBuilder`]: spawns the configured generator binary.
///
/// Invocation shape: `<generator> [extra args] -o <output_dir> <package>`,
/// the conventional interface of API documentation generators.
pub struct GeneratorCli {
    config: BuildConfig,
}

impl GeneratorCli {
    pub fn new(config: BuildConfig) -> Self {
        Self { config }
    }
}

#[async_trait::async_trait]
impl DocBuilder for GeneratorCli {
    async fn build(&self) -> Result<BuiltDocs, BuildError> {
        let out_dir = &self.config.output_dir;

        if !Path::new(out_dir).exists() {
            if let Err(e) = fs::create_dir_all(out_dir) {
                error!(
                    error = ?e,
                    path = %out_dir.display(),
                    "Failed to create documentation output directory"
                );
                return Err(BuildError::Io(e));
            }
        }

        let status = Command::new(&self.config.generator)
            .args(&self.config.extra_args)
            .arg("-o")
            .arg(out_dir)
            .arg(&self.config.package)
            .status();

        match status {
            Ok(s) if s.success() => {
                info!(
                    generator = %self.config.generator,
                    package = %self.config.package,
                    output_dir = %out_dir.display(),
                    "Documentation generator finished"
                );
            }
            Ok(s) => {
                error!(
                    generator = %self.config.generator,
                    package = %self.config.package,
                    "Documentation generator exited with non-zero code: {}", s
                );
                return Err(BuildError::Generator(format!(
                    "{} exited with {}",
                    self.config.generator, s
                )));
            }
            Err(e) => {
                error!(
                    error = ?e,
                    generator = %self.config.generator,
                    "Failed to launch documentation generator"
                );
                return Err(BuildError::Spawn(e));
            }
        }

        let digest = overlay::tree_digest(out_dir)?;
        info!(
            files = digest.files,
            digest = %digest.sha256,
            "Documentation build catalogued"
        );
        Ok(BuiltDocs {
            output_dir: out_dir.clone(),
            file_count: digest.files,
            digest: digest.sha256,
        })
    }
}
