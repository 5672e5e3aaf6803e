use crate::build::GeneratorCli;
use crate::gitops::GitCli;
use crate::load_config::load_config;
use crate::publish::publish;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI for docs-sync: build API documentation and publish it to a branch.
#[derive(Parser)]
#[clap(
    name = "docs-sync",
    version,
    about = "Build API documentation with an external generator and synchronise it to a publishing branch"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the documentation and publish it to the configured branch
    Publish {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
        /// Build and report what would change without committing or pushing
        #[clap(long)]
        dry_run: bool,
    },
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Publish { config, dry_run } => {
            let config = load_config(config)?;
            println!("Publish starting...");
            let builder = GeneratorCli::new(config.build.clone());
            let vcs = GitCli::from_config(&config);
            match publish(&config, dry_run, &builder, &vcs).await {
                Ok(report) => {
                    println!("Publish complete.\nReport:");
                    println!("{:#?}", report);
                    Ok(())
                }
                Err(e) => {
                    eprintln!("[ERROR] Publish failed: {}", e);
                    Err(anyhow::Error::new(e))
                }
            }
        }
    }
}
