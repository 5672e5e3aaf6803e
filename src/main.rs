use clap::Parser;
use docs_sync::cli::{run, Cli};
use docs_sync::publish::{PublishError, MISSING_CREDENTIAL_EXIT};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    // Logs go to stderr so stdout carries only the report.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            if let Some(PublishError::MissingCredential) = e.downcast_ref::<PublishError>() {
                std::process::exit(MISSING_CREDENTIAL_EXIT);
            }
            std::process::exit(1);
        }
    }
}
