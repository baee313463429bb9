use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use swapflow::application::{Cli, CommandExecutor};
use swapflow::shared::config::ConfigLoader;

#[tokio::main]
async fn main() -> Result<()> {
    // Results go to stdout; logs stay on stderr
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = ConfigLoader::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;

    CommandExecutor::execute(cli.command, config).await?;
    Ok(())
}
