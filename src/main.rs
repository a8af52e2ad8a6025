mod cli;
mod application;
mod domain;
mod data;
mod ml;
mod infra;

use anyhow::Result;
use cli::Cli;
use clap::Parser;

fn main() -> Result<()> {
    // Diagnostics go to stderr; stdout is reserved for banners and reports
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("train_classifier=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    cli.run()?;
    Ok(())
}
