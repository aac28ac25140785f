//! `secretchain` resolves secrets through the backend chain described by a
//! TOML configuration file.

mod cli;
mod commands;
mod errors;
mod tracing;

use crate::cli::{Cli, Commands};
use crate::errors::CliError;
use crate::tracing::{TracingConfig, init_tracing};

#[tokio::main]
async fn main() {
    if let Err(error) = run_main().await {
        #[allow(clippy::print_stderr)]
        {
            eprintln!("{error:?}");
        }
        std::process::exit(1);
    }
}

async fn run_main() -> miette::Result<()> {
    let cli = cli::parse();

    init_tracing(TracingConfig {
        format: cli.log_format,
        level: cli.level.into(),
        filter: cli.log_filter.clone(),
    })?;

    run(cli).await?;
    Ok(())
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let resolver = commands::load_resolver(cli.config.as_deref()).await?;
    let mut out = std::io::stdout().lock();

    match cli.command {
        Commands::Get { name, raw } => {
            ::tracing::debug!(secret = %name, raw, "Running get command");
            commands::get(&resolver, &name, raw, &mut out).await
        }
        Commands::Backends => commands::backends(&resolver, &mut out),
    }
}
