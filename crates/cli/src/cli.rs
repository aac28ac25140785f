use crate::tracing::{LogLevel, TracingFormat};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "secretchain")]
#[command(about = "Resolve secrets through an ordered chain of secret backends")]
#[command(long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(
        short = 'c',
        long,
        global = true,
        env = secretchain::CONFIG_ENV_VAR,
        help = "Path to the secret store configuration (TOML)"
    )]
    pub config: Option<PathBuf>,

    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Set logging level (RUST_LOG takes precedence)",
        default_value = "warn",
        value_enum
    )]
    pub level: LogLevel,

    #[arg(
        long,
        global = true,
        help = "Log output format",
        default_value = "compact",
        value_enum
    )]
    pub log_format: TracingFormat,

    #[arg(
        long,
        global = true,
        help = "Tracing filter directive, e.g. 'secretchain=trace' (overrides --log-level and RUST_LOG)"
    )]
    pub log_filter: Option<String>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    #[command(about = "Resolve a secret by name")]
    Get {
        #[arg(help = "Secret name, use ':' to address nested JSON sections")]
        name: String,
        #[arg(long, help = "Print only the secret value")]
        raw: bool,
    },
    #[command(about = "List configured backends in resolution order")]
    Backends,
}

pub fn parse() -> Cli {
    Cli::parse()
}
