use clap::{Parser, Subcommand};

use std::path::PathBuf;

use crate::data::filters::UnknownFieldPolicy;

use super::constants::{ENV_CONFIG, ENV_DATABASE_PATH, ENV_HOST, ENV_PORT, ENV_UNKNOWN_FIELDS};

#[derive(Parser)]
#[command(name = "catalog")]
#[command(version, about = "Product catalog search server", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Server host address
    #[arg(long, short = 'H', global = true, env = ENV_HOST)]
    pub host: Option<String>,

    /// Server port
    #[arg(long, short = 'p', global = true, env = ENV_PORT)]
    pub port: Option<u16>,

    /// Path to config file
    #[arg(long, short = 'c', global = true, env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    /// SQLite database file (defaults to the data directory)
    #[arg(long, global = true, env = ENV_DATABASE_PATH)]
    pub database: Option<PathBuf>,

    /// Handling of filter fields missing from the registry (strict or permissive)
    #[arg(long, global = true, env = ENV_UNKNOWN_FIELDS, value_parser = parse_unknown_field_policy)]
    pub unknown_fields: Option<UnknownFieldPolicy>,
}

/// Parse unknown-field policy from CLI/env string
fn parse_unknown_field_policy(s: &str) -> Result<UnknownFieldPolicy, String> {
    match s.to_lowercase().as_str() {
        "strict" => Ok(UnknownFieldPolicy::Strict),
        "permissive" => Ok(UnknownFieldPolicy::Permissive),
        _ => Err(format!(
            "Invalid unknown-field policy '{}'. Valid options: strict, permissive",
            s
        )),
    }
}

#[derive(Subcommand, Clone, Debug, PartialEq)]
pub enum Commands {
    /// Start the server (default command)
    Start,
    /// Create the catalog table and fill it with generated products
    Seed {
        /// Number of products to generate
        #[arg(long, short = 'n', default_value_t = 1000)]
        count: usize,

        /// Delete existing products first
        #[arg(long)]
        reset: bool,
    },
    /// Print the SQL a search request compiles to, without running it
    Explain {
        /// Search request body as JSON
        request: String,
    },
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub config: Option<PathBuf>,
    pub database: Option<PathBuf>,
    pub unknown_fields: Option<UnknownFieldPolicy>,
}

impl From<Cli> for (CliConfig, Option<Commands>) {
    fn from(cli: Cli) -> Self {
        let config = CliConfig {
            host: cli.host,
            port: cli.port,
            config: cli.config,
            database: cli.database,
            unknown_fields: cli.unknown_fields,
        };
        (config, cli.command)
    }
}

/// Parse CLI arguments and return config with command
pub fn parse() -> (CliConfig, Option<Commands>) {
    Cli::parse().into()
}
