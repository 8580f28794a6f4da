use clap::{Parser, Subcommand};

use std::path::PathBuf;

use super::constants::{
    ENV_CONFIG, ENV_DB_MAX_CONNECTIONS, ENV_HOST, ENV_IMPORT_MAX_BODY_BYTES, ENV_MAX_FILTERS,
    ENV_PORT,
};

#[derive(Parser)]
#[command(name = "hoard")]
#[command(version, about = "Collection tracking server", long_about = None)]
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

    /// Maximum SQLite pool connections
    #[arg(long, global = true, env = ENV_DB_MAX_CONNECTIONS)]
    pub db_max_connections: Option<u32>,

    /// Maximum number of filters accepted per list request
    #[arg(long, global = true, env = ENV_MAX_FILTERS)]
    pub max_filters: Option<usize>,

    /// Maximum backup import body size in bytes
    #[arg(long, global = true, env = ENV_IMPORT_MAX_BODY_BYTES)]
    pub import_max_body_bytes: Option<usize>,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Start the server (default command)
    Start,
    /// System maintenance commands
    System {
        #[command(subcommand)]
        command: SystemCommands,
    },
}

#[derive(Subcommand, Clone, Debug)]
pub enum SystemCommands {
    /// Delete the local data directory (database included). Requires confirmation.
    Prune {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub config: Option<PathBuf>,
    pub db_max_connections: Option<u32>,
    pub max_filters: Option<usize>,
    pub import_max_body_bytes: Option<usize>,
}

/// Parse CLI arguments and return config with command
pub fn parse() -> (CliConfig, Option<Commands>) {
    let cli = Cli::parse();
    let config = CliConfig {
        host: cli.host,
        port: cli.port,
        config: cli.config,
        db_max_connections: cli.db_max_connections,
        max_filters: cli.max_filters,
        import_max_body_bytes: cli.import_max_body_bytes,
    };
    (config, cli.command)
}
