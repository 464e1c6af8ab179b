use clap::{Parser, Subcommand};
use clap_complete::Shell;
use invsup::Environment;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "invsup")]
#[command(about = "Manage inventory-service instances: start/stop/restart/status for dev/test/prod")]
pub struct Cli {
    /// Directory the server is launched from (where index.js lives)
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Directory holding pid/port/log state files (defaults to the system temp dir)
    #[arg(long)]
    pub state_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the server for an environment
    Start {
        env: Environment,

        /// Override port for this environment (will be saved)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Stop the server for an environment
    Stop {
        env: Environment,

        /// Port to stop (defaults to saved/default)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Restart the server for an environment
    Restart {
        env: Environment,

        /// Override port for this environment (will be saved)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Show status for an environment
    Status {
        env: Environment,

        /// Port to check (defaults to saved/default)
        #[arg(long)]
        port: Option<u16>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Generate shell completions
    Completions { shell: Shell },
}
