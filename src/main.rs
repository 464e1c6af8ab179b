mod cli;
mod commands;
mod output;

use clap::{CommandFactory, Parser};
use cli::{Cli, Commands};
use invsup::{Error as SupError, FileStateStore, LaunchSpec, Supervisor};

fn main() {
    if let Err(e) = run() {
        if let Some(sup_error) = e.downcast_ref::<SupError>() {
            eprintln!("Error: {}", sup_error);
            if let Some(suggestion) = sup_error.suggestion() {
                eprintln!("\nHint: {}", suggestion);
            }
        } else {
            eprintln!("Error: {:#}", e);
        }
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = Cli::command();
        let bin_name = cmd.get_name().to_string();
        clap_complete::generate(*shell, &mut cmd, bin_name, &mut std::io::stdout());
        return Ok(());
    }

    let store = match cli.state_dir {
        Some(dir) => FileStateStore::new(dir),
        None => FileStateStore::system(),
    };
    let mut supervisor = Supervisor::builder()
        .store(Box::new(store))
        .launch(LaunchSpec::inventory_service(cli.root))
        .build();

    match cli.command {
        Commands::Start { env, port } => {
            commands::run_start(&mut supervisor, env, port, &output::CliOutput)?;
        }
        Commands::Stop { env, port } => {
            commands::run_stop(&mut supervisor, env, port, &output::CliOutput)?;
        }
        Commands::Restart { env, port } => {
            commands::run_restart(&mut supervisor, env, port, &output::CliOutput)?;
        }
        Commands::Status { env, port, json } => {
            commands::run_status(&mut supervisor, env, port, json, &output::CliOutput)?;
        }
        Commands::Completions { .. } => unreachable!("handled before dispatch"),
    }

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}
