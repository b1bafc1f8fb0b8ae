//! revdeploy CLI - incremental deployment of git repositories
//!
//! Usage: revdeploy [OPTIONS] <COMMAND>
//!
//! Commands:
//!   deploy    Transfer the changes since the last deployment to remotes
//!   status    Compare remote markers with the newest revision
//!   branches  List the branches of configured repositories

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use revdeploy::presentation::cli::{Cli, Commands};

mod commands;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = commands::load_config(cli.config.as_deref(), cli.json)?;

    match cli.command {
        Commands::Deploy {
            project,
            remote,
            branch,
            install,
            detailed,
        } => commands::deploy::cmd_deploy(
            &config,
            commands::deploy::DeployArgs {
                project: project.as_deref(),
                remote: remote.as_deref(),
                branch: branch.as_deref(),
                install,
                detailed,
                json: cli.json,
            },
        ),
        Commands::Status {
            project,
            remote,
            branch,
        } => commands::status::cmd_status(
            &config,
            project.as_deref(),
            remote.as_deref(),
            branch.as_deref(),
            cli.json,
        ),
        Commands::Branches { project } => {
            commands::branches::cmd_branches(&config, project.as_deref(), cli.json)
        }
    }
}

/// Log to stderr; `RUST_LOG` overrides the `-v` count
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,revdeploy={}", level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}
