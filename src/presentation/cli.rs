//! CLI Argument Parsing
//!
//! This module defines the CLI interface using clap.
//!
//! ## Design Notes
//!
//! - Global flags (--config, --json, --verbose) are inherited by all subcommands
//! - Projects and remotes are selected by name or by position in the config file

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// revdeploy - incremental deployment of git repositories to remote file stores
#[derive(Parser, Debug)]
#[command(name = "revdeploy")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (default: $REVDEPLOY_CONFIG or ./revdeploy.toml)
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Emit JSON lines instead of human-readable text
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Transfer the changes since the last deployment to remotes
    Deploy {
        /// Project name or index (default: every project)
        #[arg(short, long)]
        project: Option<String>,

        /// Remote name or index (default: every remote of the project)
        #[arg(short, long)]
        remote: Option<String>,

        /// Deploy this branch's tip instead of HEAD
        #[arg(short, long)]
        branch: Option<String>,

        /// Upload every tracked file regardless of the remote marker
        #[arg(long)]
        install: bool,

        /// Print file-level progress
        #[arg(long)]
        detailed: bool,
    },

    /// Compare remote markers with the newest revision
    Status {
        /// Project name or index (default: every project)
        #[arg(short, long)]
        project: Option<String>,

        /// Remote name or index (default: every remote of the project)
        #[arg(short, long)]
        remote: Option<String>,

        /// Inspect this branch's tip instead of HEAD
        #[arg(short, long)]
        branch: Option<String>,
    },

    /// List the branches of configured repositories
    Branches {
        /// Project name or index (default: every project)
        #[arg(short, long)]
        project: Option<String>,
    },
}
