//! CLI argument parsing and command dispatch

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use git_meta::defaults::ENV_JOBS;

use crate::commands::{self, Session};

/// git-meta - Run git queries across a meta-repository and its submodules
#[derive(Parser, Debug)]
#[command(name = "git-meta")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "warn")]
    log_level: String,

    /// Run as if git-meta was started in DIR
    #[arg(short = 'C', global = true, value_name = "DIR")]
    directory: Option<PathBuf>,

    /// Maximum number of repositories queried at once
    #[arg(short = 'j', long, global = true, value_name = "N", env = ENV_JOBS)]
    jobs: Option<usize>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compare a tree to the working tree or index across all repositories
    DiffIndex(commands::diff_index::DiffIndexArgs),

    /// Compare the working tree to the index across all repositories
    DiffFiles(commands::diff_files::DiffFilesArgs),

    /// List files in the current repository and the submodules beneath it
    LsFiles(commands::ls_files::LsFilesArgs),

    /// Stage files in the repositories that own them
    UpdateIndex(commands::update_index::UpdateIndexArgs),

    /// Show gitattributes for files across all repositories
    CheckAttr(commands::check_attr::CheckAttrArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.log_level);

        let session = Session {
            directory: self.directory,
            jobs: self.jobs,
        };
        match self.command {
            Commands::DiffIndex(args) => commands::diff_index::execute(args, &session),
            Commands::DiffFiles(args) => commands::diff_files::execute(args, &session),
            Commands::LsFiles(args) => commands::ls_files::execute(args, &session),
            Commands::UpdateIndex(args) => commands::update_index::execute(args, &session),
            Commands::CheckAttr(args) => commands::check_attr::execute(args, &session),
        }
    }
}

/// Log to stderr at `level`; `RUST_LOG` takes precedence when set.
fn init_logging(level: &str) {
    let env = env_logger::Env::default().default_filter_or(level);
    // A second initialisation (tests) is harmless.
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .target(env_logger::Target::Stderr)
        .try_init();
}
