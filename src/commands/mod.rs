//! # CLI Command Implementations
//!
//! This module contains the implementation for each subcommand of the
//! `git-meta` command-line tool. Each subcommand is defined in its own file.
//!
//! ## Structure
//!
//! Each command module contains:
//! - An `Args` struct that defines the command-specific arguments and options,
//!   derived using `clap`.
//! - A `run` function that builds the git queries for those arguments and
//!   returns the bytes to print, given a [`MetaContext`] and a
//!   [`CommandCombiner`]. Tests drive this with a mock [`GitOperations`].
//! - An `execute` function that wires `run` to the real `git` executable and
//!   standard output.

pub mod check_attr;
pub mod diff_files;
pub mod diff_index;
pub mod ls_files;
pub mod update_index;

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};

use git_meta::combine::{CommandCombiner, MetaContext};
use git_meta::git::{discover_forest, GitOperations};

/// Options shared by every subcommand.
#[derive(Debug, Clone, Default)]
pub struct Session {
    /// Run as if started in this directory.
    pub directory: Option<PathBuf>,
    /// Maximum number of repositories queried at once.
    pub jobs: Option<usize>,
}

impl Session {
    /// Discover the forest around the invocation directory.
    pub fn context(&self, git: &dyn GitOperations) -> Result<MetaContext> {
        let cwd = match &self.directory {
            Some(dir) => dir.clone(),
            None => std::env::current_dir().context("Failed to get current directory")?,
        };
        // The forest root comes back from git fully resolved, so the
        // invocation directory must be too for the two to line up.
        let cwd = cwd
            .canonicalize()
            .with_context(|| format!("Cannot access {}", cwd.display()))?;
        let forest = discover_forest(git, &cwd)?;
        Ok(MetaContext::new(forest, cwd))
    }

    pub fn combiner<'g>(&self, git: &'g dyn GitOperations) -> Result<CommandCombiner<'g>> {
        let combiner = CommandCombiner::new(git);
        Ok(match self.jobs {
            Some(jobs) => combiner.with_jobs(jobs)?,
            None => combiner,
        })
    }
}

/// Append the final record terminator git itself would have printed.
pub fn terminate(mut output: String, format_z: bool) -> String {
    if !output.is_empty() {
        output.push(if format_z { '\0' } else { '\n' });
    }
    output
}

/// Newline-terminate free-form text (patches, diffstats).
pub fn terminate_text(mut output: String) -> String {
    if !output.is_empty() && !output.ends_with('\n') {
        output.push('\n');
    }
    output
}

pub fn write_stdout(output: &str) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(output.as_bytes())?;
    stdout.flush()?;
    Ok(())
}
