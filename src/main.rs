//! # git-meta CLI
//!
//! This is the binary entry point for the `git-meta` command-line tool.
//!
//! Its primary responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Executing the appropriate command based on the parsed arguments.
//! - Reporting errors: mistakes in what the user asked for are printed as
//!   they are, anything else with its full context chain.
//!
//! The core logic lives in the `git_meta` library crate; the binary is a thin
//! wrapper around it.

mod cli;
mod commands;

use std::process::ExitCode;

use clap::Parser;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    match cli.execute() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<git_meta::error::Error>() {
                Some(user) if user.is_user_error() => eprintln!("{}", user),
                _ => eprintln!("Error: {:?}", err),
            }
            ExitCode::FAILURE
        }
    }
}
