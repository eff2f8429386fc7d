//! # Diff-Files Command Implementation
//!
//! Compares the working tree with the index in every repository of the
//! forest and prints the raw records in meta-root coordinates.

use anyhow::Result;
use clap::Args;

use git_meta::classify::ClassifyOptions;
use git_meta::combine::{CommandCombiner, MetaContext, Query};
use git_meta::format::RecordList;
use git_meta::git::SystemGit;

use super::{terminate, write_stdout, Session};

/// Compare the working tree to the index across all repositories
#[derive(Args, Debug, Clone, Default)]
pub struct DiffFilesArgs {
    /// Terminate records with NUL and do not quote paths.
    #[arg(short = 'z')]
    pub null_terminated: bool,

    /// Limit the comparison to these paths.
    #[arg(value_name = "PATH")]
    pub paths: Vec<String>,
}

pub fn run(args: &DiffFilesArgs, ctx: &MetaContext, combiner: &CommandCombiner) -> Result<String> {
    let output = combiner.run(
        ctx,
        &Query::new("diff-files", ["--raw", "-z"]),
        &RecordList::new(args.null_terminated),
        &args.paths,
        ClassifyOptions::query(),
    )?;
    Ok(terminate(output, args.null_terminated))
}

/// Execute the `diff-files` command.
pub fn execute(args: DiffFilesArgs, session: &Session) -> Result<()> {
    let git = SystemGit::default();
    let ctx = session.context(&git)?;
    let combiner = session.combiner(&git)?;
    write_stdout(&run(&args, &ctx, &combiner)?)
}
