//! # Update-Index Command Implementation
//!
//! Stages files in whichever repository owns them. Unlike the read-only
//! queries, a file inside a submodule that is not open is an error rather
//! than something to skip.

use std::io::Read;

use anyhow::{Context, Result};
use clap::Args;
use log::debug;

use git_meta::classify::ClassifyOptions;
use git_meta::combine::{CommandCombiner, MetaContext, Query};
use git_meta::format::OpaqueText;
use git_meta::git::SystemGit;

use super::Session;

/// Stage files in the repositories that own them
#[derive(Args, Debug, Clone, Default)]
pub struct UpdateIndexArgs {
    /// Add files that are not in the index yet.
    #[arg(long)]
    pub add: bool,

    /// Remove files that are missing from the working tree.
    #[arg(long)]
    pub remove: bool,

    /// Read paths from standard input instead of the command line.
    #[arg(long)]
    pub stdin: bool,

    /// With --stdin, paths are separated by NUL instead of newline.
    #[arg(short = 'z', requires = "stdin")]
    pub null_terminated: bool,

    /// Files to stage.
    #[arg(value_name = "FILE")]
    pub files: Vec<String>,
}

impl UpdateIndexArgs {
    fn query(&self) -> Query {
        let mut args = vec!["-q"];
        if self.add {
            args.push("--add");
        }
        if self.remove {
            args.push("--remove");
        }
        Query::new("update-index", args)
    }
}

/// Split `--stdin` input into paths.
pub fn parse_path_list(input: &str, null_terminated: bool) -> Vec<String> {
    let separator = if null_terminated { '\0' } else { '\n' };
    input
        .split(separator)
        .map(|path| {
            if null_terminated {
                path
            } else {
                path.trim_end_matches('\r')
            }
        })
        .filter(|path| !path.is_empty())
        .map(str::to_string)
        .collect()
}

/// Stage `files`, one `update-index` invocation per owning repository.
pub fn run(
    args: &UpdateIndexArgs,
    files: &[String],
    ctx: &MetaContext,
    combiner: &CommandCombiner,
) -> Result<()> {
    if files.is_empty() {
        debug!("No files to stage");
        return Ok(());
    }
    combiner.run(ctx, &args.query(), &OpaqueText, files, ClassifyOptions::strict())?;
    Ok(())
}

/// Execute the `update-index` command.
pub fn execute(args: UpdateIndexArgs, session: &Session) -> Result<()> {
    let mut files = args.files.clone();
    if args.stdin {
        let mut input = String::new();
        std::io::stdin()
            .read_to_string(&mut input)
            .context("Failed to read paths from standard input")?;
        files.extend(parse_path_list(&input, args.null_terminated));
    }

    let git = SystemGit::default();
    let ctx = session.context(&git)?;
    let combiner = session.combiner(&git)?;
    run(&args, &files, &ctx, &combiner)
}
