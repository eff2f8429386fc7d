//! # Ls-Files Command Implementation
//!
//! Lists files the way `git ls-files` would from the invocation directory,
//! descending into open submodules mounted beneath it. Submodule mount
//! points and `.gitmodules` never appear in the listing.

use anyhow::Result;
use clap::Args;

use git_meta::combine::{CommandCombiner, MetaContext, Query};
use git_meta::format::FileList;
use git_meta::git::SystemGit;

use super::{terminate, write_stdout, Session};

/// List files in the current repository and the submodules beneath it
#[derive(Args, Debug, Clone, Default)]
pub struct LsFilesArgs {
    /// Terminate entries with NUL and do not quote paths.
    #[arg(short = 'z')]
    pub null_terminated: bool,

    /// Show cached files (the default).
    #[arg(short = 'c', long)]
    pub cached: bool,

    /// Show deleted files.
    #[arg(short = 'd', long)]
    pub deleted: bool,

    /// Show modified files.
    #[arg(short = 'm', long)]
    pub modified: bool,

    /// Show untracked files.
    #[arg(short = 'o', long)]
    pub others: bool,

    /// Apply the standard git exclusions to untracked files.
    #[arg(long)]
    pub exclude_standard: bool,

    /// Only list files matching these paths.
    #[arg(value_name = "PATH")]
    pub paths: Vec<String>,
}

impl LsFilesArgs {
    fn query(&self) -> Query {
        let flags = [
            (self.cached, "--cached"),
            (self.deleted, "--deleted"),
            (self.modified, "--modified"),
            (self.others, "--others"),
            (self.exclude_standard, "--exclude-standard"),
        ];
        let args = std::iter::once("-z").chain(
            flags
                .into_iter()
                .filter(|(set, _)| *set)
                .map(|(_, flag)| flag),
        );
        Query::new("ls-files", args)
    }
}

pub fn run(args: &LsFilesArgs, ctx: &MetaContext, combiner: &CommandCombiner) -> Result<String> {
    let output = combiner.run_scoped(
        ctx,
        &args.query(),
        &FileList::new(args.null_terminated),
        &args.paths,
    )?;
    Ok(terminate(output, args.null_terminated))
}

/// Execute the `ls-files` command.
pub fn execute(args: LsFilesArgs, session: &Session) -> Result<()> {
    let git = SystemGit::default();
    let ctx = session.context(&git)?;
    let combiner = session.combiner(&git)?;
    write_stdout(&run(&args, &ctx, &combiner)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{context, strings, RecordingGit};
    use std::path::PathBuf;

    #[test]
    fn test_query_flags() {
        let args = LsFilesArgs {
            others: true,
            exclude_standard: true,
            ..Default::default()
        };
        assert_eq!(
            args.query().args,
            strings(&["-z", "--others", "--exclude-standard"])
        );
        assert_eq!(LsFilesArgs::default().query().args, strings(&["-z"]));
    }

    #[test]
    fn test_listing_from_root() {
        let git = RecordingGit::default()
            .with_output("/meta", ".gitmodules\0README.md\0closed\0s\0t\0")
            .with_output("/meta/s", "README.md\0")
            .with_output("/meta/t", "src/main.rs\0");
        let combiner = CommandCombiner::new(&git);

        let output = run(&LsFilesArgs::default(), &context(""), &combiner).unwrap();

        insta::assert_snapshot!(output.trim_end(), @r"
        README.md
        s/README.md
        t/src/main.rs
        ");
    }

    #[test]
    fn test_listing_inside_submodule() {
        let git = RecordingGit::default()
            .with_output("/meta", "README.md\0")
            .with_output("/meta/s", "README.md\0");
        let combiner = CommandCombiner::new(&git);
        let args = LsFilesArgs {
            null_terminated: true,
            ..Default::default()
        };

        let output = run(&args, &context("s"), &combiner).unwrap();

        assert_eq!(output, "README.md\0");
        let dirs: Vec<PathBuf> = git.calls().into_iter().map(|(dir, _, _)| dir).collect();
        assert_eq!(dirs, vec![PathBuf::from("/meta/s")]);
    }

    #[test]
    fn test_listing_paths_in_subdirectory() {
        let git = RecordingGit::default();
        let combiner = CommandCombiner::new(&git);
        let args = LsFilesArgs {
            paths: strings(&["a", "../b"]),
            ..Default::default()
        };

        run(&args, &context("dir"), &combiner).unwrap();

        assert_eq!(
            git.calls(),
            vec![(
                PathBuf::from("/meta/dir"),
                "ls-files".to_string(),
                strings(&["-z", "--", "a", "../b"])
            )]
        );
    }
}
