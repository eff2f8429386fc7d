//! # Diff-Index Command Implementation
//!
//! Compares a tree with the working tree or index of every repository in the
//! forest, as if the whole forest were one repository.
//!
//! Raw output is parsed and re-rooted record by record. Stat and patch output
//! is passed through per repository. When several output kinds are asked
//! for, they are printed in the order raw, stat, patch.

use anyhow::Result;
use clap::Args;

use git_meta::classify::ClassifyOptions;
use git_meta::combine::{CommandCombiner, MetaContext, Query};
use git_meta::format::{OpaqueText, RecordList};
use git_meta::git::SystemGit;

use super::{terminate, terminate_text, write_stdout, Session};

/// Compare a tree to the working tree or index across all repositories
#[derive(Args, Debug, Clone, Default)]
pub struct DiffIndexArgs {
    /// Compare the tree to the index only, ignoring the working tree.
    #[arg(long)]
    pub cached: bool,

    /// Terminate records with NUL and do not quote paths.
    #[arg(short = 'z')]
    pub null_terminated: bool,

    /// Only report changes of the given kinds (for example `AM`).
    #[arg(long, value_name = "FILTER")]
    pub diff_filter: Option<String>,

    /// Detect renames, optionally with a similarity threshold.
    #[arg(
        short = 'M',
        long = "find-renames",
        value_name = "N",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = ""
    )]
    pub find_renames: Option<String>,

    /// Print raw diff records (the default).
    #[arg(long)]
    pub raw: bool,

    /// Print a patch.
    #[arg(short = 'p', long)]
    pub patch: bool,

    /// Print a diffstat.
    #[arg(long)]
    pub stat: bool,

    /// Print a diffstat followed by a patch.
    #[arg(long)]
    pub patch_with_stat: bool,

    /// Print raw records followed by a patch.
    #[arg(long)]
    pub patch_with_raw: bool,

    /// The tree to compare against.
    #[arg(value_name = "TREE-ISH")]
    pub tree_ish: String,

    /// Limit the comparison to these paths.
    #[arg(value_name = "PATH")]
    pub paths: Vec<String>,
}

impl DiffIndexArgs {
    fn wants_patch(&self) -> bool {
        self.patch || self.patch_with_stat || self.patch_with_raw
    }

    fn wants_stat(&self) -> bool {
        self.stat || self.patch_with_stat
    }

    fn wants_raw(&self) -> bool {
        self.raw || self.patch_with_raw || !(self.wants_patch() || self.wants_stat())
    }

    /// Options shared by every output kind.
    fn common_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if self.cached {
            args.push("--cached".to_string());
        }
        if let Some(filter) = &self.diff_filter {
            args.push(format!("--diff-filter={}", filter));
        }
        match self.find_renames.as_deref() {
            Some("") => args.push("-M".to_string()),
            Some(threshold) => args.push(format!("-M{}", threshold)),
            None => {}
        }
        args
    }

    fn query(&self, mode: &[&str]) -> Query {
        let mut args = self.common_args();
        args.extend(mode.iter().map(|arg| arg.to_string()));
        args.push(self.tree_ish.clone());
        Query::new("diff-index", args)
    }
}

/// Build the combined output for `args`.
pub fn run(args: &DiffIndexArgs, ctx: &MetaContext, combiner: &CommandCombiner) -> Result<String> {
    let options = ClassifyOptions::query();
    let mut output = String::new();

    if args.wants_raw() {
        let raw = combiner.run(
            ctx,
            &args.query(&["--raw", "-z"]),
            &RecordList::new(args.null_terminated),
            &args.paths,
            options,
        )?;
        output.push_str(&terminate(raw, args.null_terminated));
    }
    if args.wants_stat() {
        let stat = combiner.run(ctx, &args.query(&["--stat"]), &OpaqueText, &args.paths, options)?;
        output.push_str(&terminate_text(stat));
    }
    if args.wants_patch() {
        let patch = combiner.run(ctx, &args.query(&["-p"]), &OpaqueText, &args.paths, options)?;
        output.push_str(&terminate_text(patch));
    }
    Ok(output)
}

/// Execute the `diff-index` command.
pub fn execute(args: DiffIndexArgs, session: &Session) -> Result<()> {
    let git = SystemGit::default();
    let ctx = session.context(&git)?;
    let combiner = session.combiner(&git)?;
    let output = run(&args, &ctx, &combiner)?;
    write_stdout(&output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{context, strings, RecordingGit};
    use std::path::PathBuf;

    fn args(tree_ish: &str) -> DiffIndexArgs {
        DiffIndexArgs {
            tree_ish: tree_ish.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_output_kinds() {
        let plain = args("HEAD");
        assert!(plain.wants_raw() && !plain.wants_stat() && !plain.wants_patch());

        let patch = DiffIndexArgs {
            patch: true,
            ..args("HEAD")
        };
        assert!(!patch.wants_raw() && patch.wants_patch());

        let both = DiffIndexArgs {
            patch_with_raw: true,
            ..args("HEAD")
        };
        assert!(both.wants_raw() && both.wants_patch());
    }

    #[test]
    fn test_query_arguments() {
        let args = DiffIndexArgs {
            cached: true,
            diff_filter: Some("AM".to_string()),
            find_renames: Some("50%".to_string()),
            ..args("v1.0")
        };
        assert_eq!(
            args.query(&["--raw", "-z"]).args,
            strings(&["--cached", "--diff-filter=AM", "-M50%", "--raw", "-z", "v1.0"])
        );
    }

    #[test]
    fn test_bare_rename_flag() {
        let args = DiffIndexArgs {
            find_renames: Some(String::new()),
            ..args("HEAD")
        };
        assert_eq!(args.common_args(), strings(&["-M"]));
    }

    #[test]
    fn test_raw_output_across_forest() {
        let git = RecordingGit::default()
            .with_output("/meta", ":000000 100644 0000000 1111111 A\0f1\0:160000 160000 a b M\0s\0")
            .with_output("/meta/s", ":100644 000000 2222222 0000000 D\0README.md\0");
        let combiner = CommandCombiner::new(&git);

        let output = run(&args("HEAD"), &context(""), &combiner).unwrap();

        assert_eq!(
            output,
            ":000000 100644 0000000 1111111 A\tf1\n:100644 000000 2222222 0000000 D\ts/README.md\n"
        );
    }

    #[test]
    fn test_raw_then_stat_then_patch() {
        let git = RecordingGit::default();
        let combiner = CommandCombiner::new(&git);
        let args = DiffIndexArgs {
            raw: true,
            patch_with_stat: true,
            paths: strings(&["s/file"]),
            ..args("HEAD")
        };

        run(&args, &context(""), &combiner).unwrap();

        let calls = git.calls();
        assert_eq!(calls.len(), 3);
        assert!(calls.iter().all(|(dir, cmd, _)| {
            dir == &PathBuf::from("/meta/s") && cmd == "diff-index"
        }));
        assert!(calls
            .iter()
            .any(|(_, _, a)| a == &strings(&["--stat", "HEAD", "--", "file"])));
        assert!(calls
            .iter()
            .any(|(_, _, a)| a == &strings(&["-p", "HEAD", "--", "file"])));
    }

    #[test]
    fn test_stat_blocks_are_concatenated() {
        let git = RecordingGit::default().with_output("/meta/t", " a | 1 +\n");
        let combiner = CommandCombiner::new(&git);
        let args = DiffIndexArgs {
            stat: true,
            ..args("HEAD")
        };

        let output = run(&args, &context(""), &combiner).unwrap();

        assert_eq!(output, " a | 1 +\n");
    }
}
