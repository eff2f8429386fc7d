//! # Check-Attr Command Implementation
//!
//! Reports gitattributes for files anywhere in the forest. Each file is
//! asked about in the repository that owns it, so a submodule's own
//! `.gitattributes` applies to its files.
//!
//! Accepted forms mirror `git check-attr`:
//!
//! - `check-attr <attr>... -- <path>...`
//! - `check-attr <attr> <path>...`
//! - `check-attr -a <path>...`

use anyhow::{bail, Result};
use clap::Args;

use git_meta::classify::{ClassifyOptions, ClosedSubmodulePolicy};
use git_meta::combine::{CommandCombiner, MetaContext, Query};
use git_meta::format::AttributeList;
use git_meta::git::SystemGit;

use super::{terminate, write_stdout, Session};

/// Show gitattributes for files across all repositories
#[derive(Args, Debug, Clone, Default)]
pub struct CheckAttrArgs {
    /// Report every attribute set on each file.
    #[arg(short = 'a', long)]
    pub all: bool,

    /// Consult `.gitattributes` in the index only.
    #[arg(long)]
    pub cached: bool,

    /// Separate fields and records with NUL and do not quote paths.
    #[arg(short = 'z')]
    pub null_terminated: bool,

    /// Attributes followed by paths (see above for the accepted forms).
    #[arg(value_name = "ATTR|PATH")]
    pub items: Vec<String>,

    /// Paths, when attributes were given before `--`.
    #[arg(last = true, value_name = "PATH")]
    pub paths: Vec<String>,
}

impl CheckAttrArgs {
    /// Split the positional arguments into attributes and paths.
    fn split(&self) -> Result<(Vec<String>, Vec<String>)> {
        let (attributes, paths) = if self.all {
            let paths = self.items.iter().chain(&self.paths).cloned().collect();
            (Vec::new(), paths)
        } else if !self.paths.is_empty() {
            (self.items.clone(), self.paths.clone())
        } else {
            match self.items.split_first() {
                Some((attribute, paths)) => (vec![attribute.clone()], paths.to_vec()),
                None => (Vec::new(), Vec::new()),
            }
        };

        if !self.all && attributes.is_empty() {
            bail!("No attribute specified");
        }
        if paths.is_empty() {
            bail!("No file specified");
        }
        Ok((attributes, paths))
    }

    fn query(&self, attributes: Vec<String>) -> Query {
        let mut args = vec!["-z".to_string()];
        if self.cached {
            args.push("--cached".to_string());
        }
        if self.all {
            args.push("--all".to_string());
        }
        args.extend(attributes);
        Query::new("check-attr", args)
    }
}

pub fn run(args: &CheckAttrArgs, ctx: &MetaContext, combiner: &CommandCombiner) -> Result<String> {
    let (attributes, paths) = args.split()?;
    // check-attr needs explicit paths, so directories are not expanded.
    let options = ClassifyOptions {
        closed: ClosedSubmodulePolicy::Drop,
        expand_open_submodules: false,
    };
    let output = combiner.run(
        ctx,
        &args.query(attributes),
        &AttributeList::new(args.null_terminated),
        &paths,
        options,
    )?;
    Ok(terminate(output, args.null_terminated))
}

/// Execute the `check-attr` command.
pub fn execute(args: CheckAttrArgs, session: &Session) -> Result<()> {
    let git = SystemGit::default();
    let ctx = session.context(&git)?;
    let combiner = session.combiner(&git)?;
    write_stdout(&run(&args, &ctx, &combiner)?)
}
