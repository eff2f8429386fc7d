//! # Git Operations
//!
//! The only place git-meta runs external processes. Everything else talks to
//! the [`GitOperations`] trait, so tests can substitute canned query output
//! and never need a real repository.
//!
//! This module also discovers a [`RepositoryForest`] from disk for the
//! command-line tool.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::debug;

use crate::defaults::{git_program, GITLINK_MODE};
use crate::error::{Error, Result};
use crate::forest::RepositoryForest;
use crate::path::join_repo_path;

/// Trait for git queries - allows mocking in tests
pub trait GitOperations: Send + Sync {
    /// Runs `git <command> <args>` in `workdir` and returns its stdout.
    ///
    /// A non-zero exit status is an error carrying the command's stderr.
    fn run(&self, command: &str, args: &[String], workdir: &Path) -> Result<String>;
}

/// The default implementation of `GitOperations`, which runs the system's
/// `git` executable.
///
/// This uses whatever git configuration, credential helpers and hooks the
/// user has set up, exactly as running git by hand would.
#[derive(Debug, Clone)]
pub struct SystemGit {
    program: String,
}

impl SystemGit {
    /// Uses `program` as the git executable.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for SystemGit {
    /// Uses `GIT_META_GIT`, falling back to `git` on the `PATH`.
    fn default() -> Self {
        Self::new(git_program())
    }
}

impl GitOperations for SystemGit {
    fn run(&self, command: &str, args: &[String], workdir: &Path) -> Result<String> {
        let description = describe(command, args);
        debug!("Running git {} in {}", description, workdir.display());

        let output = Command::new(&self.program)
            .arg(command)
            .args(args)
            .current_dir(workdir)
            .output()
            .map_err(|e| Error::GitCommand {
                command: description.clone(),
                repo: workdir.display().to_string(),
                stderr: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::GitCommand {
                command: description,
                repo: workdir.display().to_string(),
                stderr: stderr.trim_end().to_string(),
            });
        }

        String::from_utf8(output.stdout).map_err(|source| Error::Utf8 {
            repo: workdir.display().to_string(),
            source,
        })
    }
}

/// Human readable form of a query, for logs and error messages.
pub fn describe(command: &str, args: &[String]) -> String {
    if args.is_empty() {
        command.to_string()
    } else {
        format!("{} {}", command, args.join(" "))
    }
}

/// Paths of submodule (gitlink) entries in `ls-files -z --stage` output.
///
/// Each entry is `<mode> <object> <stage>\t<path>`; unmerged submodules
/// appear once per stage but are reported once.
pub fn parse_gitlinks(output: &str) -> Vec<String> {
    let mut names = BTreeSet::new();
    for entry in output.split('\0').filter(|e| !e.is_empty()) {
        let Some((info, path)) = entry.split_once('\t') else {
            continue;
        };
        if info.split(' ').next() == Some(GITLINK_MODE) {
            names.insert(path.to_string());
        }
    }
    names.into_iter().collect()
}

/// Top of the working tree containing `cwd`.
pub fn show_toplevel(git: &dyn GitOperations, cwd: &Path) -> Result<PathBuf> {
    let args = vec!["--show-toplevel".to_string()];
    let top = git.run("rev-parse", &args, cwd)?;
    Ok(PathBuf::from(top.trim_end_matches(['\n', '\r'])))
}

/// Working tree of the repository that records `toplevel` as a submodule,
/// if any.
pub fn show_superproject(git: &dyn GitOperations, toplevel: &Path) -> Result<Option<PathBuf>> {
    let args = vec!["--show-superproject-working-tree".to_string()];
    let output = git.run("rev-parse", &args, toplevel)?;
    let superproject = output.trim_end_matches(['\n', '\r']);
    Ok((!superproject.is_empty()).then(|| PathBuf::from(superproject)))
}

/// The outermost working tree containing `cwd`.
///
/// Starting inside an open submodule still yields the meta-repository.
pub fn meta_root(git: &dyn GitOperations, cwd: &Path) -> Result<PathBuf> {
    let mut root = show_toplevel(git, cwd)?;
    while let Some(superproject) = show_superproject(git, &root)? {
        if superproject == root {
            break;
        }
        debug!("{} is a submodule of {}", root.display(), superproject.display());
        root = superproject;
    }
    Ok(root)
}

/// Build the forest for the meta-repository containing `cwd`.
///
/// Submodules are the gitlink entries of the meta index; one is open when its
/// mount point holds a `.git` directory or file. Open submodules are searched
/// for nested submodules in turn.
pub fn discover_forest(git: &dyn GitOperations, cwd: &Path) -> Result<RepositoryForest> {
    let root = meta_root(git, cwd)?;
    let mut forest = RepositoryForest::new(root.clone());
    add_submodules(git, &root, "", &mut forest)?;
    debug!(
        "Discovered {} submodule(s), {} open, under {}",
        forest.submodule_names().count(),
        forest.open_submodules().len(),
        root.display()
    );
    Ok(forest)
}

fn add_submodules(
    git: &dyn GitOperations,
    root: &Path,
    prefix: &str,
    forest: &mut RepositoryForest,
) -> Result<()> {
    let args = vec!["-z".to_string(), "--stage".to_string()];
    let workdir = if prefix.is_empty() {
        root.to_path_buf()
    } else {
        root.join(prefix)
    };
    let listing = git.run("ls-files", &args, &workdir)?;

    for local in parse_gitlinks(&listing) {
        let name = join_repo_path(prefix, &local);
        let open = root.join(&name).join(".git").exists();
        forest.add_submodule(&name, open);
        if open {
            add_submodules(git, root, &name, forest)?;
        }
    }
    Ok(())
}
