//! # Run Scope Resolution
//!
//! Listing queries (`ls-files` and friends) behave like plain git: they
//! report the working tree the command was started in, relative to the
//! starting directory, and nothing from sibling or enclosing repositories.
//!
//! [`resolve_scope`] finds that one repository. [`RunScope::nested`] lists the
//! open submodules mounted beneath the starting directory, which are part of
//! what the user sees there and so are queried too, with their output
//! prefixed by their mount point relative to the starting directory.

use std::path::Path;

use crate::defaults::META_REPO_KEY;
use crate::error::{Error, Result};
use crate::forest::RepositoryForest;
use crate::path::{is_within, normalize, strip_component_prefix, to_repo_path};

/// The repository a listing query runs in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunScope {
    /// `"."` or the name of the open submodule containing the directory.
    pub repo: String,
    /// The directory, relative to the root of `repo`.
    pub run_path: String,
    /// The directory, relative to the meta root.
    pub meta_path: String,
}

/// A submodule queried alongside the scope repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NestedRepository {
    pub name: String,
    /// Mount point relative to the scope directory; prepended to its output.
    pub prefix: String,
}

/// Determine which single repository is in scope from `cwd`.
pub fn resolve_scope(cwd: &Path, forest: &RepositoryForest) -> Result<RunScope> {
    let meta_path =
        to_repo_path(forest.root(), &normalize(cwd)).ok_or_else(|| Error::OutsideRepository {
            path: cwd.display().to_string(),
            root: forest.root().to_path_buf(),
        })?;

    let owner = forest
        .open_submodules()
        .into_iter()
        .filter(|name| is_within(&meta_path, name))
        .max_by_key(|name| name.len());

    let scope = match owner {
        Some(name) => RunScope {
            repo: name.to_string(),
            run_path: strip_component_prefix(&meta_path, name)
                .unwrap_or_default()
                .to_string(),
            meta_path,
        },
        None => RunScope {
            repo: META_REPO_KEY.to_string(),
            run_path: meta_path.clone(),
            meta_path,
        },
    };
    Ok(scope)
}

impl RunScope {
    /// Open submodules mounted strictly beneath the scope directory.
    pub fn nested(&self, forest: &RepositoryForest) -> Vec<NestedRepository> {
        forest
            .open_submodules_under(&self.meta_path)
            .filter(|name| *name != self.repo)
            .map(|name| NestedRepository {
                name: name.to_string(),
                prefix: strip_component_prefix(name, &self.meta_path)
                    .unwrap_or(name)
                    .to_string(),
            })
            .collect()
    }

    /// True when results from repository `key` are visible from this scope.
    pub fn includes(&self, key: &str, forest: &RepositoryForest) -> bool {
        key == self.repo
            || (forest.is_open(key) && key != self.meta_path && is_within(key, &self.meta_path))
    }
}
