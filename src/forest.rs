//! # Repository Forest
//!
//! A read-only view of one meta-repository and the submodules recorded in its
//! index, together with which of them are open (have a working tree that can
//! be queried on its own).
//!
//! Submodule names are `/`-separated repository paths relative to the meta
//! root and double as mount points. Names may nest: with `a` and `a/b` both
//! declared, anything under `a/b` belongs to `a/b`, so lookups always pick the
//! longest matching name.
//!
//! A forest is built once per command, either by
//! [`discover_forest`](crate::git::discover_forest) or directly by tests and
//! embedding tools, and is never mutated afterwards.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use crate::defaults::{META_REPO_KEY, MODULES_FILE_NAME};
use crate::path::{is_within, relative_repo_path, strip_component_prefix};

/// One meta-repository and its declared submodules.
#[derive(Debug, Clone)]
pub struct RepositoryForest {
    root: PathBuf,
    /// Submodule name to open state.
    submodules: BTreeMap<String, bool>,
}

impl RepositoryForest {
    /// Creates a forest rooted at the meta-repository working tree `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            submodules: BTreeMap::new(),
        }
    }

    /// Builder form of [`add_submodule`](Self::add_submodule).
    pub fn with_submodule(mut self, name: &str, open: bool) -> Self {
        self.add_submodule(name, open);
        self
    }

    /// Declares a submodule. Re-declaring a name replaces its open state.
    pub fn add_submodule(&mut self, name: &str, open: bool) {
        let name = name.trim_matches('/').to_string();
        if !name.is_empty() {
            self.submodules.insert(name, open);
        }
    }

    /// The meta-repository working tree.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Every declared submodule, open or closed, in name order.
    pub fn submodule_names(&self) -> impl Iterator<Item = &str> {
        self.submodules.keys().map(String::as_str)
    }

    /// The submodules that have a working tree, in name order.
    pub fn open_submodules(&self) -> Vec<&str> {
        self.submodules
            .iter()
            .filter(|(_, open)| **open)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// True when `name` is a declared submodule.
    pub fn contains(&self, name: &str) -> bool {
        self.submodules.contains_key(name)
    }

    /// True when `name` is a declared, open submodule.
    pub fn is_open(&self, name: &str) -> bool {
        self.submodules.get(name).copied().unwrap_or(false)
    }

    /// Working tree of a repository key: the meta root for `"."`, the mount
    /// directory for an open submodule, and `None` for anything that cannot
    /// be queried.
    pub fn working_tree(&self, key: &str) -> Option<PathBuf> {
        if key == META_REPO_KEY {
            Some(self.root.clone())
        } else if self.is_open(key) {
            Some(self.root.join(key))
        } else {
            None
        }
    }

    /// The submodule owning a meta-relative repository path: the longest
    /// declared name that is a component prefix of `path` (or equal to it).
    pub fn owning_submodule(&self, path: &str) -> Option<&str> {
        self.submodules
            .keys()
            .filter(|name| is_within(path, name))
            .max_by_key(|name| name.len())
            .map(String::as_str)
    }

    /// Open submodules whose mount points lie strictly beneath `dir`
    /// (a meta-relative repository path, `""` for the root).
    pub fn open_submodules_under<'a>(&'a self, dir: &'a str) -> impl Iterator<Item = &'a str> {
        self.submodules
            .iter()
            .filter(move |(name, open)| {
                **open && name.as_str() != dir && is_within(name, dir)
            })
            .map(|(name, _)| name.as_str())
    }

    /// Paths that must never be reported as results of the query run in the
    /// repository `key`, expressed relative to that repository's root.
    ///
    /// For the meta-repository this is every submodule mount point plus the
    /// submodule configuration file. A submodule that itself contains nested
    /// submodules gets the same treatment for those, relative to its root.
    pub fn exclusion_set(&self, key: &str) -> ExclusionSet {
        let mut names = BTreeSet::new();
        if key == META_REPO_KEY {
            names.extend(self.submodules.keys().cloned());
            names.insert(MODULES_FILE_NAME.to_string());
        } else {
            for name in self.submodules.keys() {
                if let Some(rest) = strip_component_prefix(name, key) {
                    if !rest.is_empty() {
                        names.insert(rest.to_string());
                    }
                }
            }
            if !names.is_empty() {
                names.insert(MODULES_FILE_NAME.to_string());
            }
        }
        ExclusionSet { names }
    }
}

/// Repository paths excluded from one repository's query results.
///
/// Matching is exact: a record is dropped only when its path equals an
/// excluded name, never because it merely starts with one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSet {
    names: BTreeSet<String>,
}

impl ExclusionSet {
    /// Creates an exclusion set from explicit names.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// True when `path` is excluded.
    pub fn contains(&self, path: &str) -> bool {
        self.names.contains(path)
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Re-expresses the set relative to `run_dir`, for queries whose output is
    /// relative to the directory they run in rather than the repository root.
    pub fn rebase(&self, run_dir: &str) -> ExclusionSet {
        if run_dir.is_empty() {
            return self.clone();
        }
        let names = self
            .names
            .iter()
            .map(|name| relative_repo_path(run_dir, name))
            .collect();
        ExclusionSet { names }
    }
}
