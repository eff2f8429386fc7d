//! # Path Classification
//!
//! Partitions a flat list of user supplied paths by the repository that owns
//! each one, rewriting every path into that repository's own coordinates.
//!
//! ## Algorithm
//!
//! For each path:
//!
//! 1. Resolve it against the invocation directory to an absolute location,
//!    then express that location relative to the meta root. Paths that leave
//!    the meta root are rejected with [`Error::OutsideRepository`].
//! 2. Find the longest declared submodule name that is a component prefix of
//!    the meta-relative path (`"foo"` never matches `"foobar"`).
//! 3. With an open owner, bucket the remainder under the submodule name. With
//!    no owner, bucket the whole path under `"."`.
//! 4. With a closed owner, apply the caller's [`ClosedSubmodulePolicy`].
//!
//! A path that names a repository root (an open submodule's mount point, or
//! the meta root itself) creates the bucket without adding a path to it,
//! meaning "query that repository unfiltered". Such a request covers every
//! other path given for the same repository, so the bucket ends up empty.
//!
//! Output lists carry no ordering guarantee relative to the input.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use log::{debug, warn};

use crate::defaults::META_REPO_KEY;
use crate::error::{Error, Result};
use crate::forest::RepositoryForest;
use crate::path::{resolve, strip_component_prefix, to_repo_path};

/// Repository key (`"."` or a submodule name) to the paths to query there,
/// relative to that repository's root. An empty list means "unfiltered".
pub type PathMap = BTreeMap<String, Vec<String>>;

/// What to do with a path that falls inside a submodule that is not open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClosedSubmodulePolicy {
    /// Leave the path out of every bucket. Used by read-only queries, where
    /// a closed submodule simply has nothing to report.
    #[default]
    Drop,
    /// Fail with [`Error::ClosedSubmodule`]. Used by commands that must
    /// inspect every requested path, such as staging.
    Fail,
}

/// Knobs for [`classify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifyOptions {
    pub closed: ClosedSubmodulePolicy,
    /// When a path is a directory containing open submodule mount points,
    /// also give each of those submodules an unfiltered bucket.
    pub expand_open_submodules: bool,
}

impl ClassifyOptions {
    /// Options for read-only queries fanned out across the forest.
    pub fn query() -> Self {
        Self {
            closed: ClosedSubmodulePolicy::Drop,
            expand_open_submodules: true,
        }
    }

    /// Options for commands that modify the index of every repository they
    /// touch and so must not silently skip anything.
    pub fn strict() -> Self {
        Self {
            closed: ClosedSubmodulePolicy::Fail,
            expand_open_submodules: false,
        }
    }
}

impl Default for ClassifyOptions {
    fn default() -> Self {
        Self::query()
    }
}

/// Partition `paths`, given relative to `cwd`, across the repositories of
/// `forest`.
pub fn classify<S: AsRef<str>>(
    cwd: &Path,
    paths: &[S],
    forest: &RepositoryForest,
    options: ClassifyOptions,
) -> Result<PathMap> {
    let mut map = PathMap::new();
    let mut unfiltered = BTreeSet::new();

    for raw in paths {
        let raw = raw.as_ref();
        let location = resolve(cwd, raw);
        let meta_path =
            to_repo_path(forest.root(), &location).ok_or_else(|| Error::OutsideRepository {
                path: raw.to_string(),
                root: forest.root().to_path_buf(),
            })?;

        let (key, local) = match forest.owning_submodule(&meta_path) {
            Some(sub) if forest.is_open(sub) => {
                let local = strip_component_prefix(&meta_path, sub).unwrap_or_default();
                (sub.to_string(), local.to_string())
            }
            Some(sub) => match options.closed {
                ClosedSubmodulePolicy::Drop => {
                    warn!("Skipping '{}': submodule '{}' is not open", raw, sub);
                    continue;
                }
                ClosedSubmodulePolicy::Fail => {
                    return Err(Error::ClosedSubmodule {
                        path: raw.to_string(),
                        submodule: sub.to_string(),
                    });
                }
            },
            None => (META_REPO_KEY.to_string(), meta_path.clone()),
        };

        debug!("'{}' maps to '{}' in repository '{}'", raw, local, key);
        let bucket = map.entry(key.clone()).or_default();
        if local.is_empty() {
            unfiltered.insert(key);
        } else {
            bucket.push(local);
        }

        if options.expand_open_submodules {
            for sub in forest.open_submodules_under(&meta_path) {
                map.entry(sub.to_string()).or_default();
                unfiltered.insert(sub.to_string());
            }
        }
    }

    for key in unfiltered {
        if let Some(bucket) = map.get_mut(&key) {
            bucket.clear();
        }
    }
    Ok(map)
}
