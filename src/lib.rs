//! # git-meta Library
//!
//! This library runs git queries across a meta-repository and the submodules
//! nested inside it, so that a forest of repositories can be inspected as if
//! it were one. It is designed to be used by the `git-meta` command-line tool
//! but can also be embedded in other tools that need the same view.
//!
//! ## Quick Example
//!
//! ```
//! use git_meta::classify::{classify, ClassifyOptions};
//! use git_meta::forest::RepositoryForest;
//! use std::path::Path;
//!
//! let forest = RepositoryForest::new("/work/meta")
//!     .with_submodule("libs/core", true)
//!     .with_submodule("libs/legacy", false);
//!
//! let paths = ["README.md", "libs/core/src/lib.rs", "libs/legacy/x.c"];
//! let map = classify(Path::new("/work/meta"), &paths, &forest, ClassifyOptions::query()).unwrap();
//!
//! assert_eq!(map["."], vec!["README.md"]);
//! assert_eq!(map["libs/core"], vec!["src/lib.rs"]);
//! // Paths inside closed submodules are dropped.
//! assert!(!map.contains_key("libs/legacy"));
//! ```
//!
//! ## Core Concepts
//!
//! - **Forest (`forest`)**: the meta-repository root, its submodules, and
//!   which of them are open. Also decides which paths a repository's results
//!   must never contain.
//! - **Classification (`classify`)**: splits user supplied paths by the
//!   repository that owns them, in that repository's coordinates.
//! - **Scope (`scope`)**: for listing queries, the single repository the
//!   invocation directory belongs to and the submodules visible beneath it.
//! - **Records (`record`)**: git's raw diff format, parsed and serialized.
//! - **Formats (`format`)**: per-output-shape parsing, path lifting and
//!   merging.
//! - **Distribution (`combine`)**: runs one query in many repositories in
//!   parallel and merges the results.
//! - **Git (`git`)**: the `GitOperations` seam and forest discovery.
//!
//! ## Execution Flow
//!
//! 1.  **Discovery**: build the forest from the meta index.
//! 2.  **Planning**: classify paths (or resolve the scope) into query targets.
//! 3.  **Fan-out**: run the query in every target repository.
//! 4.  **Parsing**: parse each result and drop excluded paths.
//! 5.  **Lifting**: prefix submodule paths with their mount points.
//! 6.  **Merge**: serialize everything into one output stream.

pub mod classify;
pub mod combine;
pub mod defaults;
pub mod error;
pub mod forest;
pub mod format;
pub mod git;
pub mod path;
pub mod record;
pub mod scope;

#[cfg(test)]
mod path_proptest;
