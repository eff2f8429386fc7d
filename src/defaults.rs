//! Default values for git-meta.
//!
//! This module provides centralized constants used across the library and
//! the command-line tool, ensuring consistency and avoiding duplication.

/// Name of the file in which git records submodule configuration.
///
/// It is repository-linkage bookkeeping, never real content, so it is
/// excluded from meta-repository results.
pub const MODULES_FILE_NAME: &str = ".gitmodules";

/// File mode git uses for submodule (gitlink) entries in the index.
pub const GITLINK_MODE: &str = "160000";

/// Repository key of the meta-repository in path maps and result buckets.
pub const META_REPO_KEY: &str = ".";

/// The git executable used when `GIT_META_GIT` is not set.
pub const DEFAULT_GIT_PROGRAM: &str = "git";

/// Environment variable selecting the git executable.
pub const ENV_GIT_PROGRAM: &str = "GIT_META_GIT";

/// Environment variable selecting the number of concurrent queries.
pub const ENV_JOBS: &str = "GIT_META_JOBS";

/// Returns the git executable to run, honouring `GIT_META_GIT`.
pub fn git_program() -> String {
    std::env::var(ENV_GIT_PROGRAM)
        .ok()
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_GIT_PROGRAM.to_string())
}
