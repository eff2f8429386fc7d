//! Path manipulation utilities for git-meta
//!
//! Two coordinate spaces meet here. Filesystem locations (`Path`/`PathBuf`)
//! come from the user and the working directory; repository paths (`&str`)
//! are what git prints and accepts: relative to a repository root, always
//! `/`-separated, with the root itself written as the empty string.
//!
//! Everything in this module is lexical. Nothing touches the filesystem, so
//! symlinked working directories must be canonicalized by the caller.

use std::path::{Component, Path, PathBuf};

/// Lexically resolve `.` and `..` components.
///
/// `..` at the root of an absolute path stays at the root, matching what the
/// operating system does.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = match out.components().next_back() {
                    Some(Component::Normal(_)) => out.pop(),
                    Some(Component::RootDir) | Some(Component::Prefix(_)) => true,
                    _ => false,
                };
                if !popped {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Resolve a user supplied path against the directory it was given in.
pub fn resolve(cwd: &Path, path: &str) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        normalize(path)
    } else {
        normalize(&cwd.join(path))
    }
}

/// Express an absolute location as a repository path under `root`.
///
/// Returns `None` when `location` is not at or under `root`.
pub fn to_repo_path(root: &Path, location: &Path) -> Option<String> {
    let relative = normalize(location)
        .strip_prefix(normalize(root))
        .ok()?
        .to_path_buf();
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Some(parts.join("/"))
}

/// Strip `prefix` from `path` on a component boundary.
///
/// `"foo"` is a prefix of `"foo"` and `"foo/bar"` but not of `"foobar"`. The
/// empty prefix (the repository root) is a prefix of everything.
pub fn strip_component_prefix<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
    if prefix.is_empty() {
        return Some(path);
    }
    let rest = path.strip_prefix(prefix)?;
    if rest.is_empty() {
        Some(rest)
    } else {
        rest.strip_prefix('/')
    }
}

/// True when `path` is `ancestor` or lies beneath it.
pub fn is_within(path: &str, ancestor: &str) -> bool {
    strip_component_prefix(path, ancestor).is_some()
}

/// Join a mount prefix and a repository path.
///
/// Either side may be the root (empty or `.`), in which case the other side
/// is returned unchanged.
pub fn join_repo_path(prefix: &str, path: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    if path.is_empty() || path == "." {
        return prefix.to_string();
    }
    if prefix.is_empty() || prefix == "." {
        return path.to_string();
    }
    format!("{}/{}", prefix, path)
}

/// Relative path from directory `from` to `to`, both repository paths.
///
/// The result may climb with `..`. Equal paths yield `.`.
pub fn relative_repo_path(from: &str, to: &str) -> String {
    let from_parts: Vec<&str> = from.split('/').filter(|p| !p.is_empty()).collect();
    let to_parts: Vec<&str> = to.split('/').filter(|p| !p.is_empty()).collect();
    let common = from_parts
        .iter()
        .zip(&to_parts)
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<&str> = vec![".."; from_parts.len() - common];
    parts.extend(&to_parts[common..]);
    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}
