//! # Raw Diff Records
//!
//! Parsing and serialization of git's raw diff output, as produced by
//! `diff-index`, `diff-files`, `diff-tree` and `diff --raw`.
//!
//! With `-z`, the output is a sequence of NUL-terminated tokens. Each record
//! is a metadata token (`:<old mode> <new mode> <old sha> <new sha> <status>`)
//! followed by one path token, or two (old then new) when the status letter is
//! a rename or a copy. The arity is only known after reading the metadata, so
//! the parser looks ahead token by token rather than splitting into fixed
//! groups.
//!
//! See <https://git-scm.com/docs/git-diff-index#_raw_output_format>.

use std::borrow::Cow;

use crate::error::{Error, Result};
use crate::forest::ExclusionSet;
use crate::path::join_repo_path;

/// Status letter of a rename record.
pub const RENAME_CODE: char = 'R';

/// Status letter of a copy record.
pub const COPY_CODE: char = 'C';

/// One change entry: metadata plus one or two paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffRecord {
    metadata: String,
    paths: Vec<String>,
}

impl DiffRecord {
    pub fn new(metadata: impl Into<String>, paths: Vec<String>) -> Self {
        Self {
            metadata: metadata.into(),
            paths,
        }
    }

    /// The metadata token, verbatim.
    pub fn metadata(&self) -> &str {
        &self.metadata
    }

    /// The path (or old and new paths for renames and copies).
    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    /// The status letter: the leading character of the last metadata field.
    ///
    /// Git may follow the letter with a similarity score (`R090`), so the
    /// letter is read from the front of the field.
    pub fn status(&self) -> Option<char> {
        status_of(&self.metadata)
    }

    /// Promote the record from submodule-local to meta-relative paths.
    pub fn add_path_parent(&mut self, prefix: &str) {
        for path in &mut self.paths {
            *path = join_repo_path(prefix, path);
        }
    }

    /// Serialize in git's raw format. Fields are NUL-separated with `-z`,
    /// tab-separated (with C-style quoting of paths) otherwise.
    pub fn to_wire(&self, format_z: bool) -> String {
        let mut out = self.metadata.clone();
        for path in &self.paths {
            if format_z {
                out.push('\0');
                out.push_str(path);
            } else {
                out.push('\t');
                out.push_str(&quote_path(path));
            }
        }
        out
    }
}

/// Raw output writes the status as `<letter><score>` (`R090`, `C075`), so the
/// letter is the first character of the last field, not the last one.
fn status_of(metadata: &str) -> Option<char> {
    metadata.split(' ').next_back()?.chars().next()
}

fn path_count(status: char) -> usize {
    if status == RENAME_CODE || status == COPY_CODE {
        2
    } else {
        1
    }
}

/// Parse NUL-delimited raw diff output.
///
/// Empty tokens between records (the trailing delimiter) are skipped. When
/// `exclude` is given, records whose first path is in the set are dropped.
pub fn parse_raw(text: &str, exclude: Option<&ExclusionSet>) -> Result<Vec<DiffRecord>> {
    let mut tokens = text.split('\0');
    let mut records = Vec::new();

    while let Some(metadata) = tokens.next() {
        if metadata.is_empty() {
            continue;
        }
        let status = status_of(metadata).ok_or_else(|| Error::MalformedOutput {
            message: format!("record '{}' has no status letter", metadata),
        })?;

        let count = path_count(status);
        let mut paths = Vec::with_capacity(count);
        for _ in 0..count {
            match tokens.next() {
                Some(path) if !path.is_empty() => paths.push(path.to_string()),
                _ => {
                    return Err(Error::MalformedOutput {
                        message: format!(
                            "record '{}' expects {} path(s) but the output ended",
                            metadata, count
                        ),
                    })
                }
            }
        }
        records.push(DiffRecord::new(metadata, paths));
    }

    if let Some(exclude) = exclude {
        records.retain(|record| !exclude.contains(&record.paths[0]));
    }
    Ok(records)
}

/// Join serialized records, NUL-separated with `-z` and newline-separated
/// otherwise.
pub fn serialize_records(records: &[DiffRecord], format_z: bool) -> String {
    let separator = if format_z { "\0" } else { "\n" };
    records
        .iter()
        .map(|record| record.to_wire(format_z))
        .collect::<Vec<_>>()
        .join(separator)
}

/// Quote a path the way git does for non `-z` output (`core.quotePath`
/// enabled): paths containing a double quote, a backslash, control characters
/// or non-ASCII bytes are wrapped in double quotes with C-style escapes.
pub fn quote_path(path: &str) -> Cow<'_, str> {
    let needs_quoting = path
        .bytes()
        .any(|b| b < 0x20 || b >= 0x7f || b == b'"' || b == b'\\');
    if !needs_quoting {
        return Cow::Borrowed(path);
    }

    let mut out = String::with_capacity(path.len() + 2);
    out.push('"');
    for b in path.bytes() {
        match b {
            0x07 => out.push_str("\\a"),
            0x08 => out.push_str("\\b"),
            b'\t' => out.push_str("\\t"),
            b'\n' => out.push_str("\\n"),
            0x0b => out.push_str("\\v"),
            0x0c => out.push_str("\\f"),
            b'\r' => out.push_str("\\r"),
            b'"' => out.push_str("\\\""),
            b'\\' => out.push_str("\\\\"),
            b if b < 0x20 || b >= 0x7f => out.push_str(&format!("\\{:03o}", b)),
            b => out.push(b as char),
        }
    }
    out.push('"');
    Cow::Owned(out)
}
