//! # Result Formats
//!
//! Every distributed command parses one repository's raw query output, lifts
//! the paths in it into meta-repository coordinates, and finally merges the
//! per-repository results into one output stream. [`ResultFormat`] is that
//! contract; each implementation owns one output shape:
//!
//! - [`RecordList`]: raw diff records (`diff-index`, `diff-files`).
//! - [`FileList`]: bare paths (`ls-files`).
//! - [`OpaqueText`]: pre-formatted text such as patches and diffstats. Paths
//!   inside the text are not rewritten.
//! - [`AttributeList`]: `path, attribute, value` triples (`check-attr`).
//!
//! Queries are always run with `-z`, so parsing never has to undo git's path
//! quoting. The user's own `-z` choice only affects serialization.

use crate::error::{Error, Result};
use crate::forest::ExclusionSet;
use crate::path::join_repo_path;
use crate::record::{parse_raw, quote_path, serialize_records, DiffRecord};

/// Parse, re-root and merge the output of one kind of query.
pub trait ResultFormat: Sync {
    /// Parsed, not yet serialized output of one repository.
    type Output: Send;

    /// Parse raw query output, dropping entries whose path is excluded.
    fn parse(&self, raw: &str, exclude: Option<&ExclusionSet>) -> Result<Self::Output>;

    /// Prepend `prefix` to every path in `output`.
    fn raise_paths(&self, output: Self::Output, prefix: &str) -> Self::Output;

    /// Merge all repositories' outputs into the final text.
    fn combine(&self, outputs: Vec<Self::Output>) -> String;
}

/// Raw diff records, one or two paths each.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordList {
    pub format_z: bool,
}

impl RecordList {
    pub fn new(format_z: bool) -> Self {
        Self { format_z }
    }
}

impl ResultFormat for RecordList {
    type Output = Vec<DiffRecord>;

    fn parse(&self, raw: &str, exclude: Option<&ExclusionSet>) -> Result<Self::Output> {
        parse_raw(raw, exclude)
    }

    fn raise_paths(&self, mut output: Self::Output, prefix: &str) -> Self::Output {
        for record in &mut output {
            record.add_path_parent(prefix);
        }
        output
    }

    fn combine(&self, outputs: Vec<Self::Output>) -> String {
        let records: Vec<DiffRecord> = outputs.into_iter().flatten().collect();
        serialize_records(&records, self.format_z)
    }
}

/// A flat list of paths.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileList {
    pub format_z: bool,
}

impl FileList {
    pub fn new(format_z: bool) -> Self {
        Self { format_z }
    }
}

impl ResultFormat for FileList {
    type Output = Vec<String>;

    fn parse(&self, raw: &str, exclude: Option<&ExclusionSet>) -> Result<Self::Output> {
        Ok(raw
            .split('\0')
            .filter(|path| !path.is_empty())
            .filter(|path| !exclude.is_some_and(|set| set.contains(path)))
            .map(str::to_string)
            .collect())
    }

    fn raise_paths(&self, output: Self::Output, prefix: &str) -> Self::Output {
        output
            .into_iter()
            .map(|path| join_repo_path(prefix, &path))
            .collect()
    }

    fn combine(&self, outputs: Vec<Self::Output>) -> String {
        let separator = if self.format_z { "\0" } else { "\n" };
        outputs
            .into_iter()
            .flatten()
            .filter(|path| !path.is_empty())
            .map(|path| {
                if self.format_z {
                    path
                } else {
                    quote_path(&path).into_owned()
                }
            })
            .collect::<Vec<_>>()
            .join(separator)
    }
}

/// Pre-formatted text blocks, concatenated as they are.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpaqueText;

impl ResultFormat for OpaqueText {
    type Output = String;

    fn parse(&self, raw: &str, _exclude: Option<&ExclusionSet>) -> Result<Self::Output> {
        Ok(raw.to_string())
    }

    // TODO: re-root the `diff --git a/... b/...` headers of patch output so
    // patches from submodules apply from the meta root.
    fn raise_paths(&self, output: Self::Output, _prefix: &str) -> Self::Output {
        output
    }

    fn combine(&self, outputs: Vec<Self::Output>) -> String {
        outputs
            .into_iter()
            .filter(|block| !block.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// One `check-attr` result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeRecord {
    pub path: String,
    pub attribute: String,
    pub value: String,
}

/// Attribute triples as printed by `check-attr`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AttributeList {
    pub format_z: bool,
}

impl AttributeList {
    pub fn new(format_z: bool) -> Self {
        Self { format_z }
    }
}

impl ResultFormat for AttributeList {
    type Output = Vec<AttributeRecord>;

    fn parse(&self, raw: &str, exclude: Option<&ExclusionSet>) -> Result<Self::Output> {
        // Values may be empty; only the final terminator is dropped.
        let body = raw.strip_suffix('\0').unwrap_or(raw);
        let tokens: Vec<&str> = if body.is_empty() {
            Vec::new()
        } else {
            body.split('\0').collect()
        };
        if tokens.len() % 3 != 0 {
            return Err(Error::MalformedOutput {
                message: format!(
                    "check-attr printed {} fields, expected groups of three",
                    tokens.len()
                ),
            });
        }
        Ok(tokens
            .chunks(3)
            .map(|chunk| AttributeRecord {
                path: chunk[0].to_string(),
                attribute: chunk[1].to_string(),
                value: chunk[2].to_string(),
            })
            .filter(|record| !exclude.is_some_and(|set| set.contains(&record.path)))
            .collect())
    }

    fn raise_paths(&self, output: Self::Output, prefix: &str) -> Self::Output {
        output
            .into_iter()
            .map(|record| AttributeRecord {
                path: join_repo_path(prefix, &record.path),
                ..record
            })
            .collect()
    }

    fn combine(&self, outputs: Vec<Self::Output>) -> String {
        let (field_separator, record_separator) = if self.format_z {
            ("\0", "\0")
        } else {
            (": ", "\n")
        };
        outputs
            .into_iter()
            .flatten()
            .map(|record| {
                let path = if self.format_z {
                    record.path
                } else {
                    quote_path(&record.path).into_owned()
                };
                [path, record.attribute, record.value].join(field_separator)
            })
            .collect::<Vec<_>>()
            .join(record_separator)
    }
}
