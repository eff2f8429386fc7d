//! # Error Handling
//!
//! This module defines the centralized error type for `git-meta`. It uses the
//! `thiserror` library to describe every failure the path-mapping and command
//! distribution engine can produce.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum. Variants fall into three families:
//!   - *user errors* (`ClosedSubmodule`, `OutsideRepository`): the caller named
//!     something that cannot be inspected. These are printed verbatim, without
//!     any internal diagnostic trace; see [`Error::is_user_error`].
//!   - *query failures* (`GitCommand`, `Utf8`, `Io`): an external per-repository
//!     query failed. Always fatal for the whole command.
//!   - *malformed output* (`MalformedOutput`): a query produced output that
//!     does not follow the raw record format.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.
//!
//! There is no partial-success mode: any of these aborts the current command.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for git-meta operations
#[derive(Error, Debug)]
pub enum Error {
    /// A path names content inside a submodule that is not open, under a
    /// policy that requires every path to be inspected.
    #[error("'{path}' is in submodule '{submodule}', which is not open\n  hint: open the submodule and retry")]
    ClosedSubmodule { path: String, submodule: String },

    /// A path resolves to a location outside the meta-repository.
    #[error("'{path}' is outside repository at '{}'", root.display())]
    OutsideRepository { path: String, root: PathBuf },

    /// An external git query failed in one repository.
    #[error("Git command failed in {repo}: git {command} - {stderr}")]
    GitCommand {
        command: String,
        repo: String,
        stderr: String,
    },

    /// A query produced output the raw record parser could not tokenize.
    #[error("Malformed git output: {message}")]
    MalformedOutput { message: String },

    /// A query produced output that is not valid UTF-8.
    #[error("Git command in {repo} produced non UTF-8 output: {source}")]
    Utf8 {
        repo: String,
        #[source]
        source: std::string::FromUtf8Error,
    },

    /// The worker pool used for fan-out could not be created.
    #[error("Could not start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True for errors caused by what the user asked for rather than by a
    /// failing query. These are shown without a diagnostic chain.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Error::ClosedSubmodule { .. } | Error::OutsideRepository { .. }
        )
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
