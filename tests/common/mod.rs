//! Shared test utilities for integration and E2E tests.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! #[cfg_attr(not(feature = "integration-tests"), ignore)]
//! fn test_example() {
//!     let fixture = MetaFixture::new().with_submodule("s", &[("README.md", "hi")]);
//!     fixture.command().arg("ls-files").assert().success();
//! }
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    #[allow(unused_imports)]
    pub use assert_fs::prelude::*;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::{git, MetaFixture};
}

/// Run git in `dir`, panicking with its stderr on failure.
pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args([
            "-c",
            "user.name=git-meta tests",
            "-c",
            "user.email=tests@example.com",
            "-c",
            "init.defaultBranch=main",
            "-c",
            "commit.gpgsign=false",
        ])
        .args(args)
        .current_dir(dir)
        .output()
        .expect("Failed to run git");
    assert!(
        output.status.success(),
        "git {:?} failed in {}: {}",
        args,
        dir.display(),
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).expect("git printed non UTF-8 output")
}

/// A meta-repository in a temporary directory.
///
/// Submodules are created as repositories inside the meta working tree and
/// recorded in the meta index as gitlinks, which is all the tool looks at.
pub struct MetaFixture {
    temp_dir: assert_fs::TempDir,
}

impl MetaFixture {
    /// An initialised meta-repository with one committed file, `README.md`.
    pub fn new() -> Self {
        let temp_dir = assert_fs::TempDir::new().expect("Failed to create temp directory");
        let fixture = Self { temp_dir };
        git(fixture.path(), &["init", "-q"]);
        fixture.write("README.md", "meta\n");
        git(fixture.path(), &["add", "README.md"]);
        git(fixture.path(), &["commit", "-q", "-m", "meta"]);
        fixture
    }

    /// Add an open submodule at `name` containing `files`, committed in both
    /// the submodule and the meta-repository.
    pub fn with_submodule(self, name: &str, files: &[(&str, &str)]) -> Self {
        let dir = self.path().join(name);
        std::fs::create_dir_all(&dir).expect("Failed to create submodule directory");
        git(&dir, &["init", "-q"]);
        for (path, content) in files {
            self.write(&format!("{}/{}", name, path), content);
        }
        git(&dir, &["add", "."]);
        git(&dir, &["commit", "-q", "-m", name]);

        let parent = Path::new(name).parent().map(Path::to_path_buf).unwrap_or_default();
        let owner = self.path().join(parent);
        let local = Path::new(name)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(name)
            .to_string();
        git(&owner, &["add", &local]);
        git(&owner, &["commit", "-q", "-m", &format!("add {}", name)]);
        self
    }

    /// Record a gitlink at `name` that has no working tree.
    pub fn with_closed_submodule(self, name: &str) -> Self {
        std::fs::create_dir_all(self.path().join(name)).expect("Failed to create mount point");
        let head = git(self.path(), &["rev-parse", "HEAD"]);
        let cacheinfo = format!("160000,{},{}", head.trim(), name);
        git(self.path(), &["update-index", "--add", "--cacheinfo", &cacheinfo]);
        git(self.path(), &["commit", "-q", "-m", &format!("add {}", name)]);
        self
    }

    /// Write a file relative to the meta root.
    pub fn write(&self, path: &str, content: &str) {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// The meta root as git reports it.
    #[allow(dead_code)]
    pub fn root(&self) -> PathBuf {
        self.path().canonicalize().expect("Failed to resolve temp directory")
    }

    /// Create a command configured to run in `dir` under the meta root.
    pub fn command_in(&self, dir: &str) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("git-meta");
        cmd.current_dir(self.path().join(dir));
        cmd.env_remove("RUST_LOG");
        cmd
    }

    /// Create a command configured to run at the meta root.
    pub fn command(&self) -> assert_cmd::Command {
        self.command_in("")
    }
}

impl Default for MetaFixture {
    fn default() -> Self {
        Self::new()
    }
}
