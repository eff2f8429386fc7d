//! # Command Distribution
//!
//! Runs one git query in every repository of a forest that it concerns and
//! merges the answers into the single stream plain git would have printed
//! for one big repository.
//!
//! Two fan-out shapes exist:
//!
//! - [`CommandCombiner::run`] for whole-tree queries (`diff-index`,
//!   `diff-files`, `check-attr`, `update-index`). Every repository is run at
//!   its own root and its paths are lifted into meta-root coordinates.
//! - [`CommandCombiner::run_scoped`] for listing queries (`ls-files`), which
//!   only see the repository containing the invocation directory plus the
//!   open submodules mounted beneath it, with paths relative to that
//!   directory.
//!
//! Queries run in parallel on a rayon pool. Results keep the order in which
//! the targets were planned (meta repository first, then submodules by name)
//! regardless of which query finishes first. Any failing query aborts the
//! whole command; there is no partial output.

use std::path::{Path, PathBuf};

use log::{debug, info};
use rayon::prelude::*;
use rayon::ThreadPool;

use crate::classify::{classify, ClassifyOptions};
use crate::defaults::META_REPO_KEY;
use crate::error::{Error, Result};
use crate::forest::{ExclusionSet, RepositoryForest};
use crate::format::ResultFormat;
use crate::git::{describe, GitOperations};
use crate::path::{normalize, relative_repo_path, strip_component_prefix};
use crate::scope::resolve_scope;

/// Everything a command needs to know about where it was invoked.
#[derive(Debug, Clone)]
pub struct MetaContext {
    pub forest: RepositoryForest,
    /// Absolute invocation directory.
    pub cwd: PathBuf,
}

impl MetaContext {
    pub fn new(forest: RepositoryForest, cwd: impl Into<PathBuf>) -> Self {
        Self {
            forest,
            cwd: normalize(&cwd.into()),
        }
    }
}

/// A git subcommand and its leading arguments, before any path filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub command: String,
    pub args: Vec<String>,
}

impl Query {
    pub fn new<I, S>(command: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            command: command.to_string(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Full argument list for one repository. The `--` boundary and the
    /// paths are only added when there are paths to filter by.
    pub fn arguments(&self, paths: &[String]) -> Vec<String> {
        let mut args = self.args.clone();
        if !paths.is_empty() {
            args.push("--".to_string());
            args.extend(paths.iter().cloned());
        }
        args
    }
}

/// One planned invocation of a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTarget {
    /// `"."` or a submodule name.
    pub repo: String,
    /// Directory the query runs in.
    pub workdir: PathBuf,
    /// Path filter; empty means unfiltered.
    pub paths: Vec<String>,
    /// Prepended to every path the query reports.
    pub prefix: String,
    /// Paths dropped from the query's results, in the query's own coordinates.
    pub exclude: ExclusionSet,
}

/// The parsed output of one repository, tagged with where it came from.
#[derive(Debug)]
pub struct ResultBucket<T> {
    pub repo: String,
    pub output: T,
}

/// Fans queries out across a forest and merges the answers.
pub struct CommandCombiner<'g> {
    git: &'g dyn GitOperations,
    pool: Option<ThreadPool>,
}

impl<'g> CommandCombiner<'g> {
    /// Uses rayon's global pool.
    pub fn new(git: &'g dyn GitOperations) -> Self {
        Self { git, pool: None }
    }

    /// Limits the number of queries running at once.
    pub fn with_jobs(mut self, jobs: usize) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new().num_threads(jobs).build()?;
        self.pool = Some(pool);
        Ok(self)
    }

    /// Run `query` across the forest with every path in meta-root
    /// coordinates.
    ///
    /// Without `paths`, the meta repository and every open submodule are
    /// queried unfiltered. With `paths`, only repositories owning at least
    /// one of them are queried; if every path was dropped (all inside
    /// closed submodules) nothing runs and the output is empty.
    pub fn run<F: ResultFormat>(
        &self,
        ctx: &MetaContext,
        query: &Query,
        format: &F,
        paths: &[String],
        options: ClassifyOptions,
    ) -> Result<String> {
        let targets = plan_tree(ctx, paths, options)?;
        self.execute(query, format, &targets)
    }

    /// Run a listing `query` scoped to the invocation directory.
    pub fn run_scoped<F: ResultFormat>(
        &self,
        ctx: &MetaContext,
        query: &Query,
        format: &F,
        paths: &[String],
    ) -> Result<String> {
        let targets = plan_scoped(ctx, paths)?;
        self.execute(query, format, &targets)
    }

    /// Run every target, in parallel, and merge the results in plan order.
    pub fn execute<F: ResultFormat>(
        &self,
        query: &Query,
        format: &F,
        targets: &[QueryTarget],
    ) -> Result<String> {
        if targets.is_empty() {
            debug!("Nothing to query for git {}", query.command);
            return Ok(String::new());
        }
        info!(
            "Running git {} in {} repositories",
            query.command,
            targets.len()
        );

        let buckets: Vec<ResultBucket<F::Output>> = self.install(|| {
            targets
                .par_iter()
                .map(|target| self.query_one(query, format, target))
                .collect::<Result<Vec<_>>>()
        })?;

        for bucket in &buckets {
            debug!("Collected results from '{}'", bucket.repo);
        }
        Ok(format.combine(buckets.into_iter().map(|b| b.output).collect()))
    }

    fn query_one<F: ResultFormat>(
        &self,
        query: &Query,
        format: &F,
        target: &QueryTarget,
    ) -> Result<ResultBucket<F::Output>> {
        let args = query.arguments(&target.paths);
        debug!(
            "[{}] git {} in {}",
            target.repo,
            describe(&query.command, &args),
            target.workdir.display()
        );
        let raw = self.git.run(&query.command, &args, &target.workdir)?;
        let exclude = (!target.exclude.is_empty()).then_some(&target.exclude);
        let mut output = format.parse(&raw, exclude)?;
        if !target.prefix.is_empty() {
            output = format.raise_paths(output, &target.prefix);
        }
        Ok(ResultBucket {
            repo: target.repo.clone(),
            output,
        })
    }

    fn install<T, OP>(&self, op: OP) -> T
    where
        OP: FnOnce() -> T + Send,
        T: Send,
    {
        match &self.pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }
}

fn working_tree(forest: &RepositoryForest, repo: &str) -> Result<PathBuf> {
    forest
        .working_tree(repo)
        .ok_or_else(|| Error::ClosedSubmodule {
            path: repo.to_string(),
            submodule: repo.to_string(),
        })
}

fn repo_prefix(repo: &str) -> String {
    if repo == META_REPO_KEY {
        String::new()
    } else {
        repo.to_string()
    }
}

/// Targets for a whole-tree query, one per repository concerned.
pub fn plan_tree(
    ctx: &MetaContext,
    paths: &[String],
    options: ClassifyOptions,
) -> Result<Vec<QueryTarget>> {
    let forest = &ctx.forest;
    let buckets: Vec<(String, Vec<String>)> = if paths.is_empty() {
        std::iter::once(META_REPO_KEY)
            .chain(forest.open_submodules())
            .map(|repo| (repo.to_string(), Vec::new()))
            .collect()
    } else {
        classify(&ctx.cwd, paths, forest, options)?
            .into_iter()
            .collect()
    };

    buckets
        .into_iter()
        .map(|(repo, paths)| {
            Ok(QueryTarget {
                workdir: working_tree(forest, &repo)?,
                prefix: repo_prefix(&repo),
                exclude: forest.exclusion_set(&repo),
                paths,
                repo,
            })
        })
        .collect()
}

/// Targets for a listing query run from `ctx.cwd`.
///
/// The scope repository runs in the invocation directory itself so that git
/// reports paths relative to it. Nested submodules run at their own roots
/// and are prefixed by their mount point relative to the invocation
/// directory. Explicit paths outside the scope are skipped.
pub fn plan_scoped(ctx: &MetaContext, paths: &[String]) -> Result<Vec<QueryTarget>> {
    let forest = &ctx.forest;
    let scope = resolve_scope(&ctx.cwd, forest)?;
    let scope_dir = join_dir(&working_tree(forest, &scope.repo)?, &scope.run_path);
    let scope_target = |paths: Vec<String>| QueryTarget {
        repo: scope.repo.clone(),
        workdir: scope_dir.clone(),
        paths,
        prefix: String::new(),
        exclude: forest.exclusion_set(&scope.repo).rebase(&scope.run_path),
    };
    let nested_target = |name: &str, paths: Vec<String>| -> Result<QueryTarget> {
        Ok(QueryTarget {
            repo: name.to_string(),
            workdir: working_tree(forest, name)?,
            paths,
            prefix: strip_component_prefix(name, &scope.meta_path)
                .unwrap_or(name)
                .to_string(),
            exclude: forest.exclusion_set(name),
        })
    };

    if paths.is_empty() {
        let mut targets = vec![scope_target(Vec::new())];
        for nested in scope.nested(forest) {
            targets.push(nested_target(&nested.name, Vec::new())?);
        }
        return Ok(targets);
    }

    let mut targets = Vec::new();
    for (repo, local) in classify(&ctx.cwd, paths, forest, ClassifyOptions::query())? {
        if repo == scope.repo {
            // The bucket is in repository coordinates; the query runs from
            // the invocation directory.
            let relative: Vec<String> = if local.is_empty() && !scope.run_path.is_empty() {
                vec![relative_repo_path(&scope.run_path, "")]
            } else {
                local
                    .iter()
                    .map(|path| relative_repo_path(&scope.run_path, path))
                    .collect()
            };
            targets.push(scope_target(relative));
        } else if scope.includes(&repo, forest) {
            targets.push(nested_target(&repo, local)?);
        } else {
            debug!("Skipping '{}': not visible from {}", repo, ctx.cwd.display());
        }
    }
    Ok(targets)
}

fn join_dir(base: &Path, relative: &str) -> PathBuf {
    if relative.is_empty() {
        base.to_path_buf()
    } else {
        base.join(relative)
    }
}
