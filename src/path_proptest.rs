//! Property-based tests for path classification and raw record handling.
//!
//! These tests use proptest to generate random forests, path lists and
//! records, and verify that invariants hold for all of them.

#[cfg(test)]
mod proptest_tests {
    use std::collections::BTreeSet;
    use std::path::Path;

    use crate::classify::{classify, ClassifyOptions, ClosedSubmodulePolicy};
    use crate::forest::RepositoryForest;
    use crate::path::{is_within, join_repo_path};
    use crate::record::{parse_raw, serialize_records, DiffRecord};
    use proptest::prelude::*;

    const FILTER_ONLY: ClassifyOptions = ClassifyOptions {
        closed: ClosedSubmodulePolicy::Drop,
        expand_open_submodules: false,
    };

    fn submodule_name() -> impl Strategy<Value = String> {
        prop::collection::vec("[a-c]", 1..3).prop_map(|parts| parts.join("/"))
    }

    /// A file path; the final component can never be a submodule name.
    fn file_path() -> impl Strategy<Value = String> {
        (prop::collection::vec("[a-c]", 0..4), "[x-z][0-9]\\.txt").prop_map(|(dirs, file)| {
            let mut parts = dirs;
            parts.push(file);
            parts.join("/")
        })
    }

    fn forest(names: &BTreeSet<String>, open: bool) -> RepositoryForest {
        names
            .iter()
            .fold(RepositoryForest::new("/repo"), |forest, name| {
                forest.with_submodule(name, open)
            })
    }

    fn record() -> impl Strategy<Value = DiffRecord> {
        (
            prop::sample::select(vec!['M', 'A', 'D', 'T', 'R', 'C']),
            0u32..=100,
            prop::collection::vec("[a-z][a-z/._ -]{0,11}", 2),
        )
            .prop_map(|(status, score, mut paths)| {
                let status = if status == 'R' || status == 'C' {
                    format!("{}{:03}", status, score)
                } else {
                    paths.truncate(1);
                    status.to_string()
                };
                DiffRecord::new(format!(":100644 100644 1234567 89abcde {}", status), paths)
            })
    }

    // ============================================================================
    // classify property tests
    // ============================================================================

    proptest! {
        /// Property: with every submodule open, each input path is found again
        /// by joining its bucket key and its repository-local path.
        #[test]
        fn classify_reconstructs_every_path(
            names in prop::collection::btree_set(submodule_name(), 0..5),
            paths in prop::collection::vec(file_path(), 1..8),
        ) {
            let forest = forest(&names, true);
            let map = classify(Path::new("/repo"), &paths, &forest, FILTER_ONLY).unwrap();

            let mut rebuilt: Vec<String> = map
                .iter()
                .flat_map(|(key, locals)| locals.iter().map(move |local| join_repo_path(key, local)))
                .collect();
            let mut expected = paths.clone();
            rebuilt.sort();
            expected.sort();
            prop_assert_eq!(rebuilt, expected);
        }

        /// Property: a path is always bucketed under the longest submodule
        /// name containing it, or under the meta repository when none does.
        #[test]
        fn classify_picks_longest_prefix(
            names in prop::collection::btree_set(submodule_name(), 0..5),
            paths in prop::collection::vec(file_path(), 1..8),
        ) {
            let forest = forest(&names, true);
            let map = classify(Path::new("/repo"), &paths, &forest, FILTER_ONLY).unwrap();

            for (key, locals) in &map {
                for local in locals {
                    let full = join_repo_path(key, local);
                    let longest = names
                        .iter()
                        .filter(|name| is_within(&full, name))
                        .max_by_key(|name| name.len());
                    match longest {
                        Some(name) => {
                            prop_assert_eq!(key, name);
                        }
                        None => {
                            prop_assert_eq!(key.as_str(), ".");
                        }
                    }
                }
            }
        }

        /// Property: nothing inside a closed submodule is ever bucketed.
        #[test]
        fn classify_never_targets_closed_submodules(
            names in prop::collection::btree_set(submodule_name(), 1..5),
            paths in prop::collection::vec(file_path(), 1..8),
        ) {
            let forest = forest(&names, false);
            let map = classify(Path::new("/repo"), &paths, &forest, ClassifyOptions::query()).unwrap();

            for key in map.keys() {
                prop_assert_eq!(key.as_str(), ".");
            }
            for local in map.values().flatten() {
                prop_assert!(names.iter().all(|name| !is_within(local, name)));
            }
        }
    }

    // ============================================================================
    // raw record property tests
    // ============================================================================

    proptest! {
        /// Property: NUL-separated serialization parses back to the same records.
        #[test]
        fn raw_records_survive_serialization(records in prop::collection::vec(record(), 0..6)) {
            let text = serialize_records(&records, true);
            let parsed = parse_raw(&text, None).unwrap();
            prop_assert_eq!(parsed, records);
        }

        /// Property: lifting paths under a prefix keeps every record's arity.
        #[test]
        fn add_path_parent_keeps_arity(record in record(), prefix in submodule_name()) {
            let mut lifted = record.clone();
            lifted.add_path_parent(&prefix);
            prop_assert_eq!(lifted.paths().len(), record.paths().len());
            for (before, after) in record.paths().iter().zip(lifted.paths()) {
                prop_assert_eq!(after, &format!("{}/{}", prefix, before));
            }
        }
    }
}
