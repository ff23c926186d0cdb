//! SCM change classifier.
//!
//! Consumes the flat NUL-separated status stream produced by a
//! source-control diff and partitions it into typed buckets for tests and
//! data tables. Parsing is tolerant: unrecognized status tokens and
//! truncated entries are skipped, never fatal.

use crate::paths::{self, FileKind};
use crate::scan::{description_to_html, DescribeTest};
use octane::types::{DataTableRecord, RenamePair, TestRecord};
use std::path::Path;
use tracing::debug;

/// The six classified buckets of one diff.
#[derive(Debug, Default)]
pub struct ScmChanges {
    pub added_tests: Vec<TestRecord>,
    pub deleted_tests: Vec<TestRecord>,
    pub renamed_tests: Vec<RenamePair<TestRecord>>,
    pub added_data_tables: Vec<DataTableRecord>,
    pub deleted_data_tables: Vec<DataTableRecord>,
    pub renamed_data_tables: Vec<RenamePair<DataTableRecord>>,
}

impl ScmChanges {
    pub fn is_empty(&self) -> bool {
        self.added_tests.is_empty()
            && self.deleted_tests.is_empty()
            && self.renamed_tests.is_empty()
            && self.added_data_tables.is_empty()
            && self.deleted_data_tables.is_empty()
            && self.renamed_data_tables.is_empty()
    }
}

/// Splits a diff artifact into status/path tokens. Empty tokens (for
/// example from a trailing NUL) are dropped.
pub fn split_diff_tokens(raw: &str) -> Vec<String> {
    raw.split('\0')
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// A data table is a false positive when it physically lives in or under
/// a known test's own folder; it is then part of that test, not an
/// independent resource.
pub fn is_false_positive(table: &DataTableRecord, tests: &[TestRecord]) -> bool {
    let dir = paths::directory(&table.relative_path);
    tests.iter().any(|test| {
        dir == test.class_name
            || (!test.class_name.is_empty()
                && dir.starts_with(&test.class_name)
                && dir.as_bytes().get(test.class_name.len()) == Some(&b'/'))
    })
}

/// Drops every data table owned by one of `tests`.
pub fn filter_false_positives(
    tables: Vec<DataTableRecord>,
    tests: &[TestRecord],
) -> Vec<DataTableRecord> {
    tables
        .into_iter()
        .filter(|table| {
            let keep = !is_false_positive(table, tests);
            if !keep {
                debug!("The data table {} is a false positive", table.name);
            }
            keep
        })
        .collect()
}

/// Partitions the token stream into [`ScmChanges`].
///
/// Added and renamed data tables are filtered against the discovered test
/// set; deleted data tables are filtered against the existing remote test
/// set, because the physical owning test may already be gone from disk.
pub fn classify_scm_changes(
    tokens: &[String],
    discovered_tests: &[TestRecord],
    existing_tests: &[TestRecord],
    root: &Path,
    describer: &dyn DescribeTest,
) -> ScmChanges {
    let mut changes = ScmChanges::default();
    let mut index = 0;

    while index < tokens.len() {
        let status = tokens[index].as_str();
        index += 1;

        if status.starts_with('R') {
            let Some(old_path) = tokens.get(index) else {
                break;
            };
            let Some(new_path) = tokens.get(index + 1) else {
                break;
            };
            index += 2;
            classify_rename(old_path, new_path, discovered_tests, &mut changes);
        } else if status == "D" {
            let Some(path) = tokens.get(index) else {
                break;
            };
            index += 1;
            classify_deletion(path, existing_tests, &mut changes);
        } else if status == "A" {
            let Some(path) = tokens.get(index) else {
                break;
            };
            index += 1;
            classify_addition(path, discovered_tests, root, describer, &mut changes);
        } else {
            debug!("Skipping unrecognized SCM status token: {}", status);
        }
    }

    changes
}

/// Either side of a rename may have changed extension, so both paths are
/// inspected.
fn classify_rename(
    old_path: &str,
    new_path: &str,
    discovered_tests: &[TestRecord],
    changes: &mut ScmChanges,
) {
    if paths::is_test_file(old_path) || paths::is_test_file(new_path) {
        let pair = RenamePair::new(
            paths::test_from_scm_path(old_path),
            paths::test_from_scm_path(new_path),
        );
        debug!("Mapped test rename: {} -> {}", old_path, new_path);
        changes.renamed_tests.push(pair);
    } else if paths::is_data_table_file(old_path) || paths::is_data_table_file(new_path) {
        let new_table = DataTableRecord::discovered(paths::file_name(new_path), new_path);
        if is_false_positive(&new_table, discovered_tests) {
            debug!("The renamed data table is a false positive: {}", new_table.name);
            return;
        }
        let old_table = DataTableRecord::discovered(paths::file_name(old_path), old_path);
        debug!("Mapped data table rename: {} -> {}", old_path, new_path);
        changes
            .renamed_data_tables
            .push(RenamePair::new(old_table, new_table));
    }
}

fn classify_deletion(path: &str, existing_tests: &[TestRecord], changes: &mut ScmChanges) {
    if paths::is_test_file(path) {
        // Deletions deactivate, never physically remove, the remote test.
        let mut test = paths::test_from_scm_path(path);
        test.executable = false;
        changes.deleted_tests.push(test);
    } else if paths::is_data_table_file(path) {
        let table = DataTableRecord::discovered(paths::file_name(path), path);
        if is_false_positive(&table, existing_tests) {
            debug!("The removed data table is a false positive: {}", table.name);
            return;
        }
        changes.deleted_data_tables.push(table);
    }
}

fn classify_addition(
    path: &str,
    discovered_tests: &[TestRecord],
    root: &Path,
    describer: &dyn DescribeTest,
    changes: &mut ScmChanges,
) {
    match paths::file_kind(path) {
        Some(FileKind::Test(kind)) => {
            let mut test = paths::test_from_scm_path(path);
            let test_dir = root.join(paths::directory(path));
            if let Some(description) = describer.describe(&test_dir, kind) {
                test.description = Some(description_to_html(&description));
            }
            changes.added_tests.push(test);
        }
        Some(FileKind::DataTable) => {
            let table = DataTableRecord::discovered(paths::file_name(path), path);
            if is_false_positive(&table, discovered_tests) {
                debug!("The added data table is a false positive: {}", table.name);
                return;
            }
            changes.added_data_tables.push(table);
        }
        None => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::NoDescription;

    fn tokens(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    fn classify(raw: &[&str]) -> ScmChanges {
        classify_scm_changes(&tokens(raw), &[], &[], Path::new("/repo"), &NoDescription)
    }

    #[test]
    fn test_addition_of_test_and_table() {
        let changes = classify(&["A", "a/b/Test.st", "A", "shared/data.xlsx"]);
        assert_eq!(changes.added_tests.len(), 1);
        assert_eq!(changes.added_tests[0].name, "b");
        assert_eq!(changes.added_tests[0].class_name, "a/b");
        assert_eq!(changes.added_data_tables.len(), 1);
        assert_eq!(changes.added_data_tables[0].name, "data.xlsx");
    }

    #[test]
    fn test_deletion_marks_test_not_executable() {
        let changes = classify(&["D", "a/b/Test.tsp"]);
        assert_eq!(changes.deleted_tests.len(), 1);
        assert!(!changes.deleted_tests[0].executable);
    }

    #[test]
    fn test_rename_with_similarity_suffix() {
        let changes = classify(&["R100", "old/T1.st", "new/T1.st"]);
        assert_eq!(changes.renamed_tests.len(), 1);
        let pair = &changes.renamed_tests[0];
        assert_eq!(pair.old_value.class_name, "old");
        assert_eq!(pair.new_value.class_name, "new");
    }

    #[test]
    fn test_rename_inspects_both_extensions() {
        // The old side lost its test extension across the rename.
        let changes = classify(&["R075", "a/T1.bak", "a/T1.st"]);
        assert_eq!(changes.renamed_tests.len(), 1);
    }

    #[test]
    fn test_unrecognized_tokens_are_skipped() {
        let changes = classify(&["M", "a/b/Test.st", "A", "c/d/Test.st"]);
        assert_eq!(changes.added_tests.len(), 1);
        assert_eq!(changes.added_tests[0].class_name, "c/d");
    }

    #[test]
    fn test_truncated_entry_is_tolerated() {
        let changes = classify(&["A", "a/b/Test.st", "R100", "only/one/path.st"]);
        assert_eq!(changes.added_tests.len(), 1);
        assert!(changes.renamed_tests.is_empty());
    }

    #[test]
    fn test_irrelevant_extensions_are_ignored() {
        let changes = classify(&["A", "readme.md", "D", "notes.txt"]);
        assert!(changes.is_empty());
    }

    #[test]
    fn test_added_table_inside_test_folder_is_dropped() {
        let discovered = vec![TestRecord::discovered("LoginTest", "tests", "tests/LoginTest")];
        let changes = classify_scm_changes(
            &tokens(&["A", "tests/LoginTest/data.xlsx", "A", "tests/shared/data.xlsx"]),
            &discovered,
            &[],
            Path::new("/repo"),
            &NoDescription,
        );
        assert_eq!(changes.added_data_tables.len(), 1);
        assert_eq!(
            changes.added_data_tables[0].relative_path,
            "tests/shared/data.xlsx"
        );
    }

    #[test]
    fn test_deleted_table_filtered_against_existing_remote_tests() {
        // The owning test is already gone from disk, so only the remote
        // inventory still knows about it.
        let existing = vec![TestRecord::discovered("LoginTest", "tests", "tests/LoginTest")];
        let changes = classify_scm_changes(
            &tokens(&["D", "tests/LoginTest/data.xlsx"]),
            &[],
            &existing,
            Path::new("/repo"),
            &NoDescription,
        );
        assert!(changes.deleted_data_tables.is_empty());
    }

    #[test]
    fn test_false_positive_prefix_has_path_boundary() {
        let tests = vec![TestRecord::discovered("LoginTest", "tests", "tests/LoginTest")];
        let inside = DataTableRecord::discovered("d.xlsx", "tests/LoginTest/sub/d.xlsx");
        let sibling = DataTableRecord::discovered("d.xlsx", "tests/LoginTest2/d.xlsx");
        assert!(is_false_positive(&inside, &tests));
        assert!(!is_false_positive(&sibling, &tests));
    }

    #[test]
    fn test_split_diff_tokens() {
        let raw = "A\0a/b/Test.st\0D\0c/d.xlsx\0";
        assert_eq!(
            split_diff_tokens(raw),
            vec!["A", "a/b/Test.st", "D", "c/d.xlsx"]
        );
    }
}
