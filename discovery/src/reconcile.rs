//! Reconciliation engine.
//!
//! Given the discovered entities, the classified SCM buckets, and the
//! existing remote records, produces the minimal operation list. Each
//! bucket is reconciled by its own pass into its own accumulator; the
//! passes are merged once, in precedence order (added, deleted, renamed,
//! discovered), so the first matching rule wins per entity.

use crate::classify::ScmChanges;
use crate::config::ScanMode;
use octane::types::{
    ChangeType, DataTableChange, DataTableRecord, RenamePair, TestChange, TestRecord,
};
use tracing::{debug, info, warn};

/// Reconciles the test view. The discovered set participates only in
/// full-scan mode; incremental runs are driven by the SCM buckets alone.
pub fn reconcile_tests(
    discovered: &[TestRecord],
    existing: &[TestRecord],
    changes: &ScmChanges,
    mode: ScanMode,
) -> Vec<TestChange> {
    let mut operations = reconcile_added_tests(&changes.added_tests, existing);
    operations.extend(reconcile_deleted_tests(&changes.deleted_tests, existing));
    operations.extend(reconcile_renamed_tests(&changes.renamed_tests, existing));
    if mode == ScanMode::FullScan {
        operations.extend(reconcile_discovered_tests(
            discovered,
            existing,
            &changes.added_tests,
            &changes.renamed_tests,
        ));
    }
    debug!("Reconciled {} test operations", operations.len());
    operations
}

fn find_test<'a>(existing: &'a [TestRecord], candidate: &TestRecord) -> Option<&'a TestRecord> {
    existing.iter().find(|test| test.same_identity(candidate))
}

fn reconcile_added_tests(added: &[TestRecord], existing: &[TestRecord]) -> Vec<TestChange> {
    let mut operations = Vec::new();
    for candidate in added {
        match find_test(existing, candidate) {
            None => operations.push(TestChange::new(ChangeType::Added, candidate.clone())),
            Some(found) if found.executable => {
                info!(
                    "The added test {} already exists with id {:?}",
                    candidate.name, found.id
                );
            }
            Some(found) => {
                // Reactivation supersedes re-creation.
                info!(
                    "The added test {} exists with id {:?} but is not executable; reactivating",
                    candidate.name, found.id
                );
                operations.push(TestChange::new(
                    ChangeType::Modified,
                    reactivated(candidate, found),
                ));
            }
        }
    }
    operations
}

fn reconcile_deleted_tests(deleted: &[TestRecord], existing: &[TestRecord]) -> Vec<TestChange> {
    let mut operations = Vec::new();
    for candidate in deleted {
        match find_test(existing, candidate) {
            Some(found) => {
                let mut record = candidate.clone();
                record.id = found.id.clone();
                operations.push(TestChange::new(ChangeType::Deleted, record));
            }
            None => {
                warn!("Could not find the existing test to delete: {}", candidate.name);
            }
        }
    }
    operations
}

fn reconcile_renamed_tests(
    renamed: &[RenamePair<TestRecord>],
    existing: &[TestRecord],
) -> Vec<TestChange> {
    let mut operations = Vec::new();
    for pair in renamed {
        match find_test(existing, &pair.old_value) {
            Some(found) => operations.push(TestChange::new(
                ChangeType::Modified,
                reactivated(&pair.new_value, found),
            )),
            None => {
                // A rename whose source is unknown remotely is
                // indistinguishable from a plain addition.
                warn!(
                    "Could not find the existing test for modification: {}; adding it as new",
                    pair.old_value.name
                );
                operations.push(TestChange::new(ChangeType::Added, pair.new_value.clone()));
            }
        }
    }
    operations
}

fn reconcile_discovered_tests(
    discovered: &[TestRecord],
    existing: &[TestRecord],
    added: &[TestRecord],
    renamed: &[RenamePair<TestRecord>],
) -> Vec<TestChange> {
    let mut operations = Vec::new();
    for test in discovered {
        let claimed = added.iter().any(|candidate| candidate.same_fields(test))
            || renamed.iter().any(|pair| {
                pair.old_value.same_fields(test) || pair.new_value.same_fields(test)
            });
        if claimed {
            continue;
        }

        match find_test(existing, test) {
            None => operations.push(TestChange::new(ChangeType::Added, test.clone())),
            Some(found) if found.executable => {
                info!(
                    "The test {} already exists with id {:?}",
                    test.name, found.id
                );
            }
            Some(found) => {
                info!(
                    "The discovered test {} exists with id {:?} but is not executable; reactivating",
                    test.name, found.id
                );
                operations.push(TestChange::new(
                    ChangeType::Modified,
                    reactivated(test, found),
                ));
            }
        }
    }
    operations
}

/// The candidate's data with the matched remote id, forced executable.
fn reactivated(candidate: &TestRecord, found: &TestRecord) -> TestRecord {
    let mut record = candidate.clone();
    record.id = found.id.clone();
    record.executable = true;
    record
}

/// Data-table reconciliation follows the same four passes, except there
/// is no reactivation: a matched addition is a pure no-op.
pub fn reconcile_data_tables(
    discovered: &[DataTableRecord],
    existing: &[DataTableRecord],
    changes: &ScmChanges,
    mode: ScanMode,
) -> Vec<DataTableChange> {
    let mut operations = reconcile_added_tables(&changes.added_data_tables, existing);
    operations.extend(reconcile_deleted_tables(
        &changes.deleted_data_tables,
        existing,
    ));
    operations.extend(reconcile_renamed_tables(
        &changes.renamed_data_tables,
        existing,
    ));
    if mode == ScanMode::FullScan {
        operations.extend(reconcile_discovered_tables(
            discovered,
            existing,
            &changes.added_data_tables,
            &changes.renamed_data_tables,
        ));
    }
    debug!("Reconciled {} data table operations", operations.len());
    operations
}

fn find_table<'a>(
    existing: &'a [DataTableRecord],
    candidate: &DataTableRecord,
) -> Option<&'a DataTableRecord> {
    existing.iter().find(|table| table.same_identity(candidate))
}

fn reconcile_added_tables(
    added: &[DataTableRecord],
    existing: &[DataTableRecord],
) -> Vec<DataTableChange> {
    let mut operations = Vec::new();
    for candidate in added {
        match find_table(existing, candidate) {
            Some(found) => {
                info!(
                    "The added data table {} already exists with id {:?}",
                    candidate.name, found.id
                );
            }
            None => operations.push(DataTableChange::new(ChangeType::Added, candidate.clone())),
        }
    }
    operations
}

fn reconcile_deleted_tables(
    deleted: &[DataTableRecord],
    existing: &[DataTableRecord],
) -> Vec<DataTableChange> {
    let mut operations = Vec::new();
    for candidate in deleted {
        match find_table(existing, candidate) {
            Some(found) => {
                let mut record = candidate.clone();
                record.id = found.id.clone();
                operations.push(DataTableChange::new(ChangeType::Deleted, record));
            }
            None => {
                warn!("Could not find the data table to delete: {}", candidate.name);
            }
        }
    }
    operations
}

fn reconcile_renamed_tables(
    renamed: &[RenamePair<DataTableRecord>],
    existing: &[DataTableRecord],
) -> Vec<DataTableChange> {
    let mut operations = Vec::new();
    for pair in renamed {
        match find_table(existing, &pair.old_value) {
            Some(found) => {
                let mut record = pair.new_value.clone();
                record.id = found.id.clone();
                operations.push(DataTableChange::new(ChangeType::Modified, record));
            }
            None => {
                info!(
                    "Could not find the existing data table for modification: {}; adding it as new",
                    pair.old_value.name
                );
                operations.push(DataTableChange::new(
                    ChangeType::Added,
                    pair.new_value.clone(),
                ));
            }
        }
    }
    operations
}

fn reconcile_discovered_tables(
    discovered: &[DataTableRecord],
    existing: &[DataTableRecord],
    added: &[DataTableRecord],
    renamed: &[RenamePair<DataTableRecord>],
) -> Vec<DataTableChange> {
    let mut operations = Vec::new();
    for table in discovered {
        let claimed = added.iter().any(|candidate| candidate.same_identity(table))
            || renamed.iter().any(|pair| {
                pair.old_value.same_identity(table) || pair.new_value.same_identity(table)
            });
        if claimed {
            continue;
        }

        match find_table(existing, table) {
            Some(found) => {
                info!(
                    "The data table {} already exists with id {:?}",
                    table.name, found.id
                );
            }
            None => operations.push(DataTableChange::new(ChangeType::Added, table.clone())),
        }
    }
    operations
}
