//! Sync dispatcher.
//!
//! Maps each reconciled operation to exactly one remote write call,
//! awaited sequentially. A failed call is logged and the batch continues;
//! only reaching the inventory at all is a precondition of the run.

use octane::types::{ChangeType, DataTableChange, TestChange};
use octane::InventoryApi;
use tracing::{debug, error, warn};

/// Outcome of one dispatched batch.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DispatchSummary {
    pub dispatched: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl DispatchSummary {
    fn record(&mut self, result: Result<(), octane::InventoryError>, what: &str) {
        match result {
            Ok(()) => self.dispatched += 1,
            Err(e) => {
                error!("Failed to {}: {}", what, e);
                self.failed += 1;
            }
        }
    }
}

/// Dispatches reconciled test operations. The test-runner reference is
/// resolved at most once, before the first create.
pub async fn dispatch_test_changes(
    inventory: &dyn InventoryApi,
    changes: &[TestChange],
    scm_repository_id: &str,
    pipeline_name: Option<&str>,
) -> DispatchSummary {
    let mut summary = DispatchSummary::default();
    let mut test_runner_id: Option<Option<String>> = None;

    for change in changes {
        debug!(
            "The change type of test {} is {:?}",
            change.record.name, change.change
        );
        match change.change {
            ChangeType::Added => {
                let runner = match &test_runner_id {
                    Some(resolved) => resolved.clone(),
                    None => {
                        let resolved = resolve_test_runner(inventory, pipeline_name).await;
                        test_runner_id = Some(resolved.clone());
                        resolved
                    }
                };
                summary.record(
                    inventory
                        .create_test(&change.record, scm_repository_id, runner.as_deref())
                        .await,
                    "create test",
                );
            }
            ChangeType::Modified => match change.record.id {
                Some(_) => {
                    summary.record(inventory.update_test(&change.record).await, "update test");
                }
                None => {
                    warn!(
                        "Skipping update of test {} without a remote id",
                        change.record.name
                    );
                    summary.skipped += 1;
                }
            },
            ChangeType::Deleted => match change.record.id.as_deref() {
                Some(id) => {
                    summary.record(inventory.deactivate_test(id).await, "deactivate test");
                }
                None => {
                    warn!(
                        "Skipping deactivation of test {} without a remote id",
                        change.record.name
                    );
                    summary.skipped += 1;
                }
            },
        }
    }

    summary
}

async fn resolve_test_runner(
    inventory: &dyn InventoryApi,
    pipeline_name: Option<&str>,
) -> Option<String> {
    let pipeline = pipeline_name?;
    match inventory.test_runner_id(pipeline).await {
        Ok(runner) => {
            if runner.is_none() {
                warn!("No test runner found for pipeline {}", pipeline);
            }
            runner
        }
        Err(e) => {
            warn!("Failed to resolve test runner for pipeline {}: {}", pipeline, e);
            None
        }
    }
}

/// Dispatches reconciled data-table operations, scoped to the owning
/// repository.
pub async fn dispatch_data_table_changes(
    inventory: &dyn InventoryApi,
    changes: &[DataTableChange],
    scm_repository_id: &str,
) -> DispatchSummary {
    let mut summary = DispatchSummary::default();

    for change in changes {
        debug!(
            "The change type of data table {} is {:?}",
            change.record.name, change.change
        );
        match change.change {
            ChangeType::Added => {
                summary.record(
                    inventory
                        .create_data_table(&change.record, scm_repository_id)
                        .await,
                    "create data table",
                );
            }
            ChangeType::Modified => match change.record.id {
                Some(_) => {
                    summary.record(
                        inventory.update_data_table(&change.record).await,
                        "update data table",
                    );
                }
                None => {
                    warn!(
                        "Skipping update of data table {} without a remote id",
                        change.record.name
                    );
                    summary.skipped += 1;
                }
            },
            ChangeType::Deleted => match change.record.id.as_deref() {
                Some(id) => {
                    summary.record(inventory.delete_data_table(id).await, "delete data table");
                }
                None => {
                    warn!(
                        "Skipping deletion of data table {} without a remote id",
                        change.record.name
                    );
                    summary.skipped += 1;
                }
            },
        }
    }

    summary
}
