//! Run orchestration: discovery → classification → reconciliation →
//! dispatch, with the remote inventory read once up front.

use crate::classify::{classify_scm_changes, filter_false_positives, split_diff_tokens};
use crate::config::{DiscoveryConfig, ScanMode};
use crate::dispatch::{dispatch_data_table_changes, dispatch_test_changes, DispatchSummary};
use crate::error::DiscoveryResult;
use crate::reconcile::{reconcile_data_tables, reconcile_tests};
use crate::scan::{scan_repository, DescribeTest};
use octane::{InventoryApi, TestScope};
use tracing::{info, warn};

#[derive(Debug, Default, Clone, Copy)]
pub struct RunSummary {
    pub tests: DispatchSummary,
    pub data_tables: DispatchSummary,
}

/// Executes one synchronization run. Connection failures surface as
/// errors and abort the run; per-operation dispatch failures are counted
/// in the summary.
pub async fn run_discovery(
    config: &DiscoveryConfig,
    inventory: &dyn InventoryApi,
    describer: &dyn DescribeTest,
) -> DiscoveryResult<RunSummary> {
    config.validate()?;

    let scm_repository_id = inventory.scm_repository_id(&config.repository_url).await?;
    info!("Resolved scm repository id {}", scm_repository_id);

    let scan = scan_repository(&config.root, describer)?;
    if scan.tests.is_empty() {
        warn!("No UFT tests have been discovered in the repository");
    }
    if scan.data_tables.is_empty() {
        warn!("No data tables have been discovered in the repository");
    }
    let discovered_tables = filter_false_positives(scan.data_tables, &scan.tests);

    let tokens = match &config.diff_file {
        Some(path) => split_diff_tokens(&tokio::fs::read_to_string(path).await?),
        None => Vec::new(),
    };

    // An empty diff leaves nothing for the incremental buckets to do, so
    // the run degrades to pure full-scan reconciliation.
    let mode = if config.full_scan || tokens.is_empty() {
        ScanMode::FullScan
    } else {
        ScanMode::Incremental
    };

    // The fetch scope follows the effective mode: the discovered set is
    // reconciled against the whole workspace, never a repo-scoped slice,
    // or tests living outside this repository would be re-created.
    let scope = match mode {
        ScanMode::FullScan => TestScope::Workspace,
        ScanMode::Incremental => TestScope::Repository {
            scm_repository_id: scm_repository_id.clone(),
        },
    };
    let existing_tests = inventory.existing_tests(&scope).await?;
    let existing_tables = inventory.existing_data_tables(&scm_repository_id).await?;

    let changes = classify_scm_changes(
        &tokens,
        &scan.tests,
        &existing_tests,
        &config.root,
        describer,
    );

    let test_operations = reconcile_tests(&scan.tests, &existing_tests, &changes, mode);
    let table_operations =
        reconcile_data_tables(&discovered_tables, &existing_tables, &changes, mode);

    info!(
        "Dispatching {} test operations and {} data table operations",
        test_operations.len(),
        table_operations.len()
    );

    let tests = dispatch_test_changes(
        inventory,
        &test_operations,
        &scm_repository_id,
        config.pipeline_name.as_deref(),
    )
    .await;
    let data_tables =
        dispatch_data_table_changes(inventory, &table_operations, &scm_repository_id).await;

    Ok(RunSummary { tests, data_tables })
}
