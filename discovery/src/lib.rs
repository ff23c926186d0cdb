pub mod classify;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod paths;
pub mod reconcile;
pub mod run;
pub mod scan;

pub use classify::{classify_scm_changes, filter_false_positives, split_diff_tokens, ScmChanges};
pub use config::{DiscoveryConfig, ScanMode};
pub use dispatch::{dispatch_data_table_changes, dispatch_test_changes, DispatchSummary};
pub use error::{DiscoveryError, DiscoveryResult};
pub use paths::{FileKind, TestKind};
pub use reconcile::{reconcile_data_tables, reconcile_tests};
pub use run::{run_discovery, RunSummary};
pub use scan::{scan_repository, DescribeTest, NoDescription, ScanResults};
