use crate::error::InventoryResult;
use crate::types::{DataTableRecord, TestRecord};
use async_trait::async_trait;

/// Which slice of the remote inventory to fetch existing tests from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestScope {
    /// All UFT tests in the workspace (full-scan runs).
    Workspace,
    /// Only tests owned by one SCM repository (incremental runs).
    Repository { scm_repository_id: String },
}

/// The remote inventory operations the sync pipeline needs. The
/// dispatcher and run orchestration depend on this trait, not on the
/// concrete HTTP client, so they can be exercised with mocks.
#[async_trait]
pub trait InventoryApi: Send + Sync {
    /// Resolves the remote identifier of the SCM repository record whose
    /// URL matches `repository_url`.
    async fn scm_repository_id(&self, repository_url: &str) -> InventoryResult<String>;

    /// Resolves the test-runner (executor) attached to the CI pipeline.
    /// Returns `None` when no runner is configured; creation then proceeds
    /// without a runner reference.
    async fn test_runner_id(&self, pipeline_name: &str) -> InventoryResult<Option<String>>;

    async fn existing_tests(&self, scope: &TestScope) -> InventoryResult<Vec<TestRecord>>;

    async fn existing_data_tables(
        &self,
        scm_repository_id: &str,
    ) -> InventoryResult<Vec<DataTableRecord>>;

    async fn create_test(
        &self,
        test: &TestRecord,
        scm_repository_id: &str,
        test_runner_id: Option<&str>,
    ) -> InventoryResult<()>;

    /// Updates name/package/class/description/executable of the test with
    /// `test.id`.
    async fn update_test(&self, test: &TestRecord) -> InventoryResult<()>;

    /// Soft delete: clears the executable flag and nothing else. The remote
    /// record and its run history are retained.
    async fn deactivate_test(&self, test_id: &str) -> InventoryResult<()>;

    async fn create_data_table(
        &self,
        table: &DataTableRecord,
        scm_repository_id: &str,
    ) -> InventoryResult<()>;

    async fn update_data_table(&self, table: &DataTableRecord) -> InventoryResult<()>;

    async fn delete_data_table(&self, table_id: &str) -> InventoryResult<()>;
}
