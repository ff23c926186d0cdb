use serde::{Deserialize, Serialize};

/// A UFT test as seen by any of the three sources: the repository scan,
/// the SCM diff, or the remote inventory. `id` is set only on records
/// that already exist remotely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestRecord {
    pub id: Option<String>,
    pub name: String,
    pub package_name: Option<String>,
    pub class_name: String,
    pub description: Option<String>,
    pub executable: bool,
}

impl TestRecord {
    /// Builds a locally sourced record (scan or diff); local records are
    /// executable and carry no remote id.
    pub fn discovered(
        name: impl Into<String>,
        package_name: impl Into<String>,
        class_name: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            package_name: Some(package_name.into()),
            class_name: class_name.into(),
            description: None,
            executable: true,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    fn package(&self) -> &str {
        self.package_name.as_deref().unwrap_or("")
    }

    /// Identity predicate: `name` and `class_name` must match exactly; an
    /// empty or absent package on either side is a wildcard, not a distinct
    /// value.
    pub fn same_identity(&self, other: &TestRecord) -> bool {
        self.name == other.name
            && self.class_name == other.class_name
            && (self.package().is_empty()
                || other.package().is_empty()
                || self.package() == other.package())
    }

    /// Exact three-field comparison, no package wildcarding. Used by the
    /// full-scan pass to recognize records already claimed by an SCM bucket.
    pub fn same_fields(&self, other: &TestRecord) -> bool {
        self.name == other.name
            && self.class_name == other.class_name
            && self.package() == other.package()
    }
}

/// An external data table (spreadsheet) tracked as an SCM resource file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataTableRecord {
    pub id: Option<String>,
    pub name: String,
    pub relative_path: String,
    pub scm_repository_id: Option<String>,
}

impl DataTableRecord {
    pub fn discovered(name: impl Into<String>, relative_path: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            relative_path: relative_path.into(),
            scm_repository_id: None,
        }
    }

    /// Identity predicate: exact `name` + `relative_path`, no wildcarding.
    pub fn same_identity(&self, other: &DataTableRecord) -> bool {
        self.name == other.name && self.relative_path == other.relative_path
    }
}

/// The kind of write a reconciled record requires. Closed set so the
/// dispatcher can match exhaustively; a new variant cannot silently no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Added,
    Modified,
    Deleted,
}

/// A reconciled test operation, ready for dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestChange {
    pub change: ChangeType,
    pub record: TestRecord,
}

impl TestChange {
    pub fn new(change: ChangeType, record: TestRecord) -> Self {
        Self { change, record }
    }
}

/// A reconciled data-table operation, ready for dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataTableChange {
    pub change: ChangeType,
    pub record: DataTableRecord,
}

impl DataTableChange {
    pub fn new(change: ChangeType, record: DataTableRecord) -> Self {
        Self { change, record }
    }
}

/// Both sides of an SCM rename entry. The old value locates the remote
/// record; the new value supplies the replacement data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenamePair<T> {
    pub old_value: T,
    pub new_value: T,
}

impl<T> RenamePair<T> {
    pub fn new(old_value: T, new_value: T) -> Self {
        Self {
            old_value,
            new_value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test(name: &str, package: &str, class: &str) -> TestRecord {
        TestRecord::discovered(name, package, class)
    }

    #[test]
    fn test_identity_exact_match() {
        let a = test("T1", "a", "a/b");
        let b = test("T1", "a", "a/b");
        assert!(a.same_identity(&b));
    }

    #[test]
    fn test_identity_requires_name_and_class() {
        let a = test("T1", "a", "a/b");
        assert!(!a.same_identity(&test("T2", "a", "a/b")));
        assert!(!a.same_identity(&test("T1", "a", "a/c")));
    }

    #[test]
    fn test_identity_package_mismatch() {
        let a = test("T1", "a", "a/b");
        let b = test("T1", "x", "a/b");
        assert!(!a.same_identity(&b));
    }

    #[test]
    fn test_identity_empty_package_is_wildcard() {
        let a = test("T1", "", "a/b");
        let b = test("T1", "a", "a/b");
        assert!(a.same_identity(&b));
        assert!(b.same_identity(&a));

        let mut c = test("T1", "a", "a/b");
        c.package_name = None;
        assert!(c.same_identity(&b));
        assert!(b.same_identity(&c));
    }

    #[test]
    fn test_exact_fields_ignore_wildcard() {
        let a = test("T1", "", "a/b");
        let b = test("T1", "a", "a/b");
        assert!(!a.same_fields(&b));
        assert!(a.same_fields(&test("T1", "", "a/b")));
    }

    #[test]
    fn test_identity_ignores_id_and_flags() {
        let mut a = test("T1", "a", "a/b");
        a.id = Some("7".to_string());
        a.executable = false;
        let b = test("T1", "a", "a/b");
        assert!(a.same_identity(&b));
    }

    #[test]
    fn data_table_identity_is_exact() {
        let a = DataTableRecord::discovered("data.xlsx", "tests/shared/data.xlsx");
        let b = DataTableRecord::discovered("data.xlsx", "tests/shared/data.xlsx");
        let c = DataTableRecord::discovered("data.xlsx", "tests/other/data.xlsx");
        assert!(a.same_identity(&b));
        assert!(!a.same_identity(&c));
    }

    #[test]
    fn change_type_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&ChangeType::Added).unwrap(),
            "\"added\""
        );
        assert_eq!(
            serde_json::to_string(&ChangeType::Deleted).unwrap(),
            "\"deleted\""
        );
    }
}
