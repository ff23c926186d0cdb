//! Identity derivation from SCM paths and the file-extension policy.
//!
//! Diff entries use forward-slash paths relative to the scan root. A test
//! is identified by the folder holding its marker file: the folder's
//! basename is the test name, the folder path is the class name, and the
//! class name's parent is the package (empty at the root).

use octane::types::TestRecord;

const GUI_TEST_EXTENSION: &str = "tsp";
const API_TEST_EXTENSION: &str = "st";
const DATA_TABLE_EXTENSIONS: [&str; 2] = ["xlsx", "xls"];

/// The UFT test flavor, decided by the marker-file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestKind {
    Gui,
    Api,
}

/// What a single SCM path denotes, if anything the sync cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Test(TestKind),
    DataTable,
}

/// Extension-based classification. All matching is case-insensitive.
pub fn file_kind(path: &str) -> Option<FileKind> {
    let extension = path.rsplit_once('.').map(|(_, ext)| ext.to_lowercase())?;
    if extension == GUI_TEST_EXTENSION {
        return Some(FileKind::Test(TestKind::Gui));
    }
    if extension == API_TEST_EXTENSION {
        return Some(FileKind::Test(TestKind::Api));
    }
    if DATA_TABLE_EXTENSIONS.contains(&extension.as_str()) {
        return Some(FileKind::DataTable);
    }
    None
}

pub fn is_test_file(path: &str) -> bool {
    matches!(file_kind(path), Some(FileKind::Test(_)))
}

pub fn is_data_table_file(path: &str) -> bool {
    matches!(file_kind(path), Some(FileKind::DataTable))
}

/// The final path segment.
pub fn file_name(path: &str) -> &str {
    path.rsplit_once('/').map_or(path, |(_, name)| name)
}

/// Everything before the final path segment; empty for root-level paths.
pub fn directory(path: &str) -> &str {
    path.rsplit_once('/').map_or("", |(dir, _)| dir)
}

/// Derives the natural identity of the test owning a marker file at
/// `path`. No filesystem access; descriptions are filled in separately.
pub fn test_from_scm_path(path: &str) -> TestRecord {
    let class_name = directory(path);
    let name = file_name(class_name);
    let package_name = directory(class_name);
    TestRecord::discovered(name, package_name, class_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_kind_by_extension() {
        assert_eq!(file_kind("a/Test.tsp"), Some(FileKind::Test(TestKind::Gui)));
        assert_eq!(file_kind("a/Test.st"), Some(FileKind::Test(TestKind::Api)));
        assert_eq!(file_kind("a/data.xlsx"), Some(FileKind::DataTable));
        assert_eq!(file_kind("a/data.xls"), Some(FileKind::DataTable));
        assert_eq!(file_kind("a/readme.md"), None);
        assert_eq!(file_kind("noextension"), None);
    }

    #[test]
    fn test_extension_matching_is_case_insensitive() {
        assert_eq!(file_kind("a/Test.TSP"), Some(FileKind::Test(TestKind::Gui)));
        assert_eq!(file_kind("a/Test.St"), Some(FileKind::Test(TestKind::Api)));
        assert_eq!(file_kind("a/DATA.XLSX"), Some(FileKind::DataTable));
    }

    #[test]
    fn test_path_segments() {
        assert_eq!(file_name("a/b/data.xlsx"), "data.xlsx");
        assert_eq!(file_name("data.xlsx"), "data.xlsx");
        assert_eq!(directory("a/b/data.xlsx"), "a/b");
        assert_eq!(directory("data.xlsx"), "");
    }

    #[test]
    fn test_identity_from_nested_path() {
        let test = test_from_scm_path("a/b/Test.st");
        assert_eq!(test.name, "b");
        assert_eq!(test.class_name, "a/b");
        assert_eq!(test.package_name.as_deref(), Some("a"));
    }

    #[test]
    fn test_identity_from_shallow_path() {
        let test = test_from_scm_path("old/T1.st");
        assert_eq!(test.name, "old");
        assert_eq!(test.class_name, "old");
        assert_eq!(test.package_name.as_deref(), Some(""));
    }
}
