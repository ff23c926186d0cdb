//! Full-tree scanner for physical test artifacts.
//!
//! A directory containing a test marker file becomes one test and is not
//! descended into further. Spreadsheets are collected everywhere, even
//! inside test folders; the false-positive filter removes those later.
//! Symlinked directories are skipped with a warning, never followed.

use crate::error::DiscoveryResult;
use crate::paths::{self, FileKind, TestKind};
use octane::types::{DataTableRecord, TestRecord};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Seam for extracting the human-readable description out of a test's
/// definition files. The binary/XML container formats are parsed outside
/// this crate.
pub trait DescribeTest {
    fn describe(&self, test_dir: &Path, kind: TestKind) -> Option<String>;
}

/// Default describer: no description.
pub struct NoDescription;

impl DescribeTest for NoDescription {
    fn describe(&self, _test_dir: &Path, _kind: TestKind) -> Option<String> {
        None
    }
}

/// Wraps a multi-line description into simple HTML paragraphs the remote
/// inventory renders as rich text. Single-line text passes through.
pub fn description_to_html(description: &str) -> String {
    if !description.contains('\n') {
        return description.to_string();
    }

    let paragraphs: String = description
        .lines()
        .map(|line| format!("<p>{}</p>", line))
        .collect();
    format!("<html><body>{}</body></html>", paragraphs)
}

/// Everything the full-tree scan found.
#[derive(Debug, Default)]
pub struct ScanResults {
    pub tests: Vec<TestRecord>,
    pub data_tables: Vec<DataTableRecord>,
}

/// Builds the test record for a test folder, deriving identity from the
/// folder's position under `root` and asking `describer` for the body.
pub fn build_test_record(
    root: &Path,
    test_dir: &Path,
    kind: TestKind,
    describer: &dyn DescribeTest,
) -> TestRecord {
    let class_name = relative_slash_path(root, test_dir);
    let name = paths::file_name(&class_name).to_string();
    let package_name = paths::directory(&class_name).to_string();

    let mut record = TestRecord::discovered(name, package_name, class_name);
    if let Some(description) = describer.describe(test_dir, kind) {
        record.description = Some(description_to_html(&description));
    }
    record
}

/// Recursively walks `root` and materializes discovered tests and data
/// tables.
pub fn scan_repository(root: &Path, describer: &dyn DescribeTest) -> DiscoveryResult<ScanResults> {
    let mut results = ScanResults::default();
    scan_directory(root, root, describer, &mut results)?;
    Ok(results)
}

fn scan_directory(
    root: &Path,
    dir: &Path,
    describer: &dyn DescribeTest,
    results: &mut ScanResults,
) -> DiscoveryResult<()> {
    let mut entries: Vec<PathBuf> = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        entries.push(entry?.path());
    }

    for entry in &entries {
        if let Some(name) = entry.file_name().and_then(|name| name.to_str()) {
            if paths::is_data_table_file(name) {
                let dir_path = relative_slash_path(root, dir);
                let relative_path = if dir_path.is_empty() {
                    name.to_string()
                } else {
                    format!("{}/{}", dir_path, name)
                };
                results
                    .data_tables
                    .push(DataTableRecord::discovered(name, relative_path));
            }
        }
    }

    if let Some(kind) = test_marker(&entries) {
        results
            .tests
            .push(build_test_record(root, dir, kind, describer));
        return Ok(());
    }

    for entry in &entries {
        let metadata = std::fs::symlink_metadata(entry)?;
        if metadata.file_type().is_symlink() {
            warn!(
                "{} is a symlink; symlinks are not supported and will be ignored",
                entry.display()
            );
            continue;
        }
        if metadata.is_dir() {
            scan_directory(root, entry, describer, results)?;
        }
    }

    Ok(())
}

/// GUI markers win over API markers when a folder somehow carries both.
fn test_marker(entries: &[PathBuf]) -> Option<TestKind> {
    let mut found = None;
    for entry in entries {
        let Some(name) = entry.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        match paths::file_kind(name) {
            Some(FileKind::Test(TestKind::Gui)) => return Some(TestKind::Gui),
            Some(FileKind::Test(TestKind::Api)) => found = Some(TestKind::Api),
            _ => {}
        }
    }
    found
}

fn relative_slash_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let segments: Vec<String> = relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy().into_owned())
        .collect();
    segments.join("/")
}
