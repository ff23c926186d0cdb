use crate::error::{DiscoveryError, DiscoveryResult};
use std::path::{Path, PathBuf};

const MAX_PATH_LENGTH: usize = 4096;

/// Whether the discovered set participates in reconciliation or only the
/// SCM-diff buckets do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    FullScan,
    Incremental,
}

/// Everything one discovery run needs beyond the remote connection.
/// Built once at the process boundary; components never read the
/// environment themselves.
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Root of the checked-out repository to scan.
    pub root: PathBuf,
    /// Fetch existing tests workspace-wide instead of repo-scoped, and
    /// reconcile the full discovered set.
    pub full_scan: bool,
    /// NUL-separated SCM status artifact. Absent means empty diff.
    pub diff_file: Option<PathBuf>,
    /// Source URL of the repository, used to resolve its remote record.
    pub repository_url: String,
    /// CI pipeline name, used to resolve the test runner on creation.
    pub pipeline_name: Option<String>,
}

impl DiscoveryConfig {
    pub fn new(root: impl Into<PathBuf>, repository_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            full_scan: false,
            diff_file: None,
            repository_url: repository_url.into(),
            pipeline_name: None,
        }
    }

    pub fn with_full_scan(mut self, full_scan: bool) -> Self {
        self.full_scan = full_scan;
        self
    }

    pub fn with_diff_file(mut self, diff_file: Option<PathBuf>) -> Self {
        self.diff_file = diff_file;
        self
    }

    pub fn with_pipeline_name(mut self, pipeline_name: Option<String>) -> Self {
        self.pipeline_name = pipeline_name;
        self
    }

    /// Validates the scan root: present, sane length, no control
    /// characters, an existing directory, and not the filesystem root.
    pub fn validate(&self) -> DiscoveryResult<()> {
        let raw = self.root.to_string_lossy();

        if raw.is_empty() || raw.len() > MAX_PATH_LENGTH {
            return Err(invalid_path(
                "the path is either empty or exceeds the maximum length of 4096 characters",
            ));
        }

        if raw.chars().any(|c| c.is_control()) {
            return Err(invalid_path("the path contains control characters"));
        }

        let metadata = std::fs::metadata(&self.root)
            .map_err(|_| invalid_path("the path does not exist"))?;
        if !metadata.is_dir() {
            return Err(invalid_path("the path is not a directory"));
        }

        let canonical = std::fs::canonicalize(&self.root)?;
        if is_filesystem_root(&canonical) {
            return Err(invalid_path("the filesystem root is not allowed"));
        }

        Ok(())
    }
}

fn invalid_path(message: &str) -> DiscoveryError {
    DiscoveryError::InvalidPath {
        message: message.to_string(),
    }
}

fn is_filesystem_root(path: &Path) -> bool {
    path.parent().is_none()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty_path() {
        let config = DiscoveryConfig::new("", "https://git.example.com/repo");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_missing_directory() {
        let config = DiscoveryConfig::new(
            "/definitely/not/a/real/path",
            "https://git.example.com/repo",
        );
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_control_characters() {
        let config = DiscoveryConfig::new("/tmp/\u{0007}repo", "https://git.example.com/repo");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_file_as_root() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("plain.txt");
        std::fs::write(&file, "x").unwrap();
        let config = DiscoveryConfig::new(&file, "https://git.example.com/repo");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_accepts_directory() {
        let dir = tempfile::tempdir().unwrap();
        let config = DiscoveryConfig::new(dir.path(), "https://git.example.com/repo")
            .with_full_scan(true)
            .with_pipeline_name(Some("nightly".to_string()));
        assert!(config.validate().is_ok());
        assert!(config.full_scan);
    }
}
