//! Test utilities for creating temporary directory trees.
//!
//! This module is only compiled for tests and benchmarks.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A temporary directory tree for testing.
///
/// The tree is automatically cleaned up when dropped.
pub struct TestTree {
    dir: TempDir,
}

impl TestTree {
    /// Create a new empty temporary directory.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        Self { dir }
    }

    /// Create a BIDS-like dataset with one `anat` and one `dwi` session per
    /// subject, `subjects` subjects in total.
    pub fn bids(subjects: usize) -> Self {
        let tree = Self::new();
        tree.add_file("dataset_description.json", "{}");
        for i in 1..=subjects {
            let sub = format!("sub-{:02}", i);
            tree.add_file(&format!("{sub}/anat/{sub}_T1w.nii.gz"), "t1w");
            tree.add_file(&format!("{sub}/dwi/{sub}_dwi.nii.gz"), "dwi data");
            tree.add_file(&format!("{sub}/dwi/{sub}_dwi.bval"), "0 1000");
        }
        tree
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Add a file, creating parent directories as needed.
    pub fn add_file(&self, path: &str, content: &str) -> PathBuf {
        let full_path = self.dir.path().join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        fs::write(&full_path, content).expect("Failed to write file");
        full_path
    }

    /// Add an empty directory, creating parents as needed.
    pub fn add_dir(&self, path: &str) -> PathBuf {
        let full_path = self.dir.path().join(path);
        fs::create_dir_all(&full_path).expect("Failed to create dir");
        full_path
    }

    /// Remove a file or directory tree.
    pub fn remove(&self, path: &str) {
        let full_path = self.dir.path().join(path);
        if full_path.is_dir() {
            fs::remove_dir_all(&full_path).expect("Failed to remove dir");
        } else {
            fs::remove_file(&full_path).expect("Failed to remove file");
        }
    }
}

impl Default for TestTree {
    fn default() -> Self {
        Self::new()
    }
}
