//! Path enumeration — walk once, hand every non-directory entry to the producer
//!
//! Traversal errors are kept as [`SkippedEntry`] values instead of being
//! dropped, so a report always says which parts of the tree were not seen.

use crate::report::SkippedEntry;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Ordered list of paths to scan, plus everything the walk could not visit
#[derive(Debug, Clone)]
pub struct FileIndex {
    pub root: PathBuf,
    pub files: Vec<PathBuf>,
    pub skipped: Vec<SkippedEntry>,
}

impl FileIndex {
    /// Resolve `root` into the list of files to scan.
    ///
    /// Anything that is not a directory (including a path that does not
    /// exist) yields a singleton list; the read failure then surfaces in that
    /// file's report. Directories are walked recursively in filesystem order
    /// and never appear in the output. Symlinks are only followed when
    /// `follow_symlinks` is set, in which case walkdir reports cycles as
    /// skipped entries.
    pub fn build(root: &Path, follow_symlinks: bool) -> Self {
        let is_dir = std::fs::metadata(root).map(|m| m.is_dir()).unwrap_or(false);
        if !is_dir {
            return Self {
                root: root.to_path_buf(),
                files: vec![root.to_path_buf()],
                skipped: Vec::new(),
            };
        }

        let mut files = Vec::new();
        let mut skipped = Vec::new();

        for entry in WalkDir::new(root).follow_links(follow_symlinks) {
            match entry {
                Ok(e) if e.file_type().is_dir() => {}
                Ok(e) => files.push(e.into_path()),
                Err(e) => {
                    let path = e.path().map(Path::to_path_buf);
                    tracing::warn!(
                        "Skipping {}: {}",
                        path.as_deref().unwrap_or(root).display(),
                        e
                    );
                    skipped.push(SkippedEntry {
                        path,
                        reason: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            "FileIndex: {} files under {} ({} skipped)",
            files.len(),
            root.display(),
            skipped.len()
        );

        Self {
            root: root.to_path_buf(),
            files,
            skipped,
        }
    }

    pub fn total_files(&self) -> usize {
        self.files.len()
    }
}
