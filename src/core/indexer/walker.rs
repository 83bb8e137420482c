//! File system walker with pattern-based filtering.
//!
//! Traverses directory trees and hands matching files to a sink as
//! they are found, so a consumer can start before traversal ends.
//! A bad root is a configuration error; unreadable entries below the
//! root are logged and skipped.

use glob::Pattern;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::core::error::{QuarryError, Result};

/// File system walker with pattern-based filtering
#[derive(Debug, Clone)]
pub struct FileWalker {
    /// Patterns to include (e.g., "*.md", "*.pdf")
    include_patterns: Vec<Pattern>,

    /// Patterns to exclude (e.g., "**/target/**", "**/.git/**")
    exclude_patterns: Vec<Pattern>,

    /// Maximum file size in bytes (skip larger files)
    max_file_size_bytes: u64,
}

impl FileWalker {
    /// Create a new file walker
    ///
    /// # Arguments
    ///
    /// * `include_patterns` - Glob patterns for files to include
    ///   (empty includes everything)
    /// * `exclude_patterns` - Glob patterns for files to exclude
    /// * `max_file_size_mb` - Maximum file size in megabytes
    ///
    /// # Returns
    ///
    /// A new `FileWalker` instance or an error if patterns are
    /// invalid
    pub fn new(
        include_patterns: Vec<String>,
        exclude_patterns: Vec<String>,
        max_file_size_mb: usize,
    ) -> Result<Self> {
        let include = parse_patterns(include_patterns, "include")?;
        let exclude = parse_patterns(exclude_patterns, "exclude")?;

        Ok(Self {
            include_patterns: include,
            exclude_patterns: exclude,
            max_file_size_bytes: (max_file_size_mb as u64) * 1024 * 1024,
        })
    }

    /// Walk `root`, passing every matching file to `sink`
    ///
    /// Traversal stops early when `sink` returns `false`.
    ///
    /// # Returns
    ///
    /// The number of files `sink` accepted, or a `ConfigError` if
    /// the root cannot be traversed
    pub fn walk<F>(&self, root: &Path, mut sink: F) -> Result<usize>
    where
        F: FnMut(PathBuf) -> bool,
    {
        if !root.is_dir() {
            return Err(QuarryError::ConfigError(format!(
                "Index root {} does not exist or is not a directory",
                root.display()
            )));
        }

        let mut sent = 0;

        for entry in WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| self.should_process_entry(e, root))
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => {
                    return Err(QuarryError::ConfigError(format!(
                        "Cannot traverse {}: {e}",
                        root.display()
                    )));
                }
                Err(e) => {
                    tracing::warn!("Walk error: {}", e);
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();

            if let Ok(metadata) = entry.metadata() {
                if metadata.len() > self.max_file_size_bytes {
                    tracing::debug!(
                        "Skipping large file: {:?} ({} bytes)",
                        path,
                        metadata.len()
                    );
                    continue;
                }
            }

            if !self.matches_patterns(path) {
                continue;
            }

            if !sink(path.to_path_buf()) {
                tracing::debug!("Traversal stopped after {} files", sent);
                break;
            }
            sent += 1;
        }

        Ok(sent)
    }

    /// Collect all matching files from a directory
    pub fn collect_files(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        self.walk(root, |path| {
            files.push(path);
            true
        })?;
        Ok(files)
    }

    /// Determine if a directory entry should be processed
    ///
    /// Filters out hidden directories and excluded patterns.
    /// Never filters the root directory itself.
    fn should_process_entry(&self, entry: &DirEntry, root: &Path) -> bool {
        let path = entry.path();

        if path == root {
            return true;
        }

        if entry.file_type().is_dir() {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if name.starts_with('.') {
                    return false;
                }
            }

            // Skip entire directory trees early
            if self.exclude_patterns.iter().any(|p| p.matches_path(path)) {
                tracing::debug!("Skipping excluded directory: {:?}", path);
                return false;
            }
        }

        true
    }

    /// Check if a file path matches the include/exclude patterns
    fn matches_patterns(&self, path: &Path) -> bool {
        // Non-UTF-8 names are matched in the same lossy form used for document keys
        if path.to_str().is_none() {
            tracing::debug!("Matching non-UTF-8 path lossily: {:?}", path);
        }
        let path_str = path.to_string_lossy();
        let file_name = path.file_name().map(|f| f.to_string_lossy());

        let matches_include = self.include_patterns.is_empty()
            || self.include_patterns.iter().any(|p| {
                p.matches(&path_str) || file_name.as_deref().is_some_and(|f| p.matches(f))
            });

        matches_include
            && !self
                .exclude_patterns
                .iter()
                .any(|p| p.matches(&path_str) || p.matches_path(path))
    }
}

fn parse_patterns(patterns: Vec<String>, kind: &str) -> Result<Vec<Pattern>> {
    patterns
        .into_iter()
        .map(|p| {
            Pattern::new(&p)
                .map_err(|e| QuarryError::ConfigError(format!("Invalid {kind} pattern '{p}': {e}")))
        })
        .collect()
}
