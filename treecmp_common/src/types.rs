use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// A regular file found under a scan root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Path relative to the scan root, always `/`-separated
    pub path: String,
    pub size: u64,
}

impl FileEntry {
    pub fn new(path: impl Into<String>, size: u64) -> Self {
        Self {
            path: path.into(),
            size,
        }
    }

    /// Final component of the relative path
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

/// The files of one folder, keyed by relative path.
///
/// Backed by an ordered map so iteration is always lexicographic by path,
/// whatever order the filesystem walk produced. There are no mutators; a set
/// is built once per scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSet {
    root: PathBuf,
    entries: BTreeMap<String, FileEntry>,
    skipped: usize,
}

impl FileSet {
    pub fn new(
        root: impl Into<PathBuf>,
        entries: impl IntoIterator<Item = FileEntry>,
        skipped: usize,
    ) -> Self {
        Self {
            root: root.into(),
            entries: entries
                .into_iter()
                .map(|entry| (entry.path.clone(), entry))
                .collect(),
            skipped,
        }
    }

    /// Folder this set was scanned from (empty for sets built in memory)
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, path: &str) -> Option<&FileEntry> {
        self.entries.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    /// Entries in ascending relative-path order
    pub fn iter(&self) -> impl Iterator<Item = &FileEntry> {
        self.entries.values()
    }

    /// Number of entries left out because of per-file errors during the scan
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Sum of all entry sizes in bytes
    pub fn total_size(&self) -> u64 {
        self.entries.values().map(|entry| entry.size).sum()
    }
}

impl FromIterator<FileEntry> for FileSet {
    fn from_iter<I: IntoIterator<Item = FileEntry>>(iter: I) -> Self {
        FileSet::new(PathBuf::new(), iter, 0)
    }
}

/// A file present on both sides with different byte counts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeMismatch {
    pub primary: FileEntry,
    pub secondary_size: u64,
}

/// Outcome of comparing a primary set against a secondary set.
///
/// Both lists are ordered by the primary entry's relative path. Files that
/// exist only in the secondary set are not represented.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub missing_from_secondary: Vec<FileEntry>,
    pub size_mismatches: Vec<SizeMismatch>,
}

impl ComparisonResult {
    /// True when every primary file exists in the secondary set with the same size
    pub fn is_clean(&self) -> bool {
        self.missing_from_secondary.is_empty() && self.size_mismatches.is_empty()
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// Ignore patterns (e.g., "*.tmp", "node_modules/")
    #[serde(default)]
    pub ignore_patterns: Vec<String>,

    /// Whether to follow symbolic links
    #[serde(default)]
    pub follow_symlinks: bool,

    /// Directory the report file is written to (current directory if unset)
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// Directory for the per-folder listing files (system temp dir if unset)
    #[serde(default)]
    pub listing_dir: Option<PathBuf>,
}
