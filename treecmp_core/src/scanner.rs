use ignore::gitignore::{Gitignore, GitignoreBuilder};
use jwalk::{Parallelism, WalkDir};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, info, warn};
use treecmp_common::{AppConfig, FileEntry, FileSet, ScanError};

/// Serial folder scanner using jwalk.
///
/// Only regular files become entries. Symlinks are skipped unless
/// `follow_symlinks` is set, in which case the walker follows them and
/// reports link cycles as per-entry errors.
pub struct TreeScanner {
    follow_symlinks: bool,
    custom_ignore: Option<Gitignore>,
}

impl TreeScanner {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            follow_symlinks: config.follow_symlinks,
            custom_ignore: Self::build_custom_ignore(config),
        }
    }

    /// Build a Gitignore from custom ignore patterns in config
    fn build_custom_ignore(config: &AppConfig) -> Option<Gitignore> {
        if config.ignore_patterns.is_empty() {
            return None;
        }

        let mut builder = GitignoreBuilder::new("");
        for pattern in &config.ignore_patterns {
            if let Err(err) = builder.add_line(None, pattern) {
                warn!("Ignoring invalid ignore pattern '{}': {}", pattern, err);
            } else {
                debug!("Added custom ignore pattern: {}", pattern);
            }
        }

        match builder.build() {
            Ok(ignore) => Some(ignore),
            Err(e) => {
                warn!("Failed to build ignore patterns: {}", e);
                None
            }
        }
    }

    /// Scan a folder and return every regular file below it with its size.
    ///
    /// Fails only when the root itself is missing, not a directory or
    /// unreadable. Entries that cannot be read below the root are logged and
    /// counted in [`FileSet::skipped`].
    pub fn scan(&self, root: &Path) -> Result<FileSet, ScanError> {
        check_root(root)?;

        let walker = WalkDir::new(root)
            .follow_links(self.follow_symlinks)
            .skip_hidden(false)
            .sort(true)
            .parallelism(Parallelism::Serial);

        let mut entries = Vec::new();
        let mut skipped = 0usize;

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry under {}: {}", root.display(), e);
                    skipped += 1;
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let relative_path = match path.strip_prefix(root) {
                Ok(relative) => relative,
                Err(e) => {
                    warn!("Skipping {}: {}", path.display(), e);
                    skipped += 1;
                    continue;
                }
            };

            if self.should_ignore_with_parents(relative_path) {
                continue;
            }

            let metadata = match entry.metadata() {
                Ok(metadata) => metadata,
                Err(e) => {
                    warn!("Skipping {}: cannot read metadata: {}", path.display(), e);
                    skipped += 1;
                    continue;
                }
            };

            entries.push(FileEntry::new(relative_key(relative_path), metadata.len()));
        }

        info!(
            "Scanned {} files from {} ({} skipped)",
            entries.len(),
            root.display(),
            skipped
        );
        Ok(FileSet::new(root, entries, skipped))
    }

    /// Check if a file or any of its parent directories should be ignored
    fn should_ignore_with_parents(&self, path: &Path) -> bool {
        let Some(ref custom_ignore) = self.custom_ignore else {
            return false;
        };

        if custom_ignore.matched(path, false).is_ignore() {
            return true;
        }

        let mut current = path;
        while let Some(parent) = current.parent() {
            if !parent.as_os_str().is_empty() && custom_ignore.matched(parent, true).is_ignore() {
                return true;
            }
            current = parent;
        }
        false
    }
}

fn check_root(root: &Path) -> Result<(), ScanError> {
    let metadata = fs::metadata(root).map_err(|e| match e.kind() {
        ErrorKind::NotFound => ScanError::NotFound(root.to_path_buf()),
        _ => ScanError::Unreadable {
            path: root.to_path_buf(),
            source: e,
        },
    })?;

    if !metadata.is_dir() {
        return Err(ScanError::NotADirectory(root.to_path_buf()));
    }

    fs::read_dir(root).map_err(|e| ScanError::Unreadable {
        path: root.to_path_buf(),
        source: e,
    })?;

    Ok(())
}

/// Relative path as a `/`-joined key, independent of the platform separator
fn relative_key(relative: &Path) -> String {
    relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
