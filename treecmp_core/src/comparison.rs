use serde::Serialize;
use tracing::{debug, info};
use treecmp_common::{ComparisonResult, FileSet, SizeMismatch};

/// Which of the two selected folders acts as the primary set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Direction {
    /// Folder 1 is primary, folder 2 is secondary
    FirstIsPrimary,
    /// Folder 2 is primary, folder 1 is secondary
    SecondIsPrimary,
}

impl Direction {
    /// Folder 1 becomes primary only when it holds strictly more files;
    /// on a tie folder 2 is primary.
    pub fn choose(first: &FileSet, second: &FileSet) -> Self {
        if first.len() > second.len() {
            Direction::FirstIsPrimary
        } else {
            Direction::SecondIsPrimary
        }
    }

    /// Order a pair of (folder 1, folder 2) values as (primary, secondary)
    pub fn arrange<T>(self, first: T, second: T) -> (T, T) {
        match self {
            Direction::FirstIsPrimary => (first, second),
            Direction::SecondIsPrimary => (second, first),
        }
    }
}

/// Size-based comparison of two file sets
pub struct Comparator;

impl Comparator {
    /// Check every primary file against the secondary set.
    ///
    /// Files missing from `secondary` and files whose byte counts differ are
    /// reported in ascending path order. Files found only in `secondary` are
    /// not reported.
    pub fn compare(primary: &FileSet, secondary: &FileSet) -> ComparisonResult {
        info!(
            "Comparing {} primary entries with {} secondary entries",
            primary.len(),
            secondary.len()
        );

        let mut result = ComparisonResult::default();

        for entry in primary.iter() {
            match secondary.get(&entry.path) {
                None => result.missing_from_secondary.push(entry.clone()),
                Some(other) if other.size != entry.size => {
                    result.size_mismatches.push(SizeMismatch {
                        primary: entry.clone(),
                        secondary_size: other.size,
                    });
                }
                Some(_) => {}
            }
        }

        debug!(
            "{} missing from secondary, {} size mismatches",
            result.missing_from_secondary.len(),
            result.size_mismatches.len()
        );
        result
    }
}
