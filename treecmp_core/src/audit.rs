use crate::comparison::{Comparator, Direction};
use crate::listing::write_listing;
use crate::picker::FolderPicker;
use crate::report::ReportGenerator;
use crate::scanner::TreeScanner;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;
use treecmp_common::{AppConfig, ComparisonResult, Result};

pub const FIRST_FOLDER_PROMPT: &str = "Please select the first folder...";
pub const SECOND_FOLDER_PROMPT: &str = "Please select the second folder...";

const FIRST_LISTING_PREFIX: &str = "folder1_";
const SECOND_LISTING_PREFIX: &str = "folder2_";

/// Result of one audit run
#[derive(Debug)]
pub enum AuditOutcome {
    /// The operator did not choose one of the folders; nothing was written
    Cancelled,
    Completed(AuditSummary),
}

/// Everything an audit run produced, in terms of the two selected folders
#[derive(Debug, Clone, Serialize)]
pub struct AuditSummary {
    pub folder1: PathBuf,
    pub folder2: PathBuf,
    pub folder1_files: usize,
    pub folder2_files: usize,
    pub folder1_bytes: u64,
    pub folder2_bytes: u64,
    pub skipped_entries: usize,
    pub direction: Direction,
    pub primary: PathBuf,
    pub secondary: PathBuf,
    pub result: ComparisonResult,
    pub report_path: PathBuf,
    pub folder1_listing: PathBuf,
    pub folder2_listing: PathBuf,
}

/// Runs the folder audit end to end: select, scan, list, compare, report
pub struct FolderAudit {
    scanner: TreeScanner,
    output_dir: Option<PathBuf>,
    listing_dir: Option<PathBuf>,
}

impl FolderAudit {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            scanner: TreeScanner::new(config),
            output_dir: config.output_dir.clone(),
            listing_dir: config.listing_dir.clone(),
        }
    }

    pub fn run(&self, picker: &mut dyn FolderPicker) -> Result<AuditOutcome> {
        let Some(folder1) = pick(picker, FIRST_FOLDER_PROMPT) else {
            return Ok(AuditOutcome::Cancelled);
        };
        let Some(folder2) = pick(picker, SECOND_FOLDER_PROMPT) else {
            return Ok(AuditOutcome::Cancelled);
        };

        info!("Comparing:");
        info!("  Folder 1: {}", folder1.display());
        info!("  Folder 2: {}", folder2.display());

        let files1 = self.scanner.scan(&folder1)?;
        let files2 = self.scanner.scan(&folder2)?;

        let listing_dir = self.listing_dir.as_deref();
        let folder1_listing = write_listing(&files1, FIRST_LISTING_PREFIX, listing_dir)?;
        let folder2_listing = write_listing(&files2, SECOND_LISTING_PREFIX, listing_dir)?;

        let direction = Direction::choose(&files1, &files2);
        let (primary_files, secondary_files) = direction.arrange(&files1, &files2);
        let (primary, secondary) = direction.arrange(folder1.clone(), folder2.clone());
        info!("Primary folder: {}", primary.display());

        let result = Comparator::compare(primary_files, secondary_files);
        let report = ReportGenerator::generate_report(&primary, &secondary, &result);
        let output_dir = self.resolve_output_dir()?;
        let report_path = ReportGenerator::write_report(&output_dir, &report)?;

        Ok(AuditOutcome::Completed(AuditSummary {
            folder1,
            folder2,
            folder1_files: files1.len(),
            folder2_files: files2.len(),
            folder1_bytes: files1.total_size(),
            folder2_bytes: files2.total_size(),
            skipped_entries: files1.skipped() + files2.skipped(),
            direction,
            primary,
            secondary,
            result,
            report_path,
            folder1_listing,
            folder2_listing,
        }))
    }

    fn resolve_output_dir(&self) -> Result<PathBuf> {
        match &self.output_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(std::env::current_dir()?),
        }
    }
}

/// Empty selections count as cancelled
fn pick(picker: &mut dyn FolderPicker, prompt: &str) -> Option<PathBuf> {
    picker
        .pick_folder(prompt)
        .filter(|path| !path.as_os_str().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::picker::PresetFolders;
    use crate::report::REPORT_FILE_NAME;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;
    use treecmp_common::{ScanError, TreeCmpError};

    struct Fixture {
        _temp: TempDir,
        folder1: PathBuf,
        folder2: PathBuf,
        out: PathBuf,
    }

    impl Fixture {
        fn new() -> Self {
            let temp = TempDir::new().unwrap();
            let folder1 = temp.path().join("left");
            let folder2 = temp.path().join("right");
            let out = temp.path().join("out");
            for dir in [&folder1, &folder2, &out] {
                fs::create_dir(dir).unwrap();
            }
            Self {
                _temp: temp,
                folder1,
                folder2,
                out,
            }
        }

        fn write(&self, dir: &Path, path: &str, size: usize) {
            let file = dir.join(path);
            fs::create_dir_all(file.parent().unwrap()).unwrap();
            fs::write(file, vec![b'x'; size]).unwrap();
        }

        fn audit(&self) -> FolderAudit {
            FolderAudit::new(&AppConfig {
                output_dir: Some(self.out.clone()),
                listing_dir: Some(self.out.clone()),
                ..AppConfig::default()
            })
        }

        fn run(&self) -> AuditSummary {
            let mut picker = PresetFolders::new(vec![self.folder1.clone(), self.folder2.clone()]);
            match self.audit().run(&mut picker).unwrap() {
                AuditOutcome::Completed(summary) => summary,
                AuditOutcome::Cancelled => panic!("audit was cancelled"),
            }
        }
    }

    #[test]
    fn test_larger_folder_becomes_primary() {
        let fx = Fixture::new();
        fx.write(&fx.folder1, "a.txt", 10);
        fx.write(&fx.folder1, "b.txt", 20);
        fx.write(&fx.folder1, "nested/c.txt", 5);
        fx.write(&fx.folder2, "a.txt", 10);

        let summary = fx.run();

        assert_eq!(summary.direction, Direction::FirstIsPrimary);
        assert_eq!(summary.primary, fx.folder1);
        assert_eq!(summary.secondary, fx.folder2);
        let missing: Vec<&str> = summary
            .result
            .missing_from_secondary
            .iter()
            .map(|e| e.path.as_str())
            .collect();
        assert_eq!(missing, vec!["b.txt", "nested/c.txt"]);
        assert_eq!(summary.report_path, fx.out.join(REPORT_FILE_NAME));
        assert_eq!((summary.folder1_files, summary.folder1_bytes), (3, 35));
        assert_eq!((summary.folder2_files, summary.folder2_bytes), (1, 10));

        let report = fs::read_to_string(&summary.report_path).unwrap();
        assert!(report.contains(&format!("Folder 1 name and path = {}", fx.folder1.display())));
        assert!(report.contains("[c.txt || nested/c.txt]"));
    }

    #[test]
    fn test_equal_counts_make_second_folder_primary() {
        let fx = Fixture::new();
        fx.write(&fx.folder1, "same.txt", 10);
        fx.write(&fx.folder2, "same.txt", 15);

        let summary = fx.run();

        assert_eq!(summary.direction, Direction::SecondIsPrimary);
        assert_eq!(summary.primary, fx.folder2);
        let mismatch = &summary.result.size_mismatches[0];
        assert_eq!(mismatch.primary.size, 15);
        assert_eq!(mismatch.secondary_size, 10);

        let report = fs::read_to_string(&summary.report_path).unwrap();
        assert!(report.contains("[same.txt || same.txt || 15 bytes vs 10 bytes]"));
    }

    #[test]
    fn test_listings_written_for_both_folders() {
        let fx = Fixture::new();
        fx.write(&fx.folder1, "one.bin", 3);
        fx.write(&fx.folder2, "two.bin", 4);

        let summary = fx.run();

        assert_eq!(
            fs::read_to_string(&summary.folder1_listing).unwrap(),
            "one.bin\t3 bytes\n"
        );
        assert_eq!(
            fs::read_to_string(&summary.folder2_listing).unwrap(),
            "two.bin\t4 bytes\n"
        );
        let name = summary.folder2_listing.file_name().unwrap().to_string_lossy();
        assert!(name.starts_with("folder2_"));
    }

    #[test]
    fn test_cancelled_selection_writes_nothing() {
        let fx = Fixture::new();

        let mut only_one = PresetFolders::new(vec![fx.folder1.clone()]);
        assert!(matches!(
            fx.audit().run(&mut only_one).unwrap(),
            AuditOutcome::Cancelled
        ));

        let mut empty_choice = PresetFolders::new(vec![PathBuf::new(), fx.folder2.clone()]);
        assert!(matches!(
            fx.audit().run(&mut empty_choice).unwrap(),
            AuditOutcome::Cancelled
        ));

        assert_eq!(fs::read_dir(&fx.out).unwrap().count(), 0);
    }

    #[test]
    fn test_missing_folder_reports_scan_error() {
        let fx = Fixture::new();
        let missing = fx.folder2.join("not-there");

        let mut picker = PresetFolders::new(vec![fx.folder1.clone(), missing.clone()]);
        let err = fx.audit().run(&mut picker).unwrap_err();

        match err {
            TreeCmpError::Scan(ScanError::NotFound(path)) => assert_eq!(path, missing),
            other => panic!("unexpected error: {other}"),
        }
        assert!(!fx.out.join(REPORT_FILE_NAME).exists());
    }
}
