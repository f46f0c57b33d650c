use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;
use treecmp_common::{ComparisonResult, FileEntry, ReportWriteError, SizeMismatch};

/// Name of the report written into the output directory
pub const REPORT_FILE_NAME: &str = "Report-File.txt";

const TITLE_RULE: &str = "=====================";
const SECTION_RULE: &str = "=====================================";
/// Printed after a non-empty missing-files section, one per line
const CONTINUATION_LINES: usize = 4;

/// Renders comparison results as the plain-text audit report
pub struct ReportGenerator;

impl ReportGenerator {
    /// Render the report for `result`, labelling `primary` as Folder 1 and
    /// `secondary` as Folder 2.
    pub fn generate_report(primary: &Path, secondary: &Path, result: &ComparisonResult) -> String {
        let mut out = String::new();

        push_line(&mut out, "File Comparison Report");
        push_line(&mut out, TITLE_RULE);
        push_line(&mut out, "");
        push_line(&mut out, "Legend:");
        push_line(&mut out, &format!("Folder 1 name and path = {}", primary.display()));
        push_line(&mut out, &format!("Folder 2 name and path = {}", secondary.display()));

        push_line(&mut out, SECTION_RULE);
        push_line(
            &mut out,
            &format!(
                "List of Files that exist in {} folder (Longer list) and not in {} folder (Short list)",
                folder_name(primary),
                folder_name(secondary)
            ),
        );
        push_line(&mut out, SECTION_RULE);
        for entry in &result.missing_from_secondary {
            push_line(&mut out, &missing_line(entry));
        }
        if !result.missing_from_secondary.is_empty() {
            for _ in 0..CONTINUATION_LINES {
                push_line(&mut out, ".");
            }
        }

        push_line(&mut out, "");
        push_line(&mut out, SECTION_RULE);
        push_line(&mut out, "List of Files with Different Sizes in Both Folders");
        push_line(&mut out, SECTION_RULE);
        for mismatch in &result.size_mismatches {
            push_line(&mut out, &mismatch_line(mismatch));
        }

        out
    }

    /// Write `report` to `Report-File.txt` in `output_dir`, replacing any
    /// report left by an earlier run.
    pub fn write_report(output_dir: &Path, report: &str) -> Result<PathBuf, ReportWriteError> {
        let path = output_dir.join(REPORT_FILE_NAME);
        let file = File::create(&path).map_err(|e| ReportWriteError::new(&path, e))?;

        let mut writer = BufWriter::new(file);
        writer
            .write_all(report.as_bytes())
            .and_then(|_| writer.flush())
            .map_err(|e| ReportWriteError::new(&path, e))?;

        info!("Report written to {}", path.display());
        Ok(path)
    }
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(line);
    out.push('\n');
}

fn missing_line(entry: &FileEntry) -> String {
    format!("[{} || {}]", entry.file_name(), entry.path)
}

fn mismatch_line(mismatch: &SizeMismatch) -> String {
    format!(
        "[{} || {} || {} bytes vs {} bytes]",
        mismatch.primary.file_name(),
        mismatch.primary.path,
        mismatch.primary.size,
        mismatch.secondary_size
    )
}

/// Last component of a folder path, or the whole path when it has none (e.g. `/`)
fn folder_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
