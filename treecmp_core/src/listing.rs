use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::Builder;
use tracing::debug;
use treecmp_common::{FileSet, ReportWriteError};

const LISTING_SUFFIX: &str = ".txt";

/// Write every entry of `files` to a new, persisted temporary file named
/// `<prefix><unique>.txt`, one `<path>\t<size> bytes` line per entry in path
/// order. The file lands in `dir`, or the system temp directory when `None`.
pub fn write_listing(
    files: &FileSet,
    prefix: &str,
    dir: Option<&Path>,
) -> Result<PathBuf, ReportWriteError> {
    let target_dir = dir.map(Path::to_path_buf).unwrap_or_else(std::env::temp_dir);
    let pattern = target_dir.join(format!("{prefix}*{LISTING_SUFFIX}"));

    let mut named = Builder::new()
        .prefix(prefix)
        .suffix(LISTING_SUFFIX)
        .tempfile_in(&target_dir)
        .map_err(|e| ReportWriteError::new(&pattern, e))?;
    let path = named.path().to_path_buf();

    {
        let mut writer = BufWriter::new(named.as_file_mut());
        for entry in files.iter() {
            writeln!(writer, "{}\t{} bytes", entry.path, entry.size)
                .map_err(|e| ReportWriteError::new(&path, e))?;
        }
        writer.flush().map_err(|e| ReportWriteError::new(&path, e))?;
    }

    let (_file, path) = named
        .keep()
        .map_err(|e| ReportWriteError::new(&path, e.error))?;

    debug!("Wrote {} listing lines to {}", files.len(), path.display());
    Ok(path)
}
