pub mod audit;
pub mod comparison;
pub mod listing;
pub mod picker;
pub mod report;
pub mod scanner;

pub use audit::{AuditOutcome, AuditSummary, FolderAudit};
pub use comparison::{Comparator, Direction};
pub use listing::write_listing;
pub use picker::{FolderPicker, PresetFolders};
pub use report::{ReportGenerator, REPORT_FILE_NAME};
pub use scanner::TreeScanner;
