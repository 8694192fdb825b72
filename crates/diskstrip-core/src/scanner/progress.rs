/// Scan progress reporting: messages sent from the scan thread to the
/// frontend via a crossbeam channel.
use super::stats::ScanStats;
use crate::error::ScanError;
use crate::model::FileTree;
use std::time::Duration;

/// Progress updates sent from the scan thread.
///
/// Every scan ends with exactly one of `Complete`, `Failed` or `Cancelled`.
#[derive(Debug)]
pub enum ScanProgress {
    /// Periodic update with running totals.
    Update {
        dirs_scanned: u64,
        files_found: u64,
        current_path: String,
    },
    /// An entry below the root was left out (access denied, foreign link, I/O).
    Error { path: String, message: String },
    /// Scanning completed; the tree is already aggregated.
    Complete {
        tree: Box<FileTree>,
        stats: ScanStats,
        duration: Duration,
    },
    /// The root could not be scanned at all.
    Failed(ScanError),
    /// Scan was cancelled by the caller.
    Cancelled,
}

impl ScanProgress {
    /// `true` for the message that ends a scan.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Complete { .. } | Self::Failed(_) | Self::Cancelled
        )
    }
}
