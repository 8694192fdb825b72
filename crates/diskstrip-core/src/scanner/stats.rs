/// Per-scan counters: what was kept, and what was left out and why.
use crate::error::EntryError;

/// Upper bound on individually retained [`EntryError`]s.
///
/// Counters keep counting past this; only the detailed list stops growing.
pub const MAX_RECORDED_ERRORS: usize = 1_000;

#[derive(Debug, Default)]
pub struct ScanStats {
    /// Directories whose contents were enumerated.
    pub directories: u64,
    /// Files added to the tree.
    pub files: u64,
    /// Zero-length files excluded from the tree.
    pub zero_byte_files: u64,
    pub access_denied: u64,
    /// Reparse points pruned because they lead off the scanned volume.
    pub foreign_reparse: u64,
    /// Reparse points followed because they stay on the scanned volume.
    pub same_volume_reparse: u64,
    pub io_errors: u64,
    /// The first [`MAX_RECORDED_ERRORS`] entries left out of the tree.
    pub errors: Vec<EntryError>,
}

impl ScanStats {
    /// Count `err` under its category and retain it if there is room.
    pub fn record(&mut self, err: EntryError) {
        match err {
            EntryError::AccessDenied { .. } => self.access_denied += 1,
            EntryError::ForeignReparse { .. } => self.foreign_reparse += 1,
            EntryError::Io { .. } => self.io_errors += 1,
        }
        if self.errors.len() < MAX_RECORDED_ERRORS {
            self.errors.push(err);
        }
    }

    /// Total number of entries left out because of an error or a foreign link.
    pub fn error_count(&self) -> u64 {
        self.access_denied + self.foreign_reparse + self.io_errors
    }
}
