/// Error taxonomy for scanning.
///
/// Only [`ScanError`] ever reaches the caller of a scan. Everything below the
/// root is classified as an [`EntryError`], counted, and the affected entry
/// or subtree is left out of the tree.
use crate::model::VolumeTag;
use crate::reparse::ReparseTarget;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// A scan that produced no tree.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The root could not be queried or enumerated at all.
    #[error("cannot scan {}: {source}", path.display())]
    RootUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The root itself is a reparse point that leaves the volume it names.
    #[error("{} is a reparse point leading off volume {volume} ({target:?})", path.display())]
    RootOffVolume {
        path: PathBuf,
        volume: VolumeTag,
        target: ReparseTarget,
    },

    #[error("scan cancelled")]
    Cancelled,
}

/// Failure to read a reparse point's target.
#[derive(Debug, Error)]
pub enum ReparseError {
    #[error("cannot open reparse point: {0}")]
    Open(#[source] io::Error),

    #[error("FSCTL_GET_REPARSE_POINT failed: {0}")]
    DeviceControl(#[source] io::Error),

    #[error("unsupported reparse tag {0:#010x}")]
    UnsupportedTag(u32),

    #[error("malformed reparse buffer: {0}")]
    Malformed(&'static str),
}

/// Why an entry below the root was left out of the tree.
#[derive(Debug, Error)]
pub enum EntryError {
    #[error("access denied: {}", path.display())]
    AccessDenied { path: PathBuf },

    /// A reparse point whose target could not be pinned to the scanned volume.
    #[error("{} leaves the scanned volume ({target:?})", path.display())]
    ForeignReparse { path: PathBuf, target: ReparseTarget },

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl EntryError {
    /// Classify an I/O failure on `path`.
    pub fn from_io(path: PathBuf, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::PermissionDenied {
            Self::AccessDenied { path }
        } else {
            Self::Io { path, source }
        }
    }

    pub fn path(&self) -> &PathBuf {
        match self {
            Self::AccessDenied { path } | Self::ForeignReparse { path, .. } | Self::Io { path, .. } => {
                path
            }
        }
    }
}
