/// Recursive tree builder, the single-threaded scanner.
///
/// Walks the root depth-first with `std::fs::read_dir`, asking the
/// [`ReparseResolver`] about every directory before descending into it.
/// A directory that is a reparse point leading off the root's volume is
/// pruned together with everything beneath it, wherever it appears.
///
/// Entries are classified from the enumeration itself; only directories
/// and links are put to the probe, since only they can lead elsewhere.
///
/// Nothing below the root can abort the scan: unreadable entries are
/// counted in [`ScanStats`] and left out. A directory whose enumeration is
/// refused stays in the tree with no children, while one that fails for
/// any other reason is left out. Only a root that cannot be used at all,
/// or cancellation, ends the build with an error.
use super::progress::ScanProgress;
use super::stats::ScanStats;
use super::{ScanOptions, ScanOutcome};
use crate::error::{EntryError, ScanError};
use crate::model::{FileNode, FileTree, NodeIndex};
use crate::platform::{FileAttributes, ReparseProbe};
use crate::reparse::ReparseResolver;
use compact_str::CompactString;
use crossbeam_channel::Sender;
use std::ffi::OsStr;
use std::fs::{self, DirEntry, ReadDir};
use std::io;
use std::path::{Path, MAIN_SEPARATOR};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Send a progress update every this many enumerated directories.
pub const PROGRESS_INTERVAL: u64 = 256;

/// Initial arena capacity.
const INITIAL_CAPACITY: usize = 4_096;

/// Builds a [`FileTree`] for one root.
pub struct TreeBuilder<P> {
    probe: P,
    options: ScanOptions,
    cancel_flag: Option<Arc<AtomicBool>>,
    progress_tx: Option<Sender<ScanProgress>>,
}

impl<P: ReparseProbe> TreeBuilder<P> {
    pub fn new(probe: P, options: ScanOptions) -> Self {
        Self {
            probe,
            options,
            cancel_flag: None,
            progress_tx: None,
        }
    }

    /// Stop at the next directory boundary once `flag` is set.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel_flag = Some(flag);
        self
    }

    /// Report progress and left-out entries on `tx`.
    pub fn with_progress(mut self, tx: Sender<ScanProgress>) -> Self {
        self.progress_tx = Some(tx);
        self
    }

    /// Scan `root`. The returned tree is not yet aggregated.
    ///
    /// A relative root is made absolute first, so its volume and its
    /// display name come from the location actually scanned.
    pub fn build(self, root: &Path) -> Result<ScanOutcome, ScanError> {
        let root = std::path::absolute(root).map_err(|source| ScanError::RootUnavailable {
            path: root.to_path_buf(),
            source,
        })?;
        let root = root.as_path();
        let resolver = ReparseResolver::new(self.probe, root);

        let attrs = resolver
            .probe()
            .attributes(root)
            .map_err(|source| ScanError::RootUnavailable {
                path: root.to_path_buf(),
                source,
            })?;
        if !attrs.directory {
            return Err(ScanError::RootUnavailable {
                path: root.to_path_buf(),
                source: io::Error::new(io::ErrorKind::InvalidInput, "not a directory"),
            });
        }

        let mut walk = Walk {
            resolver,
            tree: FileTree::with_capacity(&root_display_name(root), INITIAL_CAPACITY),
            stats: ScanStats::default(),
            max_depth: self.options.max_depth,
            cancel_flag: self.cancel_flag,
            progress_tx: self.progress_tx,
        };

        if let Some(target) = walk.resolver.target_of(root, attrs) {
            if !target.is_same_volume() {
                return Err(ScanError::RootOffVolume {
                    path: root.to_path_buf(),
                    volume: walk.resolver.volume(),
                    target,
                });
            }
            walk.stats.same_volume_reparse += 1;
        }

        if walk.max_depth > 0 {
            walk.check_cancelled()?;
            let entries = fs::read_dir(root).map_err(|source| ScanError::RootUnavailable {
                path: root.to_path_buf(),
                source,
            })?;
            let root_idx = walk.tree.root;
            walk.fill_dir(root, entries, root_idx, 0)?;
        }

        debug!(
            "Walk of {} complete: {} dirs, {} files, {} left out",
            root.display(),
            walk.stats.directories,
            walk.stats.files,
            walk.stats.error_count()
        );

        Ok(ScanOutcome {
            tree: walk.tree,
            stats: walk.stats,
        })
    }
}

/// Mutable state of one build.
struct Walk<P> {
    resolver: ReparseResolver<P>,
    tree: FileTree,
    stats: ScanStats,
    max_depth: usize,
    cancel_flag: Option<Arc<AtomicBool>>,
    progress_tx: Option<Sender<ScanProgress>>,
}

impl<P: ReparseProbe> Walk<P> {
    /// Add the already opened `entries` of `path` under `dir`, which sits
    /// at `depth`.
    fn fill_dir(
        &mut self,
        path: &Path,
        entries: ReadDir,
        dir: NodeIndex,
        depth: usize,
    ) -> Result<(), ScanError> {
        self.stats.directories += 1;
        self.report_progress(path);

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(source) => {
                    self.record(EntryError::from_io(path.to_path_buf(), source));
                    continue;
                }
            };
            // DirEntry::file_type does not follow links.
            let file_type = match entry.file_type() {
                Ok(file_type) => file_type,
                Err(source) => {
                    self.record(EntryError::from_io(entry.path(), source));
                    continue;
                }
            };
            if !file_type.is_dir() && !file_type.is_symlink() {
                self.add_file(&entry, dir);
                continue;
            }

            let child_path = entry.path();
            let attrs = match self.resolver.probe().attributes(&child_path) {
                Ok(attrs) => attrs,
                Err(source) => {
                    // May be a reparse point; never descend blind.
                    self.record(EntryError::from_io(child_path, source));
                    continue;
                }
            };
            if attrs.directory {
                self.add_dir(&child_path, &entry.file_name(), dir, depth + 1, attrs)?;
            } else {
                self.add_file(&entry, dir);
            }
        }
        Ok(())
    }

    fn add_dir(
        &mut self,
        path: &Path,
        name: &OsStr,
        parent: NodeIndex,
        depth: usize,
        attrs: FileAttributes,
    ) -> Result<(), ScanError> {
        if let Some(target) = self.resolver.target_of(path, attrs) {
            if !target.is_same_volume() {
                debug!("Pruning {} ({target:?})", path.display());
                self.record(EntryError::ForeignReparse {
                    path: path.to_path_buf(),
                    target,
                });
                return Ok(());
            }
            debug!("Following same-volume reparse point {}", path.display());
            self.stats.same_volume_reparse += 1;
        }

        if depth >= self.max_depth {
            self.link_dir(name, parent);
            return Ok(());
        }
        self.check_cancelled()?;

        match fs::read_dir(path) {
            Ok(entries) => {
                let idx = self.link_dir(name, parent);
                self.fill_dir(path, entries, idx, depth)
            }
            Err(source) if source.kind() == io::ErrorKind::PermissionDenied => {
                // Kept as an empty directory.
                self.link_dir(name, parent);
                self.record(EntryError::AccessDenied {
                    path: path.to_path_buf(),
                });
                Ok(())
            }
            Err(source) => {
                self.record(EntryError::Io {
                    path: path.to_path_buf(),
                    source,
                });
                Ok(())
            }
        }
    }

    fn link_dir(&mut self, name: &OsStr, parent: NodeIndex) -> NodeIndex {
        let node = FileNode::new_dir(CompactString::new(name.to_string_lossy()), Some(parent));
        let idx = self.tree.add_node(node);
        self.tree.add_child(parent, idx);
        idx
    }

    fn add_file(&mut self, entry: &DirEntry, parent: NodeIndex) {
        // DirEntry::metadata does not follow links.
        let size = match entry.metadata() {
            Ok(meta) => meta.len(),
            Err(source) => {
                self.record(EntryError::from_io(entry.path(), source));
                0
            }
        };

        // Zero-length files are left out of the tree.
        if size == 0 {
            self.stats.zero_byte_files += 1;
            return;
        }

        let node = FileNode::new_file(
            CompactString::new(entry.file_name().to_string_lossy()),
            size,
            Some(parent),
        );
        let idx = self.tree.add_node(node);
        self.tree.add_child(parent, idx);
        self.stats.files += 1;
    }

    fn check_cancelled(&self) -> Result<(), ScanError> {
        match &self.cancel_flag {
            Some(flag) if flag.load(Ordering::Relaxed) => Err(ScanError::Cancelled),
            _ => Ok(()),
        }
    }

    fn record(&mut self, err: EntryError) {
        debug!("Left out: {err}");
        if let Some(tx) = &self.progress_tx {
            let _ = tx.send(ScanProgress::Error {
                path: err.path().to_string_lossy().into_owned(),
                message: err.to_string(),
            });
        }
        self.stats.record(err);
    }

    fn report_progress(&self, current: &Path) {
        let Some(tx) = &self.progress_tx else {
            return;
        };
        if self.stats.directories % PROGRESS_INTERVAL == 0 {
            let _ = tx.send(ScanProgress::Update {
                dirs_scanned: self.stats.directories,
                files_found: self.stats.files,
                current_path: current.to_string_lossy().into_owned(),
            });
        }
    }
}

/// Derive a display name for the scan root.
///
/// Only a drive root is reduced to its volume label: `C:\` becomes `C:`.
/// Any other root keeps its whole (absolute) path minus trailing
/// separators rather than just the volume component, so paths rebuilt from
/// the tree with [`FileTree::full_path`] point at real locations.
pub fn root_display_name(path: &Path) -> String {
    let text = path.to_string_lossy();
    let trimmed = text.trim_end_matches(['\\', '/', MAIN_SEPARATOR]);
    if trimmed.is_empty() {
        text.into_owned()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drive_root_name_is_volume_label() {
        assert_eq!(root_display_name(Path::new("C:\\")), "C:");
        assert_eq!(root_display_name(Path::new("D:")), "D:");
    }

    #[test]
    fn folder_root_keeps_full_path() {
        assert_eq!(
            root_display_name(Path::new("C:\\Users\\me\\")),
            "C:\\Users\\me"
        );
        assert_eq!(root_display_name(Path::new("/srv/data/")), "/srv/data");
    }

    #[test]
    fn filesystem_root_is_kept() {
        assert_eq!(root_display_name(Path::new("/")), "/");
    }
}
