/// Scan session state.
///
/// Owns everything the frontend knows about the current scan: its phase,
/// the in-flight [`ScanHandle`], the finished tree, and the most recent
/// layout. The core never tracks whether a scan is running; this type is
/// where a second scan is refused while one is in flight.
///
/// The scan thread communicates via a channel; state changes happen in
/// [`ScanSession::process_scan_messages`] or [`ScanSession::wait_for_scan`].
use diskstrip_core::layout::{layout_tree, LayoutOptions, Placement, Rect};
use diskstrip_core::model::size::format_size;
use diskstrip_core::model::{EntryKind, FileTree, NodeIndex};
use diskstrip_core::platform::ReparseProbe;
use diskstrip_core::scanner::progress::ScanProgress;
use diskstrip_core::scanner::stats::ScanStats;
use diskstrip_core::scanner::{self, ScanHandle, ScanOptions};
use crossbeam_channel::TryRecvError;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// The current phase of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No scan has been started.
    Idle,
    /// A scan is in flight.
    Scanning,
    /// The last scan finished; a tree may be available (not after a cancel).
    Results,
    /// The last scan could not produce a tree.
    Failed,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("a scan of {} is already in progress", .0.display())]
    Busy(PathBuf),
}

/// Maximum number of scan-progress messages handled per
/// [`ScanSession::process_scan_messages`] call.
pub const MAX_MESSAGES_PER_PUMP: usize = 300;

/// Maximum number of left-out entries kept for display.
pub const MAX_SCAN_ERRORS: usize = 1_000;

/// What the frontend shows for a single node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemInfo {
    pub path: String,
    pub size: u64,
    pub kind: EntryKind,
    /// Direct children of a non-empty directory.
    pub child_count: Option<usize>,
}

impl fmt::Display for ItemInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Path: {}\nSize: {}\nType: {}",
            self.path,
            format_size(self.size),
            self.kind.label()
        )?;
        if let Some(count) = self.child_count {
            write!(f, "\nContains: {count} items")?;
        }
        Ok(())
    }
}

pub struct ScanSession {
    // ── Scan ───────────────────────────────────────────
    pub phase: SessionPhase,
    pub scan_handle: Option<ScanHandle>,
    pub scan_root: Option<PathBuf>,
    pub scan_dirs_found: u64,
    pub scan_files_found: u64,
    pub scan_current_path: String,
    pub scan_error_count: u64,
    pub scan_errors: Vec<(String, String)>,
    pub scan_duration: Option<Duration>,
    pub scan_was_cancelled: bool,
    /// Why the last scan produced no tree.
    pub failure: Option<String>,

    // ── Results ────────────────────────────────────────
    pub tree: Option<FileTree>,
    pub stats: Option<ScanStats>,

    // ── Layout ─────────────────────────────────────────
    /// Placements of the last layout, in drawing order.
    pub placements: Vec<Placement>,
    /// Last rectangle computed for each placed node.
    placement_map: HashMap<NodeIndex, Rect>,
    bounds: Option<Rect>,
    layout_options: LayoutOptions,
}

impl Default for ScanSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanSession {
    pub fn new() -> Self {
        Self {
            phase: SessionPhase::Idle,
            scan_handle: None,
            scan_root: None,
            scan_dirs_found: 0,
            scan_files_found: 0,
            scan_current_path: String::new(),
            scan_error_count: 0,
            scan_errors: Vec::new(),
            scan_duration: None,
            scan_was_cancelled: false,
            failure: None,
            tree: None,
            stats: None,
            placements: Vec::new(),
            placement_map: HashMap::new(),
            bounds: None,
            layout_options: LayoutOptions::default(),
        }
    }

    pub fn is_scanning(&self) -> bool {
        self.scan_handle.is_some()
    }

    /// Start scanning `path` on a background thread.
    ///
    /// Refused while another scan is in flight; the previous results are
    /// discarded only once a new scan actually starts.
    pub fn start_scan(&mut self, path: PathBuf, options: ScanOptions) -> Result<(), SessionError> {
        self.begin(path, |root| scanner::start_scan(root, options))
    }

    /// Like [`start_scan`](Self::start_scan) with a caller-supplied probe.
    pub fn start_scan_with<P>(
        &mut self,
        probe: P,
        path: PathBuf,
        options: ScanOptions,
    ) -> Result<(), SessionError>
    where
        P: ReparseProbe + Send + 'static,
    {
        self.begin(path, |root| scanner::start_scan_with(probe, root, options))
    }

    fn begin(
        &mut self,
        path: PathBuf,
        start: impl FnOnce(PathBuf) -> ScanHandle,
    ) -> Result<(), SessionError> {
        if self.is_scanning() {
            let root = self.scan_root.clone().unwrap_or_default();
            return Err(SessionError::Busy(root));
        }

        // Reset scan state.
        self.phase = SessionPhase::Scanning;
        self.scan_root = Some(path.clone());
        self.scan_dirs_found = 0;
        self.scan_files_found = 0;
        self.scan_current_path = path.to_string_lossy().into_owned();
        self.scan_error_count = 0;
        self.scan_errors.clear();
        self.scan_duration = None;
        self.scan_was_cancelled = false;
        self.failure = None;
        self.tree = None;
        self.stats = None;
        self.clear_layout();

        info!("Session starting scan of {}", path.display());
        self.scan_handle = Some(start(path));
        Ok(())
    }

    /// Ask the running scan, if any, to stop.
    pub fn cancel_scan(&mut self) {
        if let Some(ref handle) = self.scan_handle {
            handle.cancel();
        }
    }

    /// Handle pending scan progress messages without blocking.
    ///
    /// At most [`MAX_MESSAGES_PER_PUMP`] messages are handled per call so a
    /// backlog cannot stall the caller. Returns `true` if anything changed.
    pub fn process_scan_messages(&mut self) -> bool {
        let mut changed = false;
        let mut handled = 0usize;
        while handled < MAX_MESSAGES_PER_PUMP {
            let received = match &self.scan_handle {
                Some(handle) => handle.progress_rx.try_recv(),
                None => break,
            };
            let msg = match received {
                Ok(msg) => msg,
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.scanner_vanished();
                    return true;
                }
            };
            handled += 1;
            changed = true;
            if self.apply(msg) {
                break;
            }
        }
        changed
    }

    /// Block until the running scan ends, handling every message on the way.
    pub fn wait_for_scan(&mut self) -> SessionPhase {
        loop {
            let received = match &self.scan_handle {
                Some(handle) => handle.progress_rx.recv(),
                None => return self.phase,
            };
            match received {
                Ok(msg) => {
                    self.apply(msg);
                }
                Err(_) => self.scanner_vanished(),
            }
        }
    }

    /// Apply one message. Returns `true` once the scan has ended.
    fn apply(&mut self, msg: ScanProgress) -> bool {
        match msg {
            ScanProgress::Update {
                dirs_scanned,
                files_found,
                current_path,
            } => {
                debug!("{dirs_scanned} dirs, {files_found} files: {current_path}");
                self.scan_dirs_found = dirs_scanned;
                self.scan_files_found = files_found;
                self.scan_current_path = current_path;
                false
            }
            ScanProgress::Error { path, message } => {
                self.scan_error_count += 1;
                if self.scan_errors.len() < MAX_SCAN_ERRORS {
                    self.scan_errors.push((path, message));
                }
                false
            }
            ScanProgress::Complete {
                tree,
                stats,
                duration,
            } => {
                self.scan_dirs_found = stats.directories;
                self.scan_files_found = stats.files;
                self.scan_error_count = stats.error_count();
                self.scan_duration = Some(duration);
                self.tree = Some(*tree);
                self.stats = Some(stats);
                self.phase = SessionPhase::Results;
                self.scan_handle = None;
                if let Some(bounds) = self.bounds {
                    let depth = self.layout_options.max_draw_depth;
                    self.relayout(bounds, depth);
                }
                true
            }
            ScanProgress::Failed(err) => {
                self.failure = Some(err.to_string());
                self.phase = SessionPhase::Failed;
                self.scan_handle = None;
                true
            }
            ScanProgress::Cancelled => {
                self.scan_was_cancelled = true;
                self.phase = SessionPhase::Results;
                self.scan_handle = None;
                true
            }
        }
    }

    fn scanner_vanished(&mut self) {
        warn!("Scanner thread ended without a final message");
        self.failure = Some("scanner stopped unexpectedly".to_string());
        self.phase = SessionPhase::Failed;
        self.scan_handle = None;
    }

    /// Lay the current tree out again inside `bounds`, without re-scanning.
    ///
    /// The bounds and depth are remembered, so a scan that completes later
    /// is laid out the same way. Returns the new placements.
    pub fn relayout(&mut self, bounds: Rect, max_draw_depth: usize) -> &[Placement] {
        self.bounds = Some(bounds);
        self.layout_options = LayoutOptions { max_draw_depth };

        self.placement_map.clear();
        self.placements = match &self.tree {
            Some(tree) => layout_tree(tree, bounds, &self.layout_options),
            None => Vec::new(),
        };
        for placement in &self.placements {
            self.placement_map.insert(placement.node, placement.rect);
        }
        &self.placements
    }

    fn clear_layout(&mut self) {
        self.placements.clear();
        self.placement_map.clear();
    }

    /// The rectangle `node` was last placed at.
    pub fn placement_of(&self, node: NodeIndex) -> Option<Rect> {
        self.placement_map.get(&node).copied()
    }

    /// The most deeply nested placed node containing the pixel `(x, y)`.
    ///
    /// Placements are in drawing order, so the last hit is the innermost.
    pub fn node_at(&self, x: i64, y: i64) -> Option<NodeIndex> {
        self.placements
            .iter()
            .rev()
            .find(|placement| placement.rect.contains(x, y))
            .map(|placement| placement.node)
    }

    /// Path, size, type and child count for `node`.
    pub fn item_info(&self, node: NodeIndex) -> Option<ItemInfo> {
        let tree = self.tree.as_ref()?;
        let entry = tree.nodes.get(node.idx())?;
        let child_count = match tree.child_count(node) {
            0 => None,
            n => Some(n),
        };
        Some(ItemInfo {
            path: tree.full_path(node),
            size: entry.size,
            kind: entry.kind,
            child_count,
        })
    }
}
