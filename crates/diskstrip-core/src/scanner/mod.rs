/// Scanner module: builds the entry tree for a scan root.
///
/// Two entry points:
/// - [`build_tree`] runs a scan synchronously on the calling thread.
/// - [`start_scan`] runs scan + aggregation on one dedicated background
///   thread and reports over a bounded channel, so a frontend stays
///   responsive. The caller owns the returned [`ScanHandle`] and decides
///   whether another scan may start while one is in flight.
pub mod builder;
pub mod progress;
pub mod stats;

use crate::error::ScanError;
use crate::model::FileTree;
use crate::platform::{ReparseProbe, SystemProbe};
use builder::TreeBuilder;
use progress::ScanProgress;
use stats::ScanStats;

use crossbeam_channel::Receiver;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;
use tracing::{info, warn};

/// Default recursion limit, measured from the root at depth 0.
pub const DEFAULT_MAX_DEPTH: usize = 100;

/// Maximum number of progress messages that may queue up in the channel.
///
/// When the consumer falls behind the scanner blocks on `send` rather than
/// buffering without bound.
pub const PROGRESS_CHANNEL_CAPACITY: usize = 4_096;

/// Scan configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScanOptions {
    /// Directories at this depth are kept but not enumerated.
    pub max_depth: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// A finished build: the (not yet aggregated) tree and its counters.
#[derive(Debug)]
pub struct ScanOutcome {
    pub tree: FileTree,
    pub stats: ScanStats,
}

/// Scan `root` on the calling thread using the platform probe.
///
/// Sizes are not aggregated; call [`FileTree::aggregate_sizes`] once before
/// reading directory sizes.
pub fn build_tree(root: &Path, options: &ScanOptions) -> Result<ScanOutcome, ScanError> {
    TreeBuilder::new(SystemProbe, options.clone()).build(root)
}

/// Handle to a running or completed background scan.
pub struct ScanHandle {
    /// Receiver for progress updates from the scan thread.
    pub progress_rx: Receiver<ScanProgress>,
    /// Flag to request cancellation.
    cancel_flag: Arc<AtomicBool>,
    /// Join handle for the scan thread.
    _thread: Option<thread::JoinHandle<()>>,
}

impl ScanHandle {
    /// Request the scan to stop at the next directory boundary.
    pub fn cancel(&self) {
        self.cancel_flag.store(true, Ordering::Relaxed);
    }

    /// Check whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancel_flag.load(Ordering::Relaxed)
    }
}

/// Start a background scan of `root` with the platform probe.
pub fn start_scan(root: PathBuf, options: ScanOptions) -> ScanHandle {
    start_scan_with(SystemProbe, root, options)
}

/// Start a background scan of `root` with a caller-supplied probe.
pub fn start_scan_with<P>(probe: P, root: PathBuf, options: ScanOptions) -> ScanHandle
where
    P: ReparseProbe + Send + 'static,
{
    let (progress_tx, progress_rx) =
        crossbeam_channel::bounded::<ScanProgress>(PROGRESS_CHANNEL_CAPACITY);
    let cancel_flag = Arc::new(AtomicBool::new(false));
    let cancel_clone = cancel_flag.clone();

    let thread = thread::Builder::new()
        .name("diskstrip-scanner".into())
        .spawn(move || {
            info!("Starting scan of {}", root.display());
            let start = Instant::now();

            let result = TreeBuilder::new(probe, options)
                .with_cancel_flag(cancel_clone)
                .with_progress(progress_tx.clone())
                .build(&root);

            let message = match result {
                Ok(ScanOutcome { mut tree, stats }) => {
                    let total = tree.aggregate_sizes();
                    let duration = start.elapsed();
                    info!(
                        "Scan of {} complete: {} bytes in {} files, {duration:?}",
                        root.display(),
                        total,
                        stats.files
                    );
                    ScanProgress::Complete {
                        tree: Box::new(tree),
                        stats,
                        duration,
                    }
                }
                Err(ScanError::Cancelled) => {
                    info!("Scan of {} cancelled", root.display());
                    ScanProgress::Cancelled
                }
                Err(err) => {
                    warn!("Scan failed: {err}");
                    ScanProgress::Failed(err)
                }
            };
            let _ = progress_tx.send(message);
        })
        .expect("failed to spawn scanner thread");

    ScanHandle {
        progress_rx,
        cancel_flag,
        _thread: Some(thread),
    }
}
