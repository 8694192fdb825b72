/// End-to-end tests for `ScanSession`, the frontend's scan state machine.
///
/// These drive real background scans over temporary directories:
///   - Scan lifecycle (start, completion, failure, cancellation)
///   - Refusal of a second scan while one is in flight
///   - Re-layout, the placement map and hit testing
///   - Error accumulation from pruned entries
///
/// Where a scan has to be held open, a probe that parks the scanner until
/// the test releases it keeps the outcome deterministic.
use diskstrip_cli::state::{ScanSession, SessionError, SessionPhase};
use diskstrip_core::error::ReparseError;
use diskstrip_core::layout::Rect;
use diskstrip_core::model::{EntryKind, VolumeTag};
use diskstrip_core::platform::{FileAttributes, ReparseProbe, SystemProbe};
use diskstrip_core::scanner::ScanOptions;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tempfile::TempDir;

// ── Helpers ───────────────────────────────────────────────────────────────────

fn write_bytes(path: &Path, n: usize) {
    let mut f = fs::File::create(path).unwrap();
    f.write_all(&vec![0u8; n]).unwrap();
}

/// Build a minimal temp directory and return the `TempDir` guard.
///
/// ```text
/// root/
///   a.txt   (100 bytes)
///   b.bin   (200 bytes)
///   sub/
///     c.rs  (300 bytes)
/// ```
fn make_temp_tree() -> TempDir {
    let tmp = TempDir::new().unwrap();
    write_bytes(&tmp.path().join("a.txt"), 100);
    write_bytes(&tmp.path().join("b.bin"), 200);
    let sub = tmp.path().join("sub");
    fs::create_dir_all(&sub).unwrap();
    write_bytes(&sub.join("c.rs"), 300);
    tmp
}

/// Pump `process_scan_messages()` until the phase leaves `Scanning` or the
/// deadline expires.
fn pump_until_done(session: &mut ScanSession) {
    let deadline = Instant::now() + Duration::from_secs(30);
    while session.phase == SessionPhase::Scanning {
        assert!(
            Instant::now() < deadline,
            "scan did not complete within 30 seconds"
        );
        session.process_scan_messages();
        std::thread::sleep(Duration::from_millis(10));
    }
}

fn scanned(tmp: &TempDir) -> ScanSession {
    let mut session = ScanSession::new();
    session
        .start_scan(tmp.path().to_path_buf(), ScanOptions::default())
        .unwrap();
    assert_eq!(session.wait_for_scan(), SessionPhase::Results);
    session
}

/// Parks every attribute query until the gate's sender is dropped.
struct GateProbe {
    gate: crossbeam_channel::Receiver<()>,
}

impl ReparseProbe for GateProbe {
    fn attributes(&self, path: &Path) -> io::Result<FileAttributes> {
        let _ = self.gate.recv();
        SystemProbe.attributes(path)
    }

    fn substitute_name(&self, path: &Path) -> Result<String, ReparseError> {
        SystemProbe.substitute_name(path)
    }
}

/// Reports one directory as a junction to another drive; the root is on `C:`.
struct ForeignLinkProbe {
    link: PathBuf,
}

impl ReparseProbe for ForeignLinkProbe {
    fn attributes(&self, path: &Path) -> io::Result<FileAttributes> {
        if path == self.link {
            return Ok(FileAttributes {
                directory: true,
                reparse_point: true,
            });
        }
        SystemProbe.attributes(path)
    }

    fn substitute_name(&self, _path: &Path) -> Result<String, ReparseError> {
        Ok(r"\??\D:\Archive".to_string())
    }

    fn volume_of(&self, _root: &Path) -> VolumeTag {
        VolumeTag::drive('C').unwrap()
    }
}

// ── Scan lifecycle ─────────────────────────────────────────────────────────────

#[test]
fn new_session_is_idle() {
    let session = ScanSession::new();
    assert_eq!(session.phase, SessionPhase::Idle);
    assert!(!session.is_scanning());
    assert!(session.tree.is_none());
    assert!(session.placements.is_empty());
}

#[test]
fn start_scan_sets_scanning_phase() {
    let tmp = make_temp_tree();
    let mut session = ScanSession::new();
    session
        .start_scan(tmp.path().to_path_buf(), ScanOptions::default())
        .unwrap();
    assert_eq!(session.phase, SessionPhase::Scanning);
    assert!(session.is_scanning());
    pump_until_done(&mut session);
}

#[test]
fn scan_completes_and_tree_is_available() {
    let tmp = make_temp_tree();
    let mut session = ScanSession::new();
    session
        .start_scan(tmp.path().to_path_buf(), ScanOptions::default())
        .unwrap();
    pump_until_done(&mut session);

    assert_eq!(session.phase, SessionPhase::Results);
    assert!(!session.is_scanning());
    let tree = session.tree.as_ref().expect("tree must be populated");
    // root + "sub" dir + 3 files.
    assert_eq!(tree.len(), 5);
    assert_eq!(tree.root_node().size, 600);
    assert_eq!(session.scan_files_found, 3);
    assert!(session.scan_duration.is_some());
}

#[test]
fn missing_root_fails_the_session() {
    let tmp = TempDir::new().unwrap();
    let mut session = ScanSession::new();
    session
        .start_scan(tmp.path().join("missing"), ScanOptions::default())
        .unwrap();

    assert_eq!(session.wait_for_scan(), SessionPhase::Failed);
    assert!(session.failure.as_deref().unwrap().contains("missing"));
    assert!(session.tree.is_none());
}

#[test]
fn second_scan_is_refused_while_busy() {
    let tmp = make_temp_tree();
    let (open_gate, gate) = crossbeam_channel::bounded::<()>(0);
    let mut session = ScanSession::new();
    session
        .start_scan_with(
            GateProbe { gate },
            tmp.path().to_path_buf(),
            ScanOptions::default(),
        )
        .unwrap();

    let err = session
        .start_scan(tmp.path().to_path_buf(), ScanOptions::default())
        .unwrap_err();
    assert!(matches!(err, SessionError::Busy(ref root) if root == tmp.path()));
    assert_eq!(session.phase, SessionPhase::Scanning);

    drop(open_gate);
    assert_eq!(session.wait_for_scan(), SessionPhase::Results);
    assert_eq!(session.tree.as_ref().unwrap().root_node().size, 600);
}

#[test]
fn cancel_scan_sets_cancelled_flag() {
    let tmp = make_temp_tree();
    let (open_gate, gate) = crossbeam_channel::bounded::<()>(0);
    let mut session = ScanSession::new();
    session
        .start_scan_with(
            GateProbe { gate },
            tmp.path().to_path_buf(),
            ScanOptions::default(),
        )
        .unwrap();

    session.cancel_scan();
    drop(open_gate);
    pump_until_done(&mut session);

    assert_eq!(session.phase, SessionPhase::Results);
    assert!(session.scan_was_cancelled);
    assert!(session.tree.is_none());
}

#[test]
fn start_scan_resets_previous_results() {
    let tmp = make_temp_tree();
    let mut session = scanned(&tmp);
    session.relayout(Rect::new(0, 0, 200, 100), 2);
    assert!(!session.placements.is_empty());

    session
        .start_scan(tmp.path().to_path_buf(), ScanOptions::default())
        .unwrap();
    assert_eq!(session.phase, SessionPhase::Scanning);
    assert!(session.tree.is_none());
    assert!(session.placements.is_empty());
    assert_eq!(session.scan_error_count, 0);

    // The remembered bounds are reused once the new scan lands.
    assert_eq!(session.wait_for_scan(), SessionPhase::Results);
    assert_eq!(session.placements.len(), 5);
}

#[test]
fn pruned_entries_are_reported_as_errors() {
    let tmp = make_temp_tree();
    let link = tmp.path().join("sub");
    let mut session = ScanSession::new();
    session
        .start_scan_with(
            ForeignLinkProbe { link: link.clone() },
            tmp.path().to_path_buf(),
            ScanOptions::default(),
        )
        .unwrap();
    assert_eq!(session.wait_for_scan(), SessionPhase::Results);

    assert_eq!(session.scan_error_count, 1);
    assert_eq!(session.scan_errors.len(), 1);
    assert_eq!(session.scan_errors[0].0, link.to_string_lossy());
    assert_eq!(session.tree.as_ref().unwrap().root_node().size, 300);
    assert_eq!(session.stats.as_ref().unwrap().foreign_reparse, 1);
}

// ── Layout and hit testing ─────────────────────────────────────────────────────

#[test]
fn relayout_fills_placement_map() {
    let tmp = make_temp_tree();
    let mut session = scanned(&tmp);

    let placed = session.relayout(Rect::new(0, 0, 200, 100), 2).to_vec();

    // root, sub, b.bin, a.txt, and c.rs inside sub.
    assert_eq!(placed.len(), 5);
    let tree = session.tree.as_ref().unwrap();
    assert_eq!(placed[0].node, tree.root);
    for placement in &placed {
        assert_eq!(session.placement_of(placement.node), Some(placement.rect));
    }
    let names: Vec<String> = placed
        .iter()
        .map(|p| tree.node(p.node).name.to_string())
        .collect();
    assert_eq!(names[1..], ["sub", "c.rs", "b.bin", "a.txt"]);
    assert_eq!(placed[1].rect, Rect::new(2, 2, 100, 98));
    assert_eq!(placed[2].rect, Rect::new(4, 4, 98, 96));
}

#[test]
fn relayout_on_resize_does_not_rescan() {
    let tmp = make_temp_tree();
    let mut session = scanned(&tmp);

    let wide = session.relayout(Rect::new(0, 0, 200, 100), 2).to_vec();
    let tall = session.relayout(Rect::new(0, 0, 100, 200), 2).to_vec();

    assert_ne!(wide, tall);
    assert_eq!(session.phase, SessionPhase::Results);
    let root = session.tree.as_ref().unwrap().root;
    assert_eq!(session.placement_of(root), Some(Rect::new(0, 0, 100, 200)));
    assert_eq!(session.relayout(Rect::new(0, 0, 200, 100), 2), &wide[..]);
}

#[test]
fn shallow_draw_depth_places_fewer_nodes() {
    let tmp = make_temp_tree();
    let mut session = scanned(&tmp);

    assert_eq!(session.relayout(Rect::new(0, 0, 200, 100), 0).len(), 1);
    assert_eq!(session.relayout(Rect::new(0, 0, 200, 100), 1).len(), 4);
}

#[test]
fn node_at_returns_innermost_placement() {
    let tmp = make_temp_tree();
    let mut session = scanned(&tmp);
    session.relayout(Rect::new(0, 0, 200, 100), 2);
    let tree = session.tree.as_ref().unwrap();
    let name_at = |x, y| {
        session
            .node_at(x, y)
            .map(|idx| tree.node(idx).name.to_string())
    };

    assert_eq!(name_at(50, 50).as_deref(), Some("c.rs"));
    assert_eq!(name_at(99, 50).as_deref(), Some("sub"));
    assert_eq!(name_at(120, 50).as_deref(), Some("b.bin"));
    assert_eq!(session.node_at(1, 1), Some(tree.root));
    assert_eq!(session.node_at(500, 500), None);
}

#[test]
fn item_info_describes_node() {
    let tmp = make_temp_tree();
    let mut session = scanned(&tmp);
    session.relayout(Rect::new(0, 0, 200, 100), 2);

    let sub = session.node_at(99, 50).unwrap();
    let info = session.item_info(sub).unwrap();
    assert!(info.path.ends_with("sub"));
    assert_eq!(info.size, 300);
    assert_eq!(info.kind, EntryKind::Directory);
    assert_eq!(info.child_count, Some(1));

    let text = info.to_string();
    assert!(text.contains("Size: 300.0 B"));
    assert!(text.contains("Type: Directory"));
    assert!(text.contains("Contains: 1 items"));

    let file = session.node_at(50, 50).unwrap();
    let info = session.item_info(file).unwrap();
    assert_eq!(info.kind, EntryKind::File);
    assert_eq!(info.child_count, None);
    assert!(!info.to_string().contains("Contains"));
}
